//! Data models for the Discovery SDK
//!
//! Resource records mirror the JSON returned by the service. Members the SDK
//! does not model explicitly are kept in each record's `extra` map, so a
//! newer service version never loses data on the way through.
//!
//! # Key Types
//!
//! * [`DetailedResponse`] - what every operation returns
//! * [`Environment`], [`Collection`], [`Configuration`] - the container hierarchy
//! * [`DocumentUpload`] - file payload for add/update document
//! * [`QueryOptions`], [`QueryLogOptions`], [`MetricsRange`] - request options

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// Response wrapper returned by every operation
///
/// `result` is the typed body. `raw` is the same body as a string to value
/// map, exactly as the server sent it.
///
/// # Example
///
/// ```no_run
/// # use discovery_sdk::Client;
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let res = client.list_environments(None).await?;
/// assert_eq!(res.status, 200);
/// for env in &res.result.environments {
///     println!("{} ({})", env.name, env.environment_id);
/// }
/// println!("raw keys: {:?}", res.raw.keys().collect::<Vec<_>>());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DetailedResponse<T> {
    /// Typed response body
    pub result: T,
    /// Response body as a JSON object (empty for 204 responses)
    pub raw: Map<String, Value>,
    /// HTTP status code
    pub status: u16,
    /// Transaction id from the response headers
    pub request_id: Option<String>,
}

impl<T> DetailedResponse<T> {
    /// Borrow the typed body
    pub fn get_result(&self) -> &T {
        &self.result
    }

    /// Take the typed body
    pub fn into_result(self) -> T {
        self.result
    }

    /// Look up a top-level member of the raw body
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }
}

/// Processing notice attached to documents, configurations and deletes
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Notice {
    /// Notice identifier
    pub notice_id: Option<String>,
    /// Creation timestamp
    pub created: Option<String>,
    /// Document the notice refers to
    pub document_id: Option<String>,
    /// Query the notice refers to
    pub query_id: Option<String>,
    /// `warning` or `error`
    pub severity: Option<String>,
    /// Ingestion step that produced the notice
    pub step: Option<String>,
    /// Human-readable description
    pub description: Option<String>,
    /// Unmodelled members
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Environments
// ---------------------------------------------------------------------------

/// Top-level container for collections
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Environment {
    /// Server-assigned identifier
    pub environment_id: String,
    /// Display name
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Creation timestamp
    pub created: Option<String>,
    /// Last update timestamp
    pub updated: Option<String>,
    /// Provisioning status
    pub status: Option<String>,
    /// Whether the environment is read-only (e.g. the public news environment)
    pub read_only: bool,
    /// Current size plan
    pub size: Option<String>,
    /// Size requested by the last update, if pending
    pub requested_size: Option<String>,
    /// Disk and document capacity details
    pub index_capacity: Option<Value>,
    /// Search readiness details
    pub search_status: Option<Value>,
    /// Unmodelled members
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `list_environments`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ListEnvironmentsResponse {
    /// Environments visible to the credentials
    pub environments: Vec<Environment>,
}

/// Options for `create_environment`
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateEnvironment {
    /// Name of the new environment (required)
    pub name: String,
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Size plan, e.g. `"LT"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

/// Options for `update_environment`; only set fields are sent
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateEnvironment {
    /// New name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New size plan
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

/// Body of `delete_environment`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DeleteEnvironmentResponse {
    /// Id of the deleted environment
    pub environment_id: String,
    /// Usually `"deleted"`
    pub status: String,
}

/// An indexed field and its type
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Field {
    /// Dotted field path, e.g. `extracted_metadata.sha1`
    pub field: String,
    /// Field type, e.g. `string`, `nested`
    #[serde(rename = "type")]
    pub field_type: String,
}

/// Body of `list_fields` and `list_collection_fields`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ListCollectionFieldsResponse {
    /// Fields known to the index
    pub fields: Vec<Field>,
}

// ---------------------------------------------------------------------------
// Configurations
// ---------------------------------------------------------------------------

/// Ingestion and enrichment rules applied to documents
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Configuration {
    /// Server-assigned identifier
    pub configuration_id: String,
    /// Display name
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Creation timestamp
    pub created: Option<String>,
    /// Last update timestamp
    pub updated: Option<String>,
    /// Document conversion settings
    pub conversions: Option<Value>,
    /// Enrichment steps
    pub enrichments: Option<Vec<Value>>,
    /// Post-enrichment normalizations
    pub normalizations: Option<Vec<Value>>,
    /// Crawl source settings
    pub source: Option<Value>,
    /// Unmodelled members
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `list_configurations`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ListConfigurationsResponse {
    /// Configurations in the environment
    pub configurations: Vec<Configuration>,
}

/// Options for `create_configuration` and `update_configuration`
///
/// Update replaces the whole configuration, so `name` is required for both.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigurationOptions {
    /// Configuration name (required)
    pub name: String,
    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Document conversion settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversions: Option<Value>,
    /// Enrichment steps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrichments: Option<Vec<Value>>,
    /// Post-enrichment normalizations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalizations: Option<Vec<Value>>,
    /// Crawl source settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
}

/// Body of `delete_configuration`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DeleteConfigurationResponse {
    /// Id of the deleted configuration
    pub configuration_id: String,
    /// Usually `"deleted"`
    pub status: String,
    /// Notices raised by the delete
    pub notices: Vec<Notice>,
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

/// Document counters of a collection
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DocumentCounts {
    /// Indexed and searchable
    pub available: u64,
    /// Being ingested
    pub processing: u64,
    /// Failed ingestion
    pub failed: u64,
    /// Waiting for ingestion
    pub pending: u64,
}

/// A named set of indexed documents
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Collection {
    /// Server-assigned identifier
    pub collection_id: String,
    /// Display name
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Creation timestamp
    pub created: Option<String>,
    /// Last update timestamp
    pub updated: Option<String>,
    /// `active`, `pending` or `maintenance`
    pub status: Option<String>,
    /// Configuration applied to new documents
    pub configuration_id: Option<String>,
    /// Language code of the collection
    pub language: Option<String>,
    /// Document counters
    pub document_counts: Option<DocumentCounts>,
    /// Disk usage details
    pub disk_usage: Option<Value>,
    /// Relevancy training status
    pub training_status: Option<Value>,
    /// Crawl status
    pub crawl_status: Option<Value>,
    /// Unmodelled members
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `list_collections`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ListCollectionsResponse {
    /// Collections in the environment
    pub collections: Vec<Collection>,
}

/// Options for `create_collection` and `update_collection`
#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectionOptions {
    /// Collection name (required)
    pub name: String,
    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Configuration to apply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_id: Option<String>,
    /// Language code, only honoured on create
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Body of `delete_collection`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DeleteCollectionResponse {
    /// Id of the deleted collection
    pub collection_id: String,
    /// Usually `"deleted"`
    pub status: String,
}

// ---------------------------------------------------------------------------
// Expansions
// ---------------------------------------------------------------------------

/// A query expansion rule
///
/// With `input_terms` set the rule is one-way (input expands to expanded).
/// Without it, every term in `expanded_terms` expands to all the others.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Expansion {
    /// Terms that trigger the expansion
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub input_terms: Vec<String>,
    /// Terms added to the query
    pub expanded_terms: Vec<String>,
}

impl Expansion {
    /// One-way expansion from `input` to `expanded`
    pub fn one_way<I, E, S>(input: I, expanded: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input_terms: input.into_iter().map(Into::into).collect(),
            expanded_terms: expanded.into_iter().map(Into::into).collect(),
        }
    }

    /// Bidirectional synonym set
    pub fn synonyms<E, S>(terms: E) -> Self
    where
        E: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input_terms: Vec::new(),
            expanded_terms: terms.into_iter().map(Into::into).collect(),
        }
    }
}

/// Body of `create_expansions` and `list_expansions`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Expansions {
    /// Expansion rules of the collection
    pub expansions: Vec<Expansion>,
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// File payload for `add_document` and `update_document`
///
/// At least one of `file` or `metadata` must be set.
///
/// # Example
///
/// ```
/// use discovery_sdk::DocumentUpload;
/// use serde_json::json;
///
/// let upload = DocumentUpload::file(b"<html>hi</html>".to_vec(), "simple.html")
///     .with_metadata(json!({"source": "crawler"}));
/// assert_eq!(upload.filename.as_deref(), Some("simple.html"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocumentUpload {
    /// File content
    pub file: Option<Vec<u8>>,
    /// File name sent with the file part
    pub filename: Option<String>,
    /// MIME type of the file; guessed from the file name when unset
    pub file_content_type: Option<String>,
    /// Metadata object stored with the document
    pub metadata: Option<Value>,
}

impl DocumentUpload {
    /// Upload the given bytes under a file name
    pub fn file(content: impl Into<Vec<u8>>, filename: impl Into<String>) -> Self {
        Self {
            file: Some(content.into()),
            filename: Some(filename.into()),
            ..Default::default()
        }
    }

    /// Metadata-only update
    pub fn metadata(metadata: Value) -> Self {
        Self {
            metadata: Some(metadata),
            ..Default::default()
        }
    }

    /// Attach a metadata object
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Set an explicit MIME type for the file part
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.file_content_type = Some(content_type.into());
        self
    }

    /// Replace the file name
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.file.is_none() && self.metadata.is_none()
    }
}

/// Body of `add_document` and `update_document`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DocumentAccepted {
    /// Server-assigned document id
    pub document_id: String,
    /// `processing` or `pending`
    pub status: String,
    /// Notices raised during upload
    pub notices: Vec<Notice>,
}

/// Body of `get_document_status`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DocumentStatus {
    /// Document id
    pub document_id: String,
    /// Configuration used for ingestion
    pub configuration_id: Option<String>,
    /// `available`, `available with notices`, `failed`, `processing` or `pending`
    pub status: String,
    /// Description of the status
    pub status_description: Option<String>,
    /// Name of the uploaded file
    pub filename: Option<String>,
    /// Detected file type
    pub file_type: Option<String>,
    /// SHA-1 of the uploaded file
    pub sha1: Option<String>,
    /// Ingestion notices
    pub notices: Vec<Notice>,
    /// Unmodelled members
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `delete_document`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DeleteDocumentResponse {
    /// Id of the deleted document
    pub document_id: String,
    /// Usually `"deleted"`
    pub status: String,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Options for `query` and `federated_query`
///
/// # Example
///
/// ```
/// use discovery_sdk::QueryOptions;
///
/// let opts = QueryOptions {
///     filter: Some("extracted_metadata.sha1::9181d244*".to_string()),
///     return_fields: vec!["extracted_metadata.sha1".to_string()],
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Cacheable filter in query language, e.g. `field::value*`
    pub filter: Option<String>,
    /// Ranked query in query language
    pub query: Option<String>,
    /// Natural language query
    pub natural_language_query: Option<String>,
    /// Return passages
    pub passages: Option<bool>,
    /// Aggregation expression
    pub aggregation: Option<String>,
    /// Number of results to return
    pub count: Option<u32>,
    /// Fields to return (sent as `return`)
    pub return_fields: Vec<String>,
    /// Number of results to skip
    pub offset: Option<u32>,
    /// Sort fields, `-` prefix for descending
    pub sort: Vec<String>,
    /// Return highlights
    pub highlight: Option<bool>,
    /// Remove duplicate results
    pub deduplicate: Option<bool>,
}

/// One query hit
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryResult {
    /// Document id
    pub id: Option<String>,
    /// Collection the document lives in
    pub collection_id: Option<String>,
    /// Score and confidence
    pub result_metadata: Option<Value>,
    /// Returned document fields
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Body of `query` and `federated_query`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryResponse {
    /// Total number of matching documents
    pub matching_results: u64,
    /// Returned documents
    pub results: Vec<QueryResult>,
    /// Aggregation results
    pub aggregations: Vec<Value>,
    /// Passages, if requested
    pub passages: Vec<Value>,
    /// Duplicates removed by `deduplicate`
    pub duplicates_removed: Option<u64>,
    /// Token identifying this query for `create_event`
    pub session_token: Option<String>,
    /// How the query was processed
    pub retrieval_details: Option<Value>,
    /// Unmodelled members
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Connection details for a crawl source
///
/// `Debug` masks the password and prints only the names of the
/// source-specific members, which carry keys and client secrets.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialDetails {
    /// e.g. `username_password`, `oauth2`, `basic`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_type: Option<String>,
    /// Source URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Source username
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Source password; never returned by the service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Source-specific members
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl std::fmt::Debug for CredentialDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialDetails")
            .field("credential_type", &self.credential_type)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .field("extra", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Stored credentials for a crawl source
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Credentials {
    /// Server-assigned identifier
    pub credential_id: String,
    /// Source type, e.g. `salesforce`, `box`, `sharepoint`
    pub source_type: Option<String>,
    /// Connection details
    pub credential_details: Option<CredentialDetails>,
    /// Connection status
    pub status: Option<String>,
    /// Unmodelled members
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Options for `create_credentials` and `update_credentials`
#[derive(Debug, Clone, Default, Serialize)]
pub struct CredentialsOptions {
    /// Source type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    /// Connection details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_details: Option<CredentialDetails>,
}

/// Body of `list_credentials`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialsList {
    /// Credentials in the environment
    pub credentials: Vec<Credentials>,
}

/// Body of `delete_credentials`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DeleteCredentials {
    /// Id of the deleted credentials
    pub credential_id: String,
    /// Usually `"deleted"`
    pub status: String,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Kind of interaction reported with `create_event`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// The user opened a result
    Click,
}

impl EventType {
    /// Wire name of the event type
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Click => "click",
        }
    }
}

/// Interaction details tying an event to a query session
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct EventData {
    /// Environment of the queried collection
    pub environment_id: String,
    /// `session_token` from the query response
    pub session_token: String,
    /// Collection containing the document
    pub collection_id: String,
    /// Document the user interacted with
    pub document_id: String,
    /// Client-side time of the event (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_timestamp: Option<String>,
    /// Rank of the document in the result list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_rank: Option<u32>,
    /// Query id assigned by the service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
}

/// Body of `create_event`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CreateEventResponse {
    /// Event type as recorded by the service
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event data as recorded by the service
    pub data: EventData,
}

// ---------------------------------------------------------------------------
// Metrics and logs
// ---------------------------------------------------------------------------

/// Result type filter for metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultType {
    /// Document results
    Document,
}

impl ResultType {
    /// Wire name of the result type
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultType::Document => "document",
        }
    }
}

/// Time range and filter for the metrics endpoints
///
/// # Example
///
/// ```
/// use discovery_sdk::{MetricsRange, ResultType};
/// use time::macros::datetime;
///
/// let range = MetricsRange::between(
///     datetime!(2018-08-13 14:39:59 UTC),
///     datetime!(2018-08-14 14:39:59 UTC),
/// )
/// .with_result_type(ResultType::Document);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetricsRange {
    /// Start of the range (inclusive)
    pub start_time: Option<OffsetDateTime>,
    /// End of the range
    pub end_time: Option<OffsetDateTime>,
    /// Restrict to a result type
    pub result_type: Option<ResultType>,
}

impl MetricsRange {
    /// Range between two instants
    pub fn between(start_time: OffsetDateTime, end_time: OffsetDateTime) -> Self {
        Self {
            start_time: Some(start_time),
            end_time: Some(end_time),
            result_type: None,
        }
    }

    /// Restrict to a result type
    pub fn with_result_type(mut self, result_type: ResultType) -> Self {
        self.result_type = Some(result_type);
        self
    }
}

/// One bucket of a metric time series
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricAggregationResult {
    /// Bucket start as ISO-8601 string
    pub key_as_string: Option<String>,
    /// Bucket start in epoch milliseconds
    pub key: Option<i64>,
    /// Number of matching queries
    pub matching_results: Option<u64>,
    /// Event rate in the bucket
    pub event_rate: Option<f64>,
}

/// A metric time series
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricAggregation {
    /// Bucket interval, e.g. `1d`
    pub interval: Option<String>,
    /// Event type counted
    pub event_type: Option<String>,
    /// Buckets
    pub results: Vec<MetricAggregationResult>,
}

/// Body of the time-series metrics endpoints
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricResponse {
    /// Aggregations; empty when there is no data in the range
    pub aggregations: Vec<MetricAggregation>,
}

/// Query token with its event rate
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricTokenAggregationResult {
    /// Query token
    pub key: String,
    /// Number of queries containing the token
    pub matching_results: Option<u64>,
    /// Event rate for the token
    pub event_rate: Option<f64>,
}

/// Token aggregation for one event type
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricTokenAggregation {
    /// Event type counted
    pub event_type: Option<String>,
    /// Tokens
    pub results: Vec<MetricTokenAggregationResult>,
}

/// Body of `get_metrics_query_token_event`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MetricTokenResponse {
    /// Aggregations; empty when there is no data
    pub aggregations: Vec<MetricTokenAggregation>,
}

/// Options for `query_log`
#[derive(Debug, Clone, Default)]
pub struct QueryLogOptions {
    /// Filter in query language
    pub filter: Option<String>,
    /// Ranked query in query language
    pub query: Option<String>,
    /// Number of entries to return
    pub count: Option<u32>,
    /// Number of entries to skip
    pub offset: Option<u32>,
    /// Sort fields
    pub sort: Vec<String>,
}

/// One query log entry
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LogQueryResult {
    /// Environment queried
    pub environment_id: Option<String>,
    /// Customer id header sent with the query
    pub customer_id: Option<String>,
    /// `query` or `event`
    pub document_type: Option<String>,
    /// Natural language query text
    pub natural_language_query: Option<String>,
    /// Document results of the query
    pub document_results: Option<Value>,
    /// Server-side timestamp
    pub created_timestamp: Option<String>,
    /// Client-side timestamp
    pub client_timestamp: Option<String>,
    /// Query id
    pub query_id: Option<String>,
    /// Session token
    pub session_token: Option<String>,
    /// Collection of the event document
    pub collection_id: Option<String>,
    /// Rank of the event document
    pub display_rank: Option<u32>,
    /// Event document id
    pub document_id: Option<String>,
    /// Event type
    pub event_type: Option<String>,
    /// Result type
    pub result_type: Option<String>,
    /// Unmodelled members
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `query_log`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LogQueryResponse {
    /// Total number of matching entries
    pub matching_results: u64,
    /// Returned entries
    pub results: Vec<LogQueryResult>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_environment_keeps_unknown_members() {
        let env: Environment = serde_json::from_value(json!({
            "environment_id": "env-1",
            "name": "byod",
            "read_only": false,
            "size": "LT",
            "brand_new_member": {"a": 1}
        }))
        .unwrap();
        assert_eq!(env.environment_id, "env-1");
        assert_eq!(env.size.as_deref(), Some("LT"));
        assert_eq!(env.extra["brand_new_member"], json!({"a": 1}));
        assert!(env.description.is_none());
    }

    #[test]
    fn test_update_environment_sends_only_set_fields() {
        let body = serde_json::to_value(UpdateEnvironment {
            description: Some("new".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(body, json!({"description": "new"}));
    }

    #[test]
    fn test_collection_options_serialization() {
        let body = serde_json::to_value(CollectionOptions {
            name: "docs".to_string(),
            description: Some("Updating description".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"name": "docs", "description": "Updating description"})
        );
    }

    #[test]
    fn test_expansion_serialization() {
        let one_way = serde_json::to_value(Expansion::one_way(["a"], ["aa"])).unwrap();
        assert_eq!(one_way, json!({"input_terms": ["a"], "expanded_terms": ["aa"]}));

        let synonyms = serde_json::to_value(Expansion::synonyms(["car", "auto"])).unwrap();
        assert_eq!(synonyms, json!({"expanded_terms": ["car", "auto"]}));
    }

    #[test]
    fn test_event_type_wire_name() {
        assert_eq!(serde_json::to_value(EventType::Click).unwrap(), json!("click"));
        assert_eq!(EventType::Click.as_str(), "click");
        assert_eq!(ResultType::Document.as_str(), "document");
    }

    #[test]
    fn test_query_result_flattens_fields() {
        let res: QueryResponse = serde_json::from_value(json!({
            "matching_results": 1,
            "session_token": "tok",
            "results": [{
                "id": "doc-1",
                "result_metadata": {"score": 1.0},
                "extracted_metadata": {"sha1": "9181d244"}
            }]
        }))
        .unwrap();
        assert_eq!(res.matching_results, 1);
        assert_eq!(res.session_token.as_deref(), Some("tok"));
        assert_eq!(res.results[0].id.as_deref(), Some("doc-1"));
        assert_eq!(
            res.results[0].fields["extracted_metadata"]["sha1"],
            json!("9181d244")
        );
        assert!(res.aggregations.is_empty());
    }

    #[test]
    fn test_credential_details_round_trip_extra() {
        let details: CredentialDetails = serde_json::from_value(json!({
            "credential_type": "username_password",
            "url": "https://login.salesforce.com",
            "username": "user@email.com",
            "organization_url": "https://org.example.com"
        }))
        .unwrap();
        assert_eq!(details.url.as_deref(), Some("https://login.salesforce.com"));
        assert!(details.password.is_none());
        let back = serde_json::to_value(&details).unwrap();
        assert_eq!(back["organization_url"], json!("https://org.example.com"));
        assert!(back.get("password").is_none());
    }

    #[test]
    fn test_credential_details_debug_masks_secrets() {
        let details: CredentialDetails = serde_json::from_value(json!({
            "credential_type": "oauth2",
            "username": "user@email.com",
            "password": "hunter2",
            "client_secret": "s3cr3t-value"
        }))
        .unwrap();

        let creds = Credentials {
            credential_id: "cred-1".to_string(),
            credential_details: Some(details),
            ..Default::default()
        };
        let debug = format!("{:?}", creds);
        assert!(debug.contains("user@email.com"));
        assert!(debug.contains("****"));
        assert!(debug.contains("client_secret"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("s3cr3t-value"));

        let unset = format!("{:?}", CredentialDetails::default());
        assert!(unset.contains("password: None"));
    }

    #[test]
    fn test_document_upload_builders() {
        let upload = DocumentUpload::file(b"abc".to_vec(), "a.html")
            .with_filename("newname.html")
            .with_content_type("text/html");
        assert_eq!(upload.filename.as_deref(), Some("newname.html"));
        assert_eq!(upload.file_content_type.as_deref(), Some("text/html"));
        assert!(!upload.is_empty());
        assert!(DocumentUpload::default().is_empty());
        assert!(!DocumentUpload::metadata(json!({})).is_empty());
    }
}
