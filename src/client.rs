//! Discovery Client Implementation
//!
//! This module contains the main `Client` struct, the facade over the
//! Discovery v1 REST API. Every public method maps to exactly one endpoint:
//! it builds the request, sends it, and returns a [`DetailedResponse`] or an
//! [`Error`].
//!
//! # Architecture
//!
//! - **HTTP Layer**: Built on `reqwest` for async HTTP operations
//! - **Retry Logic**: Opt-in exponential backoff with jitter for transient failures
//! - **Authentication**: Basic, API key, bearer, or a refreshable token provider
//! - **Telemetry**: Optional OpenTelemetry integration for observability
//!
//! The client keeps no copy of any resource. Every read goes to the service.
//!
//! # Examples
//!
//! ```no_run
//! use discovery_sdk::{Auth, ClientBuilder, CollectionOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ClientBuilder::new("2017-10-16")
//!     .auth(Auth::basic("username", "password"))
//!     .build()?;
//!
//! let created = client
//!     .create_collection(
//!         "env-id",
//!         CollectionOptions {
//!             name: "manuals".to_string(),
//!             description: Some("Product manuals".to_string()),
//!             ..Default::default()
//!         },
//!     )
//!     .await?;
//! println!("new collection {}", created.result.collection_id);
//! # Ok(())
//! # }
//! ```

use crate::{
    config::ClientConfig,
    endpoints::Endpoints,
    errors::{Error, Result},
    models::*,
    util::{generate_request_id, guess_content_type, transaction_id, QueryParams},
};

#[cfg(feature = "metrics")]
use crate::telemetry;
use backoff::{future::retry_notify, ExponentialBackoff};
use reqwest::{multipart, Client as HttpClient, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use time::{format_description::well_known::Rfc3339, OffsetDateTime, UtcOffset};
use tracing::{debug, trace, warn};

const USER_AGENT_PREFIX: &str = "discovery-sdk-rust";

/// Request body
enum Payload {
    Empty,
    Json(Value),
    Multipart(DocumentUpload),
}

/// A fully described request; rebuilt into a fresh `reqwest` request per attempt
struct ApiRequest {
    operation: &'static str,
    method: Method,
    url: String,
    payload: Payload,
}

impl ApiRequest {
    fn new(operation: &'static str, method: Method, url: String) -> Self {
        Self {
            operation,
            method,
            url,
            payload: Payload::Empty,
        }
    }

    fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        let body = serde_json::to_value(body).map_err(|e| {
            Error::InvalidArgument(format!("{}: cannot serialize body: {}", self.operation, e))
        })?;
        self.payload = Payload::Json(body);
        Ok(self)
    }

    fn multipart(mut self, upload: DocumentUpload) -> Self {
        self.payload = Payload::Multipart(upload);
        self
    }
}

#[derive(Serialize)]
struct EventBody<'a> {
    #[serde(rename = "type")]
    event_type: EventType,
    data: &'a EventData,
}

/// A response whose body has been read in full
struct RawResponse {
    status: u16,
    request_id: Option<String>,
    body: Vec<u8>,
}

impl RawResponse {
    /// Read the whole body; a stream cut short is a transport failure
    async fn read(response: Response) -> Result<Self> {
        let status = response.status().as_u16();
        let request_id = transaction_id(response.headers());
        let body = response.bytes().await.map_err(Error::from)?.to_vec();
        Ok(Self {
            status,
            request_id,
            body,
        })
    }

    /// Body as UTF-8 text
    fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.body)
            .map_err(|e| Error::decode(e, String::from_utf8_lossy(&self.body)))
    }

    fn into_api_error(self) -> Error {
        let body = String::from_utf8_lossy(&self.body).into_owned();
        Error::from_response(self.status, body, self.request_id)
    }
}

/// Outcome of one pass through the retry loop
enum Attempt {
    Done(RawResponse),
    RefreshAuth,
}

/// Discovery client
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct Client {
    pub(crate) config: ClientConfig,
    http: HttpClient,
    endpoints: Endpoints,
    #[cfg(feature = "metrics")]
    metrics: Arc<telemetry::Metrics>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.config.base_url)
            .field("version", &self.config.version)
            .field("auth", &self.config.auth)
            .field("timeout", &self.config.timeout)
            .field("retries", &self.config.retries)
            .finish()
    }
}

impl Client {
    /// Create a new client with the given configuration
    pub(crate) fn new(config: ClientConfig) -> Result<Self> {
        let user_agent = if let Some(suffix) = &config.user_agent_suffix {
            format!("{}/{} {}", USER_AGENT_PREFIX, crate::VERSION, suffix)
        } else {
            format!("{}/{}", USER_AGENT_PREFIX, crate::VERSION)
        };

        let mut http_builder = HttpClient::builder()
            .user_agent(user_agent)
            .default_headers(config.default_headers.clone())
            .timeout(config.timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10);

        if !config.allow_insecure_http {
            http_builder = http_builder.https_only(true);
        }

        let http = http_builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        #[cfg(feature = "metrics")]
        let metrics = if config.telemetry_config.enabled {
            telemetry::init_telemetry(config.telemetry_config.clone())
        } else {
            Arc::new(telemetry::Metrics::new(&config.telemetry_config))
        };

        Ok(Self {
            endpoints: Endpoints::new(&config.base_url),
            http,
            #[cfg(feature = "metrics")]
            metrics,
            config,
        })
    }

    /// The configuration this client was built with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Environments
    // ------------------------------------------------------------------

    /// List environments, optionally filtered by exact name
    pub async fn list_environments(
        &self,
        name: Option<&str>,
    ) -> Result<DetailedResponse<ListEnvironmentsResponse>> {
        let url = self.with_query(self.endpoints.environments(), |q| {
            q.push_opt("name", name);
        });
        self.send(ApiRequest::new("list_environments", Method::GET, url))
            .await
    }

    /// Create an environment
    ///
    /// Most plans allow a single environment per service instance, so this
    /// typically fails with a 400 once one exists.
    pub async fn create_environment(
        &self,
        options: CreateEnvironment,
    ) -> Result<DetailedResponse<Environment>> {
        require("name", &options.name)?;
        let url = self.versioned(self.endpoints.environments());
        let request = ApiRequest::new("create_environment", Method::POST, url).json(&options)?;
        self.send(request).await
    }

    /// Get an environment
    pub async fn get_environment(&self, environment_id: &str) -> Result<DetailedResponse<Environment>> {
        require("environment_id", environment_id)?;
        let url = self.versioned(self.endpoints.environment(environment_id));
        self.send(ApiRequest::new("get_environment", Method::GET, url))
            .await
    }

    /// Update an environment; only fields set in `options` are sent
    pub async fn update_environment(
        &self,
        environment_id: &str,
        options: UpdateEnvironment,
    ) -> Result<DetailedResponse<Environment>> {
        require("environment_id", environment_id)?;
        let url = self.versioned(self.endpoints.environment(environment_id));
        let request = ApiRequest::new("update_environment", Method::PUT, url).json(&options)?;
        self.send(request).await
    }

    /// Delete an environment
    pub async fn delete_environment(
        &self,
        environment_id: &str,
    ) -> Result<DetailedResponse<DeleteEnvironmentResponse>> {
        require("environment_id", environment_id)?;
        let url = self.versioned(self.endpoints.environment(environment_id));
        self.send(ApiRequest::new("delete_environment", Method::DELETE, url))
            .await
    }

    /// List the fields indexed across several collections of an environment
    pub async fn list_fields(
        &self,
        environment_id: &str,
        collection_ids: &[&str],
    ) -> Result<DetailedResponse<ListCollectionFieldsResponse>> {
        require("environment_id", environment_id)?;
        require_list("collection_ids", collection_ids)?;
        let url = self.with_query(self.endpoints.fields(environment_id), |q| {
            q.push_list("collection_ids", collection_ids);
        });
        self.send(ApiRequest::new("list_fields", Method::GET, url))
            .await
    }

    // ------------------------------------------------------------------
    // Configurations
    // ------------------------------------------------------------------

    /// List configurations, optionally filtered by exact name
    pub async fn list_configurations(
        &self,
        environment_id: &str,
        name: Option<&str>,
    ) -> Result<DetailedResponse<ListConfigurationsResponse>> {
        require("environment_id", environment_id)?;
        let url = self.with_query(self.endpoints.configurations(environment_id), |q| {
            q.push_opt("name", name);
        });
        self.send(ApiRequest::new("list_configurations", Method::GET, url))
            .await
    }

    /// Create a configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use discovery_sdk::{Client, ConfigurationOptions};
    /// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
    /// let created = client
    ///     .create_configuration(
    ///         "env-id",
    ///         ConfigurationOptions {
    ///             name: "html-only".to_string(),
    ///             description: Some("strip everything but text".to_string()),
    ///             ..Default::default()
    ///         },
    ///     )
    ///     .await?;
    /// assert!(!created.result.configuration_id.is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_configuration(
        &self,
        environment_id: &str,
        options: ConfigurationOptions,
    ) -> Result<DetailedResponse<Configuration>> {
        require("environment_id", environment_id)?;
        require("name", &options.name)?;
        let url = self.versioned(self.endpoints.configurations(environment_id));
        let request = ApiRequest::new("create_configuration", Method::POST, url).json(&options)?;
        self.send(request).await
    }

    /// Get a configuration
    pub async fn get_configuration(
        &self,
        environment_id: &str,
        configuration_id: &str,
    ) -> Result<DetailedResponse<Configuration>> {
        require("environment_id", environment_id)?;
        require("configuration_id", configuration_id)?;
        let url = self.versioned(self.endpoints.configuration(environment_id, configuration_id));
        self.send(ApiRequest::new("get_configuration", Method::GET, url))
            .await
    }

    /// Replace a configuration
    ///
    /// The service overwrites the stored configuration with `options`;
    /// omitted optional sections are cleared.
    pub async fn update_configuration(
        &self,
        environment_id: &str,
        configuration_id: &str,
        options: ConfigurationOptions,
    ) -> Result<DetailedResponse<Configuration>> {
        require("environment_id", environment_id)?;
        require("configuration_id", configuration_id)?;
        require("name", &options.name)?;
        let url = self.versioned(self.endpoints.configuration(environment_id, configuration_id));
        let request = ApiRequest::new("update_configuration", Method::PUT, url).json(&options)?;
        self.send(request).await
    }

    /// Delete a configuration
    pub async fn delete_configuration(
        &self,
        environment_id: &str,
        configuration_id: &str,
    ) -> Result<DetailedResponse<DeleteConfigurationResponse>> {
        require("environment_id", environment_id)?;
        require("configuration_id", configuration_id)?;
        let url = self.versioned(self.endpoints.configuration(environment_id, configuration_id));
        self.send(ApiRequest::new("delete_configuration", Method::DELETE, url))
            .await
    }

    // ------------------------------------------------------------------
    // Collections
    // ------------------------------------------------------------------

    /// List collections, optionally filtered by exact name
    pub async fn list_collections(
        &self,
        environment_id: &str,
        name: Option<&str>,
    ) -> Result<DetailedResponse<ListCollectionsResponse>> {
        require("environment_id", environment_id)?;
        let url = self.with_query(self.endpoints.collections(environment_id), |q| {
            q.push_opt("name", name);
        });
        self.send(ApiRequest::new("list_collections", Method::GET, url))
            .await
    }

    /// Create a collection
    pub async fn create_collection(
        &self,
        environment_id: &str,
        options: CollectionOptions,
    ) -> Result<DetailedResponse<Collection>> {
        require("environment_id", environment_id)?;
        require("name", &options.name)?;
        let url = self.versioned(self.endpoints.collections(environment_id));
        let request = ApiRequest::new("create_collection", Method::POST, url).json(&options)?;
        self.send(request).await
    }

    /// Get a collection
    pub async fn get_collection(
        &self,
        environment_id: &str,
        collection_id: &str,
    ) -> Result<DetailedResponse<Collection>> {
        require("environment_id", environment_id)?;
        require("collection_id", collection_id)?;
        let url = self.versioned(self.endpoints.collection(environment_id, collection_id));
        self.send(ApiRequest::new("get_collection", Method::GET, url))
            .await
    }

    /// Update a collection's name, description or configuration
    pub async fn update_collection(
        &self,
        environment_id: &str,
        collection_id: &str,
        options: CollectionOptions,
    ) -> Result<DetailedResponse<Collection>> {
        require("environment_id", environment_id)?;
        require("collection_id", collection_id)?;
        require("name", &options.name)?;
        let url = self.versioned(self.endpoints.collection(environment_id, collection_id));
        let request = ApiRequest::new("update_collection", Method::PUT, url).json(&options)?;
        self.send(request).await
    }

    /// Delete a collection and all its documents
    pub async fn delete_collection(
        &self,
        environment_id: &str,
        collection_id: &str,
    ) -> Result<DetailedResponse<DeleteCollectionResponse>> {
        require("environment_id", environment_id)?;
        require("collection_id", collection_id)?;
        let url = self.versioned(self.endpoints.collection(environment_id, collection_id));
        self.send(ApiRequest::new("delete_collection", Method::DELETE, url))
            .await
    }

    /// List the fields indexed in one collection
    pub async fn list_collection_fields(
        &self,
        environment_id: &str,
        collection_id: &str,
    ) -> Result<DetailedResponse<ListCollectionFieldsResponse>> {
        require("environment_id", environment_id)?;
        require("collection_id", collection_id)?;
        let url = self.versioned(self.endpoints.collection_fields(environment_id, collection_id));
        self.send(ApiRequest::new("list_collection_fields", Method::GET, url))
            .await
    }

    // ------------------------------------------------------------------
    // Expansions
    // ------------------------------------------------------------------

    /// Replace the query expansion list of a collection
    pub async fn create_expansions(
        &self,
        environment_id: &str,
        collection_id: &str,
        expansions: Vec<Expansion>,
    ) -> Result<DetailedResponse<Expansions>> {
        require("environment_id", environment_id)?;
        require("collection_id", collection_id)?;
        if expansions.is_empty() {
            return Err(Error::InvalidArgument(
                "expansions must not be empty".to_string(),
            ));
        }
        let url = self.versioned(self.endpoints.expansions(environment_id, collection_id));
        let request = ApiRequest::new("create_expansions", Method::POST, url)
            .json(&Expansions { expansions })?;
        self.send(request).await
    }

    /// List the query expansions of a collection
    pub async fn list_expansions(
        &self,
        environment_id: &str,
        collection_id: &str,
    ) -> Result<DetailedResponse<Expansions>> {
        require("environment_id", environment_id)?;
        require("collection_id", collection_id)?;
        let url = self.versioned(self.endpoints.expansions(environment_id, collection_id));
        self.send(ApiRequest::new("list_expansions", Method::GET, url))
            .await
    }

    /// Remove all query expansions of a collection
    ///
    /// The service answers `204 No Content`, so the result is `()`.
    pub async fn delete_expansions(
        &self,
        environment_id: &str,
        collection_id: &str,
    ) -> Result<DetailedResponse<()>> {
        require("environment_id", environment_id)?;
        require("collection_id", collection_id)?;
        let url = self.versioned(self.endpoints.expansions(environment_id, collection_id));
        let result = self
            .execute_with_retry(&ApiRequest::new("delete_expansions", Method::DELETE, url))
            .await
            .and_then(parse_empty_response);
        self.observe("delete_expansions", result)
    }

    // ------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------

    /// Upload a document into a collection
    ///
    /// The file is sent as `multipart/form-data`. Ingestion is asynchronous;
    /// poll [`Client::get_document_status`] with the returned id.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use discovery_sdk::{Client, DocumentUpload};
    /// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
    /// let html = std::fs::read("resources/simple.html")?;
    /// let added = client
    ///     .add_document("env-id", "coll-id", DocumentUpload::file(html, "simple.html"))
    ///     .await?;
    /// let status = client
    ///     .get_document_status("env-id", "coll-id", &added.result.document_id)
    ///     .await?;
    /// println!("{}", status.result.status);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn add_document(
        &self,
        environment_id: &str,
        collection_id: &str,
        upload: DocumentUpload,
    ) -> Result<DetailedResponse<DocumentAccepted>> {
        require("environment_id", environment_id)?;
        require("collection_id", collection_id)?;
        require_upload(&upload)?;
        let url = self.versioned(self.endpoints.documents(environment_id, collection_id));
        self.send(ApiRequest::new("add_document", Method::POST, url).multipart(upload))
            .await
    }

    /// Get the ingestion status of a document
    pub async fn get_document_status(
        &self,
        environment_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<DetailedResponse<DocumentStatus>> {
        require("environment_id", environment_id)?;
        require("collection_id", collection_id)?;
        require("document_id", document_id)?;
        let url = self.versioned(
            self.endpoints
                .document(environment_id, collection_id, document_id),
        );
        self.send(ApiRequest::new("get_document_status", Method::GET, url))
            .await
    }

    /// Replace a document's content and/or metadata
    pub async fn update_document(
        &self,
        environment_id: &str,
        collection_id: &str,
        document_id: &str,
        upload: DocumentUpload,
    ) -> Result<DetailedResponse<DocumentAccepted>> {
        require("environment_id", environment_id)?;
        require("collection_id", collection_id)?;
        require("document_id", document_id)?;
        require_upload(&upload)?;
        let url = self.versioned(
            self.endpoints
                .document(environment_id, collection_id, document_id),
        );
        self.send(ApiRequest::new("update_document", Method::POST, url).multipart(upload))
            .await
    }

    /// Delete a document
    pub async fn delete_document(
        &self,
        environment_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<DetailedResponse<DeleteDocumentResponse>> {
        require("environment_id", environment_id)?;
        require("collection_id", collection_id)?;
        require("document_id", document_id)?;
        let url = self.versioned(
            self.endpoints
                .document(environment_id, collection_id, document_id),
        );
        self.send(ApiRequest::new("delete_document", Method::DELETE, url))
            .await
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Query a collection
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use discovery_sdk::{Client, QueryOptions};
    /// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
    /// let res = client
    ///     .query(
    ///         "env-id",
    ///         "coll-id",
    ///         QueryOptions {
    ///             natural_language_query: Some("The content of the first chapter".to_string()),
    ///             count: Some(5),
    ///             ..Default::default()
    ///         },
    ///     )
    ///     .await?;
    /// println!("{} matches, token {:?}", res.result.matching_results, res.result.session_token);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn query(
        &self,
        environment_id: &str,
        collection_id: &str,
        options: QueryOptions,
    ) -> Result<DetailedResponse<QueryResponse>> {
        require("environment_id", environment_id)?;
        require("collection_id", collection_id)?;
        let url = self.with_query(self.endpoints.query(environment_id, collection_id), |q| {
            push_query_options(q, &options);
        });
        self.send(ApiRequest::new("query", Method::GET, url)).await
    }

    /// Query several collections of one environment at once
    pub async fn federated_query(
        &self,
        environment_id: &str,
        collection_ids: &[&str],
        options: QueryOptions,
    ) -> Result<DetailedResponse<QueryResponse>> {
        require("environment_id", environment_id)?;
        require_list("collection_ids", collection_ids)?;
        let url = self.with_query(self.endpoints.federated_query(environment_id), |q| {
            q.push_list("collection_ids", collection_ids);
            push_query_options(q, &options);
        });
        self.send(ApiRequest::new("federated_query", Method::GET, url))
            .await
    }

    // ------------------------------------------------------------------
    // Credentials
    // ------------------------------------------------------------------

    /// List source credentials of an environment
    pub async fn list_credentials(
        &self,
        environment_id: &str,
    ) -> Result<DetailedResponse<CredentialsList>> {
        require("environment_id", environment_id)?;
        let url = self.versioned(self.endpoints.credentials_list(environment_id));
        self.send(ApiRequest::new("list_credentials", Method::GET, url))
            .await
    }

    /// Store credentials for a crawl source
    pub async fn create_credentials(
        &self,
        environment_id: &str,
        options: CredentialsOptions,
    ) -> Result<DetailedResponse<Credentials>> {
        require("environment_id", environment_id)?;
        let url = self.versioned(self.endpoints.credentials_list(environment_id));
        let request = ApiRequest::new("create_credentials", Method::POST, url).json(&options)?;
        self.send(request).await
    }

    /// Get source credentials; passwords are never returned
    pub async fn get_credentials(
        &self,
        environment_id: &str,
        credential_id: &str,
    ) -> Result<DetailedResponse<Credentials>> {
        require("environment_id", environment_id)?;
        require("credential_id", credential_id)?;
        let url = self.versioned(self.endpoints.credentials(environment_id, credential_id));
        self.send(ApiRequest::new("get_credentials", Method::GET, url))
            .await
    }

    /// Replace source credentials
    pub async fn update_credentials(
        &self,
        environment_id: &str,
        credential_id: &str,
        options: CredentialsOptions,
    ) -> Result<DetailedResponse<Credentials>> {
        require("environment_id", environment_id)?;
        require("credential_id", credential_id)?;
        let url = self.versioned(self.endpoints.credentials(environment_id, credential_id));
        let request = ApiRequest::new("update_credentials", Method::PUT, url).json(&options)?;
        self.send(request).await
    }

    /// Delete source credentials
    pub async fn delete_credentials(
        &self,
        environment_id: &str,
        credential_id: &str,
    ) -> Result<DetailedResponse<DeleteCredentials>> {
        require("environment_id", environment_id)?;
        require("credential_id", credential_id)?;
        let url = self.versioned(self.endpoints.credentials(environment_id, credential_id));
        self.send(ApiRequest::new("delete_credentials", Method::DELETE, url))
            .await
    }

    // ------------------------------------------------------------------
    // Events, metrics and logs
    // ------------------------------------------------------------------

    /// Report a user interaction with a query result
    ///
    /// `data.session_token` must come from a previous query response.
    pub async fn create_event(
        &self,
        event_type: EventType,
        data: EventData,
    ) -> Result<DetailedResponse<CreateEventResponse>> {
        require("environment_id", &data.environment_id)?;
        require("session_token", &data.session_token)?;
        require("collection_id", &data.collection_id)?;
        require("document_id", &data.document_id)?;
        let url = self.versioned(self.endpoints.events());
        let body = EventBody {
            event_type,
            data: &data,
        };
        let request = ApiRequest::new("create_event", Method::POST, url).json(&body)?;
        self.send(request).await
    }

    /// Percentage of queries with an associated event, over time
    pub async fn get_metrics_event_rate(
        &self,
        range: MetricsRange,
    ) -> Result<DetailedResponse<MetricResponse>> {
        self.get_metrics("get_metrics_event_rate", "event_rate", range)
            .await
    }

    /// Total number of queries, over time
    pub async fn get_metrics_query(
        &self,
        range: MetricsRange,
    ) -> Result<DetailedResponse<MetricResponse>> {
        self.get_metrics("get_metrics_query", "number_of_queries", range)
            .await
    }

    /// Number of queries with at least one event, over time
    pub async fn get_metrics_query_event(
        &self,
        range: MetricsRange,
    ) -> Result<DetailedResponse<MetricResponse>> {
        self.get_metrics(
            "get_metrics_query_event",
            "number_of_queries_with_event",
            range,
        )
        .await
    }

    /// Number of queries that returned no results, over time
    pub async fn get_metrics_query_no_results(
        &self,
        range: MetricsRange,
    ) -> Result<DetailedResponse<MetricResponse>> {
        self.get_metrics(
            "get_metrics_query_no_results",
            "number_of_queries_with_no_search_results",
            range,
        )
        .await
    }

    /// Most frequent query tokens with their event rate
    pub async fn get_metrics_query_token_event(
        &self,
        count: Option<u32>,
    ) -> Result<DetailedResponse<MetricTokenResponse>> {
        let url = self.with_query(
            self.endpoints.metrics("top_query_tokens_with_event_rate"),
            |q| {
                q.push_opt("count", count);
            },
        );
        self.send(ApiRequest::new(
            "get_metrics_query_token_event",
            Method::GET,
            url,
        ))
        .await
    }

    /// Search the query and event log
    ///
    /// Page through the log with `count` and `offset`.
    pub async fn query_log(
        &self,
        options: QueryLogOptions,
    ) -> Result<DetailedResponse<LogQueryResponse>> {
        let url = self.with_query(self.endpoints.logs(), |q| {
            q.push_opt("filter", options.filter.as_deref())
                .push_opt("query", options.query.as_deref())
                .push_opt("count", options.count)
                .push_opt("offset", options.offset)
                .push_list("sort", &options.sort);
        });
        self.send(ApiRequest::new("query_log", Method::GET, url))
            .await
    }

    // Helper methods

    async fn get_metrics(
        &self,
        operation: &'static str,
        metric: &str,
        range: MetricsRange,
    ) -> Result<DetailedResponse<MetricResponse>> {
        let start_time = range.start_time.as_ref().map(format_time).transpose()?;
        let end_time = range.end_time.as_ref().map(format_time).transpose()?;
        let url = self.with_query(self.endpoints.metrics(metric), |q| {
            q.push_opt("start_time", start_time)
                .push_opt("end_time", end_time)
                .push_opt("result_type", range.result_type.map(|r| r.as_str()));
        });
        self.send(ApiRequest::new(operation, Method::GET, url)).await
    }

    /// Append `version` plus operation-specific parameters to a URL
    fn with_query(&self, mut url: String, params: impl FnOnce(&mut QueryParams)) -> String {
        let mut query = QueryParams::new();
        let _ = query.push("version", &self.config.version);
        params(&mut query);
        query.apply(&mut url);
        url
    }

    fn versioned(&self, url: String) -> String {
        self.with_query(url, |_| {})
    }

    /// Build a request with common headers
    fn build_request(
        &self,
        request: &ApiRequest,
        auth: &(&'static str, String),
    ) -> Result<reqwest::RequestBuilder> {
        let request_id = generate_request_id();
        let builder = self
            .http
            .request(request.method.clone(), &request.url)
            .header("X-Request-ID", &request_id)
            .header(auth.0, &auth.1);

        let builder = match &request.payload {
            Payload::Empty => builder,
            Payload::Json(body) => builder.json(body),
            Payload::Multipart(upload) => builder.multipart(build_form(upload)?),
        };

        Ok(builder)
    }

    /// Send a request and decode the body into `T`
    async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<DetailedResponse<T>> {
        let result = self
            .execute_with_retry(&request)
            .await
            .and_then(parse_detailed_response);
        self.observe(request.operation, result)
    }

    /// Count a failed operation before handing the result back
    fn observe<T>(&self, operation: &'static str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            debug!(operation, error = %e, "operation failed");
            #[cfg(feature = "metrics")]
            self.metrics.record_failure(operation, e);
        }
        result
    }

    /// Execute a request, retrying transient failures up to the configured count
    async fn execute_with_retry(&self, request: &ApiRequest) -> Result<RawResponse> {
        let mut token_refresh_count = 0;
        let max_retries = self.config.retries as usize;
        let auth = &self.config.auth;

        loop {
            // Get current auth header (may be refreshed)
            let auth_header = auth
                .get_header()
                .await
                .map_err(|e| Error::Config(format!("Failed to get auth header: {}", e)))?;
            let refresh_allowed = token_refresh_count == 0 && auth.supports_refresh();

            let backoff = ExponentialBackoff {
                initial_interval: Duration::from_millis(100),
                randomization_factor: 0.3,
                multiplier: 2.0,
                max_interval: Duration::from_secs(10),
                max_elapsed_time: Some(Duration::from_secs(60)),
                ..Default::default()
            };

            let retry_count = Arc::new(AtomicUsize::new(0));
            let retry_count_clone = retry_count.clone();

            let result = retry_notify(
                backoff,
                || async {
                    let current_retry = retry_count.load(Ordering::Relaxed);
                    let req = match self.build_request(request, &auth_header).and_then(|b| {
                        b.build()
                            .map_err(|e| Error::Other(format!("Failed to build request: {}", e)))
                    }) {
                        Ok(req) => req,
                        Err(e) => return Err(backoff::Error::Permanent(e)),
                    };

                    debug!(
                        operation = request.operation,
                        method = %request.method,
                        attempt = current_retry + 1,
                        "sending request"
                    );

                    #[cfg(feature = "metrics")]
                    let in_flight = self.metrics.in_flight(request.operation);
                    #[cfg(feature = "metrics")]
                    let start_time = std::time::Instant::now();

                    let response_result = self.http.execute(req).await;

                    let error = match response_result {
                        Ok(response) => {
                            let status = response.status();
                            trace!(
                                operation = request.operation,
                                status = status.as_u16(),
                                "received response"
                            );

                            #[cfg(feature = "metrics")]
                            self.metrics.record_attempt(
                                request.operation,
                                request.method.as_str(),
                                status.as_u16(),
                                start_time.elapsed().as_secs_f64(),
                            );

                            if status == StatusCode::UNAUTHORIZED && refresh_allowed {
                                return Ok(Attempt::RefreshAuth);
                            }
                            match RawResponse::read(response).await {
                                Ok(raw) if status.is_success() => return Ok(Attempt::Done(raw)),
                                Ok(raw) => raw.into_api_error(),
                                Err(e) => e,
                            }
                        }
                        Err(e) => Error::from(e),
                    };
                    #[cfg(feature = "metrics")]
                    drop(in_flight);

                    if error.is_retryable() && current_retry < max_retries {
                        debug!("Retrying request due to: {:?}", error);
                        #[cfg(feature = "metrics")]
                        self.metrics.record_retry(request.operation, &error);
                        Err(backoff::Error::transient(error))
                    } else {
                        Err(backoff::Error::Permanent(error))
                    }
                },
                |err, dur| {
                    let count = retry_count_clone.fetch_add(1, Ordering::Relaxed) + 1;
                    debug!("Retry {} after {:?} due to: {:?}", count, dur, err);
                },
            )
            .await;

            match result {
                Ok(Attempt::Done(response)) => return Ok(response),
                Ok(Attempt::RefreshAuth) => {
                    warn!(
                        operation = request.operation,
                        "Got 401, attempting token refresh"
                    );
                    auth.refresh()
                        .await
                        .map_err(|e| Error::Config(format!("Token refresh failed: {}", e)))?;
                    token_refresh_count += 1;
                    #[cfg(feature = "metrics")]
                    self.metrics.record_token_refresh(request.operation);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Parse a JSON object body into both its raw map and `T`
fn parse_detailed_response<T: DeserializeOwned>(response: RawResponse) -> Result<DetailedResponse<T>> {
    let body = response.text()?;
    let raw = parse_object(body)?;
    let result = serde_json::from_value(Value::Object(raw.clone()))
        .map_err(|e| Error::decode(e, body))?;

    Ok(DetailedResponse {
        result,
        raw,
        status: response.status,
        request_id: response.request_id,
    })
}

/// Parse a response whose body carries no data
fn parse_empty_response(response: RawResponse) -> Result<DetailedResponse<()>> {
    let raw = if response.status == StatusCode::NO_CONTENT.as_u16() {
        Map::new()
    } else {
        parse_object(response.text()?)?
    };

    Ok(DetailedResponse {
        result: (),
        raw,
        status: response.status,
        request_id: response.request_id,
    })
}

/// Reject empty required identifiers before any request goes out
fn require(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidArgument(format!("{} must not be empty", name)));
    }
    Ok(())
}

fn require_list(name: &str, values: &[&str]) -> Result<()> {
    if values.is_empty() {
        return Err(Error::InvalidArgument(format!("{} must not be empty", name)));
    }
    values.iter().try_for_each(|v| require(name, v))
}

fn require_upload(upload: &DocumentUpload) -> Result<()> {
    if upload.is_empty() {
        return Err(Error::InvalidArgument(
            "a document upload needs a file or metadata".to_string(),
        ));
    }
    Ok(())
}

fn format_time(t: &OffsetDateTime) -> Result<String> {
    t.to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|e| Error::InvalidArgument(format!("timestamp is not RFC 3339 representable: {}", e)))
}

fn push_query_options(q: &mut QueryParams, options: &QueryOptions) {
    q.push_opt("filter", options.filter.as_deref())
        .push_opt("query", options.query.as_deref())
        .push_opt("natural_language_query", options.natural_language_query.as_deref())
        .push_opt("passages", options.passages)
        .push_opt("aggregation", options.aggregation.as_deref())
        .push_opt("count", options.count)
        .push_list("return", &options.return_fields)
        .push_opt("offset", options.offset)
        .push_list("sort", &options.sort)
        .push_opt("highlight", options.highlight)
        .push_opt("deduplicate", options.deduplicate);
}

/// Empty bodies decode as an empty object; anything else must be a JSON object
fn parse_object(body: &str) -> Result<Map<String, Value>> {
    if body.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Error::decode(
            format!("expected a JSON object, got {}", json_kind(&other)),
            body,
        )),
        Err(e) => Err(Error::decode(e, body)),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Build the multipart form for a document upload
fn build_form(upload: &DocumentUpload) -> Result<multipart::Form> {
    let mut form = multipart::Form::new();

    if let Some(content) = &upload.file {
        let filename = upload
            .filename
            .clone()
            .unwrap_or_else(|| "file".to_string());
        let content_type = upload
            .file_content_type
            .clone()
            .unwrap_or_else(|| guess_content_type(&filename).to_string());
        let part = multipart::Part::bytes(content.clone())
            .file_name(filename)
            .mime_str(&content_type)
            .map_err(|e| {
                Error::InvalidArgument(format!("invalid content type '{}': {}", content_type, e))
            })?;
        form = form.part("file", part);
    }

    if let Some(metadata) = &upload.metadata {
        let part = multipart::Part::text(metadata.to_string())
            .mime_str("application/json")
            .map_err(|e| Error::Other(format!("Failed to build metadata part: {}", e)))?;
        form = form.part("metadata", part);
    }

    Ok(form)
}
