//! A blocking Discovery client
//!
//! Wraps the async [`crate::Client`] with a private current-thread tokio
//! runtime. Every method blocks the calling thread until the response
//! arrives. Do not use it from inside an async runtime.
//!
//! ```no_run
//! use discovery_sdk::{blocking, Auth, ClientBuilder};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = blocking::Client::new(
//!     ClientBuilder::new("2017-10-16").auth(Auth::basic("username", "password")),
//! )?;
//! let envs = client.list_environments(None)?;
//! println!("{} environments", envs.result.environments.len());
//! # Ok(())
//! # }
//! ```

use crate::{
    config::{ClientBuilder, ClientConfig},
    errors::{Error, Result},
    models::*,
};
use tokio::runtime::{Builder, Runtime};

/// Blocking Discovery client
#[derive(Debug)]
pub struct Client {
    inner: crate::Client,
    runtime: Runtime,
}

macro_rules! blocking_methods {
    ($(
        $(#[$meta:meta])*
        fn $name:ident(&self $(, $arg:ident: $ty:ty)*) -> $ret:ty;
    )*) => {
        $(
            $(#[$meta])*
            pub fn $name(&self $(, $arg: $ty)*) -> Result<DetailedResponse<$ret>> {
                self.runtime.block_on(self.inner.$name($($arg),*))
            }
        )*
    };
}

impl Client {
    /// Build a blocking client from a configured builder
    pub fn new(builder: ClientBuilder) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::Config(format!("Failed to start runtime: {}", e)))?;
        let inner = runtime.block_on(async { builder.build() })?;
        Ok(Self { inner, runtime })
    }

    /// The configuration this client was built with
    pub fn config(&self) -> &ClientConfig {
        self.inner.config()
    }

    blocking_methods! {
        /// See [`crate::Client::list_environments`]
        fn list_environments(&self, name: Option<&str>) -> ListEnvironmentsResponse;
        /// See [`crate::Client::create_environment`]
        fn create_environment(&self, options: CreateEnvironment) -> Environment;
        /// See [`crate::Client::get_environment`]
        fn get_environment(&self, environment_id: &str) -> Environment;
        /// See [`crate::Client::update_environment`]
        fn update_environment(&self, environment_id: &str, options: UpdateEnvironment) -> Environment;
        /// See [`crate::Client::delete_environment`]
        fn delete_environment(&self, environment_id: &str) -> DeleteEnvironmentResponse;
        /// See [`crate::Client::list_fields`]
        fn list_fields(&self, environment_id: &str, collection_ids: &[&str]) -> ListCollectionFieldsResponse;

        /// See [`crate::Client::list_configurations`]
        fn list_configurations(&self, environment_id: &str, name: Option<&str>) -> ListConfigurationsResponse;
        /// See [`crate::Client::create_configuration`]
        fn create_configuration(&self, environment_id: &str, options: ConfigurationOptions) -> Configuration;
        /// See [`crate::Client::get_configuration`]
        fn get_configuration(&self, environment_id: &str, configuration_id: &str) -> Configuration;
        /// See [`crate::Client::update_configuration`]
        fn update_configuration(&self, environment_id: &str, configuration_id: &str, options: ConfigurationOptions) -> Configuration;
        /// See [`crate::Client::delete_configuration`]
        fn delete_configuration(&self, environment_id: &str, configuration_id: &str) -> DeleteConfigurationResponse;

        /// See [`crate::Client::list_collections`]
        fn list_collections(&self, environment_id: &str, name: Option<&str>) -> ListCollectionsResponse;
        /// See [`crate::Client::create_collection`]
        fn create_collection(&self, environment_id: &str, options: CollectionOptions) -> Collection;
        /// See [`crate::Client::get_collection`]
        fn get_collection(&self, environment_id: &str, collection_id: &str) -> Collection;
        /// See [`crate::Client::update_collection`]
        fn update_collection(&self, environment_id: &str, collection_id: &str, options: CollectionOptions) -> Collection;
        /// See [`crate::Client::delete_collection`]
        fn delete_collection(&self, environment_id: &str, collection_id: &str) -> DeleteCollectionResponse;
        /// See [`crate::Client::list_collection_fields`]
        fn list_collection_fields(&self, environment_id: &str, collection_id: &str) -> ListCollectionFieldsResponse;

        /// See [`crate::Client::create_expansions`]
        fn create_expansions(&self, environment_id: &str, collection_id: &str, expansions: Vec<Expansion>) -> Expansions;
        /// See [`crate::Client::list_expansions`]
        fn list_expansions(&self, environment_id: &str, collection_id: &str) -> Expansions;
        /// See [`crate::Client::delete_expansions`]
        fn delete_expansions(&self, environment_id: &str, collection_id: &str) -> ();

        /// See [`crate::Client::add_document`]
        fn add_document(&self, environment_id: &str, collection_id: &str, upload: DocumentUpload) -> DocumentAccepted;
        /// See [`crate::Client::get_document_status`]
        fn get_document_status(&self, environment_id: &str, collection_id: &str, document_id: &str) -> DocumentStatus;
        /// See [`crate::Client::update_document`]
        fn update_document(&self, environment_id: &str, collection_id: &str, document_id: &str, upload: DocumentUpload) -> DocumentAccepted;
        /// See [`crate::Client::delete_document`]
        fn delete_document(&self, environment_id: &str, collection_id: &str, document_id: &str) -> DeleteDocumentResponse;

        /// See [`crate::Client::query`]
        fn query(&self, environment_id: &str, collection_id: &str, options: QueryOptions) -> QueryResponse;
        /// See [`crate::Client::federated_query`]
        fn federated_query(&self, environment_id: &str, collection_ids: &[&str], options: QueryOptions) -> QueryResponse;

        /// See [`crate::Client::list_credentials`]
        fn list_credentials(&self, environment_id: &str) -> CredentialsList;
        /// See [`crate::Client::create_credentials`]
        fn create_credentials(&self, environment_id: &str, options: CredentialsOptions) -> Credentials;
        /// See [`crate::Client::get_credentials`]
        fn get_credentials(&self, environment_id: &str, credential_id: &str) -> Credentials;
        /// See [`crate::Client::update_credentials`]
        fn update_credentials(&self, environment_id: &str, credential_id: &str, options: CredentialsOptions) -> Credentials;
        /// See [`crate::Client::delete_credentials`]
        fn delete_credentials(&self, environment_id: &str, credential_id: &str) -> DeleteCredentials;

        /// See [`crate::Client::create_event`]
        fn create_event(&self, event_type: EventType, data: EventData) -> CreateEventResponse;
        /// See [`crate::Client::get_metrics_event_rate`]
        fn get_metrics_event_rate(&self, range: MetricsRange) -> MetricResponse;
        /// See [`crate::Client::get_metrics_query`]
        fn get_metrics_query(&self, range: MetricsRange) -> MetricResponse;
        /// See [`crate::Client::get_metrics_query_event`]
        fn get_metrics_query_event(&self, range: MetricsRange) -> MetricResponse;
        /// See [`crate::Client::get_metrics_query_no_results`]
        fn get_metrics_query_no_results(&self, range: MetricsRange) -> MetricResponse;
        /// See [`crate::Client::get_metrics_query_token_event`]
        fn get_metrics_query_token_event(&self, count: Option<u32>) -> MetricTokenResponse;
        /// See [`crate::Client::query_log`]
        fn query_log(&self, options: QueryLogOptions) -> LogQueryResponse;
    }
}
