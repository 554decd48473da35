//! API endpoint URL construction

use crate::util::encode_path;

/// API v1 base path
pub const API_V1_BASE: &str = "/v1";

/// Endpoint builder
#[derive(Debug, Clone)]
pub struct Endpoints {
    base_url: String,
}

impl Endpoints {
    /// Create a new endpoints builder
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Get the full URL for a path
    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_V1_BASE, path)
    }

    // Environments
    pub fn environments(&self) -> String {
        self.url("/environments")
    }

    pub fn environment(&self, environment_id: &str) -> String {
        self.url(&format!("/environments/{}", encode_path(environment_id)))
    }

    pub fn fields(&self, environment_id: &str) -> String {
        format!("{}/fields", self.environment(environment_id))
    }

    pub fn federated_query(&self, environment_id: &str) -> String {
        format!("{}/query", self.environment(environment_id))
    }

    // Configurations
    pub fn configurations(&self, environment_id: &str) -> String {
        format!("{}/configurations", self.environment(environment_id))
    }

    pub fn configuration(&self, environment_id: &str, configuration_id: &str) -> String {
        format!(
            "{}/{}",
            self.configurations(environment_id),
            encode_path(configuration_id)
        )
    }

    // Collections
    pub fn collections(&self, environment_id: &str) -> String {
        format!("{}/collections", self.environment(environment_id))
    }

    pub fn collection(&self, environment_id: &str, collection_id: &str) -> String {
        format!(
            "{}/{}",
            self.collections(environment_id),
            encode_path(collection_id)
        )
    }

    pub fn collection_fields(&self, environment_id: &str, collection_id: &str) -> String {
        format!("{}/fields", self.collection(environment_id, collection_id))
    }

    pub fn expansions(&self, environment_id: &str, collection_id: &str) -> String {
        format!("{}/expansions", self.collection(environment_id, collection_id))
    }

    pub fn query(&self, environment_id: &str, collection_id: &str) -> String {
        format!("{}/query", self.collection(environment_id, collection_id))
    }

    // Documents
    pub fn documents(&self, environment_id: &str, collection_id: &str) -> String {
        format!("{}/documents", self.collection(environment_id, collection_id))
    }

    pub fn document(&self, environment_id: &str, collection_id: &str, document_id: &str) -> String {
        format!(
            "{}/{}",
            self.documents(environment_id, collection_id),
            encode_path(document_id)
        )
    }

    // Credentials
    pub fn credentials_list(&self, environment_id: &str) -> String {
        format!("{}/credentials", self.environment(environment_id))
    }

    pub fn credentials(&self, environment_id: &str, credential_id: &str) -> String {
        format!(
            "{}/{}",
            self.credentials_list(environment_id),
            encode_path(credential_id)
        )
    }

    // Events and logs
    pub fn events(&self) -> String {
        self.url("/events")
    }

    pub fn logs(&self) -> String {
        self.url("/logs")
    }

    // Metrics
    pub fn metrics(&self, name: &str) -> String {
        self.url(&format!("/metrics/{}", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let endpoints = Endpoints::new("https://api.example.com/discovery/api");

        assert_eq!(
            endpoints.environments(),
            "https://api.example.com/discovery/api/v1/environments"
        );
        assert_eq!(
            endpoints.document("env", "coll", "doc 1"),
            "https://api.example.com/discovery/api/v1/environments/env/collections/coll/documents/doc%201"
        );
        assert_eq!(
            endpoints.configuration("env", "cfg"),
            "https://api.example.com/discovery/api/v1/environments/env/configurations/cfg"
        );
        assert_eq!(
            endpoints.credentials("env", "a/b"),
            "https://api.example.com/discovery/api/v1/environments/env/credentials/a%2Fb"
        );
        assert_eq!(
            endpoints.metrics("event_rate"),
            "https://api.example.com/discovery/api/v1/metrics/event_rate"
        );
    }

    #[test]
    fn test_trailing_slash() {
        let endpoints = Endpoints::new("https://api.example.com/");
        assert_eq!(endpoints.events(), "https://api.example.com/v1/events");
        assert_eq!(endpoints.logs(), "https://api.example.com/v1/logs");
    }
}
