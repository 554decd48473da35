use crate::{auth::Auth, errors::Result, telemetry::TelemetryConfig, Error};
use http::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

/// Client configuration
///
/// Built once by [`ClientBuilder`] and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the service, without trailing slash
    pub base_url: String,
    /// API version date sent as `?version=` on every request
    pub version: String,
    /// Authentication configuration
    pub auth: Auth,
    /// Headers merged into every request
    pub default_headers: HeaderMap,
    /// Request timeout
    pub timeout: Duration,
    /// Number of retries for transient failures
    pub retries: u32,
    /// User agent suffix
    pub user_agent_suffix: Option<String>,
    /// Telemetry configuration
    pub telemetry_config: TelemetryConfig,
    /// Allow plain HTTP base URLs
    pub allow_insecure_http: bool,
}

/// Builder for creating a configured Client
///
/// # Example
///
/// ```no_run
/// use discovery_sdk::{Auth, ClientBuilder};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ClientBuilder::new("2017-10-16")
///     .auth(Auth::basic("username", "password"))
///     .default_header("X-Watson-Learning-Opt-Out", "1")
///     .timeout_ms(10_000)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: String,
    version: String,
    auth: Option<Auth>,
    default_headers: Vec<(String, String)>,
    timeout_ms: u64,
    retries: u32,
    user_agent_suffix: Option<String>,
    telemetry_config: TelemetryConfig,
    allow_insecure_http: bool,
}

impl ClientBuilder {
    /// Create a new client builder for the given API version date
    ///
    /// # Arguments
    ///
    /// * `version` - API version date, e.g. `"2017-10-16"`
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            base_url: crate::DEFAULT_BASE_URL.to_string(),
            version: version.into(),
            auth: None,
            default_headers: Vec::new(),
            timeout_ms: crate::DEFAULT_TIMEOUT_MS,
            retries: crate::DEFAULT_RETRIES,
            user_agent_suffix: None,
            telemetry_config: TelemetryConfig::default(),
            allow_insecure_http: false,
        }
    }

    /// Override the service base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the authentication method
    pub fn auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Add a header sent with every request
    ///
    /// A later call with the same name replaces the earlier value.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Add several default headers at once
    pub fn default_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.default_headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set the request timeout in milliseconds
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the number of retries for transient failures (default 0)
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Add a custom user agent suffix
    pub fn user_agent_extra(mut self, suffix: impl Into<String>) -> Self {
        self.user_agent_suffix = Some(suffix.into());
        self
    }

    /// Configure telemetry/metrics
    #[cfg(feature = "metrics")]
    pub fn with_telemetry(mut self, config: TelemetryConfig) -> Self {
        self.telemetry_config = config;
        self
    }

    /// Enable telemetry with default settings
    #[cfg(feature = "metrics")]
    pub fn enable_telemetry(mut self) -> Self {
        self.telemetry_config.enabled = true;
        self
    }

    /// Allow plain `http://` base URLs
    ///
    /// Credentials are sent in clear text. Intended for local mock servers.
    pub fn allow_insecure_http(mut self) -> Self {
        self.allow_insecure_http = true;
        self
    }

    /// Build the client with the configured options
    pub fn build(self) -> Result<crate::Client> {
        let url = self.base_url.trim_end_matches('/');

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(Error::Config(
                "Base URL must start with http:// or https://".to_string(),
            ));
        }

        if url.starts_with("http://") && !self.allow_insecure_http {
            return Err(Error::Config(
                "HTTP URLs are not allowed. Use .allow_insecure_http() to enable (dangerous!)"
                    .to_string(),
            ));
        }

        if self.version.trim().is_empty() {
            return Err(Error::Config("API version must not be empty".to_string()));
        }

        let auth = self.auth.ok_or_else(|| {
            Error::Config(
                "Authentication is required. Use .auth() to set authentication method".to_string(),
            )
        })?;

        let mut default_headers = HeaderMap::new();
        for (name, value) in &self.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::Config(format!("Invalid header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::Config(format!("Invalid value for header '{}': {}", name, e)))?;
            let _ = default_headers.insert(name, value);
        }

        let config = ClientConfig {
            base_url: url.to_string(),
            version: self.version,
            auth,
            default_headers,
            timeout: Duration::from_millis(self.timeout_ms),
            retries: self.retries,
            user_agent_suffix: self.user_agent_suffix,
            telemetry_config: self.telemetry_config,
            allow_insecure_http: self.allow_insecure_http,
        };

        crate::client::Client::new(config)
    }
}
