//! Authentication support for the Discovery SDK
//!
//! Credentials are fixed when the client is built. The SDK supports:
//!
//! 1. **Basic** - service username and password (`Authorization: Basic ...`)
//! 2. **API Key** - sent as `X-API-Key: <key>`
//! 3. **Bearer Token** - a pre-issued access token
//! 4. **Token Provider** - dynamic tokens with refresh on 401
//!
//! # Examples
//!
//! ```
//! use discovery_sdk::Auth;
//!
//! let auth = Auth::basic("service-username", "service-password");
//! let auth = Auth::api_key("your-api-key");
//! let auth = Auth::bearer("your-access-token");
//! ```
//!
//! ## Dynamic Token Provider
//!
//! ```
//! use discovery_sdk::{Auth, TokenProvider, SecretString};
//! use async_trait::async_trait;
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Clone)]
//! struct IamTokens {
//!     current: Arc<Mutex<String>>,
//! }
//!
//! #[async_trait]
//! impl TokenProvider for IamTokens {
//!     async fn get_token(&self) -> Result<SecretString, Box<dyn std::error::Error + Send + Sync>> {
//!         let token = self.current.lock().unwrap().clone();
//!         Ok(SecretString::new(token))
//!     }
//!
//!     async fn refresh_token(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!         *self.current.lock().unwrap() = "refreshed-token".to_string();
//!         Ok(())
//!     }
//!
//!     fn clone_box(&self) -> Box<dyn TokenProvider> {
//!         Box::new(self.clone())
//!     }
//! }
//!
//! let auth = Auth::token_provider(IamTokens {
//!     current: Arc::new(Mutex::new("initial-token".to_string())),
//! });
//! ```

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Authentication method for the Discovery API
///
/// All credentials are stored using [`SecretString`] so they never show up
/// in logs or debug output.
#[derive(Clone)]
pub enum Auth {
    /// HTTP Basic authentication with service credentials
    Basic {
        /// Service username
        username: String,
        /// Service password
        password: SecretString,
    },
    /// API key authentication, sent as `X-API-Key: <key>`
    ApiKey(SecretString),
    /// Bearer token authentication, sent as `Authorization: Bearer <token>`
    Bearer(SecretString),
    /// Dynamic token provider for refreshable tokens
    ///
    /// Supports automatic token refresh on 401 responses
    TokenProvider(Box<dyn TokenProvider>),
}

impl Auth {
    /// Create a Basic authentication from a username and password
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Auth::Basic {
            username: username.into(),
            password: SecretString::new(password.into()),
        }
    }

    /// Create an API key authentication
    pub fn api_key(key: impl Into<String>) -> Self {
        Auth::ApiKey(SecretString::new(key.into()))
    }

    /// Create a bearer token authentication
    pub fn bearer(token: impl Into<String>) -> Self {
        Auth::Bearer(SecretString::new(token.into()))
    }

    /// Create a dynamic token provider authentication
    pub fn token_provider(provider: impl TokenProvider + 'static) -> Self {
        Auth::TokenProvider(Box::new(provider))
    }

    /// Get the authorization header name and value
    pub(crate) async fn get_header(
        &self,
    ) -> Result<(&'static str, String), Box<dyn std::error::Error + Send + Sync>> {
        match self {
            Auth::Basic { username, password } => {
                let credentials = format!("{}:{}", username, password.expose_secret());
                Ok(("Authorization", format!("Basic {}", STANDARD.encode(credentials))))
            }
            Auth::ApiKey(key) => Ok(("X-API-Key", key.expose_secret().clone())),
            Auth::Bearer(token) => Ok(("Authorization", format!("Bearer {}", token.expose_secret()))),
            Auth::TokenProvider(provider) => {
                let token = provider.get_token().await?;
                Ok(("Authorization", format!("Bearer {}", token.expose_secret())))
            }
        }
    }

    /// Check if this auth method supports token refresh
    pub(crate) fn supports_refresh(&self) -> bool {
        matches!(self, Auth::TokenProvider(_))
    }

    /// Refresh the token (only for TokenProvider)
    pub(crate) async fn refresh(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        match self {
            Auth::TokenProvider(provider) => provider.refresh_token().await,
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::Basic { username, .. } => write!(f, "Auth::Basic({}:****)", username),
            Auth::ApiKey(_) => write!(f, "Auth::ApiKey(****)"),
            Auth::Bearer(_) => write!(f, "Auth::Bearer(****)"),
            Auth::TokenProvider(_) => write!(f, "Auth::TokenProvider(****)"),
        }
    }
}

/// Trait for providing dynamic tokens that can be refreshed
///
/// The SDK calls `refresh_token` once when it receives a 401 response and
/// then repeats the request with the new token.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Get the current token
    ///
    /// Called before each request; should return quickly from a cached value.
    async fn get_token(&self) -> Result<SecretString, Box<dyn std::error::Error + Send + Sync>>;

    /// Refresh the token (called on 401 responses)
    async fn refresh_token(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Clone the provider
    ///
    /// Typically implemented as `Box::new(self.clone())`.
    fn clone_box(&self) -> Box<dyn TokenProvider>;
}

impl Clone for Box<dyn TokenProvider> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct FixedToken(String);

    #[async_trait]
    impl TokenProvider for FixedToken {
        async fn get_token(&self) -> Result<SecretString, Box<dyn std::error::Error + Send + Sync>> {
            Ok(SecretString::new(self.0.clone()))
        }

        async fn refresh_token(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            Ok(())
        }

        fn clone_box(&self) -> Box<dyn TokenProvider> {
            Box::new(self.clone())
        }
    }

    #[tokio::test]
    async fn test_auth_headers() {
        let basic = Auth::basic("user", "pass");
        let (header, value) = basic.get_header().await.unwrap();
        assert_eq!(header, "Authorization");
        // base64("user:pass")
        assert_eq!(value, "Basic dXNlcjpwYXNz");

        let api_key = Auth::api_key("key456");
        let (header, value) = api_key.get_header().await.unwrap();
        assert_eq!(header, "X-API-Key");
        assert_eq!(value, "key456");

        let bearer = Auth::bearer("token123");
        let (header, value) = bearer.get_header().await.unwrap();
        assert_eq!(header, "Authorization");
        assert_eq!(value, "Bearer token123");

        let provider = Auth::token_provider(FixedToken("dyn".to_string()));
        let (_, value) = provider.get_header().await.unwrap();
        assert_eq!(value, "Bearer dyn");
    }

    #[test]
    fn test_auth_debug_redacts_secrets() {
        assert_eq!(format!("{:?}", Auth::bearer("secret")), "Auth::Bearer(****)");
        let debug_str = format!("{:?}", Auth::basic("svc-user", "hunter2"));
        assert_eq!(debug_str, "Auth::Basic(svc-user:****)");
        assert!(!debug_str.contains("hunter2"));
    }

    #[test]
    fn test_supports_refresh() {
        assert!(!Auth::basic("u", "p").supports_refresh());
        assert!(!Auth::api_key("key").supports_refresh());
        assert!(!Auth::bearer("token").supports_refresh());
        assert!(Auth::token_provider(FixedToken("t".to_string())).supports_refresh());
    }
}
