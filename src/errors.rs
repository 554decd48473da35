//! Error types and handling for the Discovery SDK
//!
//! Every operation returns [`Result<T>`]. Failures fall into three groups
//! that callers usually care about:
//!
//! - **Transport**: the request never produced a response
//!   ([`Error::Transport`], [`Error::Timeout`])
//! - **API**: the service answered with a non-2xx status ([`Error::Api`]).
//!   The server body is kept verbatim for diagnosis.
//! - **Decode**: the body did not match the expected shape ([`Error::Decode`])
//!
//! Builder and argument problems are reported before any request is sent
//! ([`Error::Config`], [`Error::InvalidArgument`]).
//!
//! # Example
//!
//! ```no_run
//! # use discovery_sdk::{Client, Error};
//! # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
//! match client.get_collection("env-id", "coll-id").await {
//!     Ok(res) => println!("Collection {}", res.result.name),
//!     Err(e) if e.is_not_found() => println!("Collection is gone"),
//!     Err(Error::Api { status: 401, .. }) => println!("Bad credentials"),
//!     Err(Error::Timeout) => println!("Request timed out"),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

/// Result type alias for the SDK
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the SDK
#[derive(Error, Debug)]
pub enum Error {
    /// Non-2xx response from the service
    #[error("api {status}: {message} (req={request_id:?})")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message extracted from the server body
        message: String,
        /// Raw response body as returned by the server
        body: String,
        /// Transaction id from the response headers
        request_id: Option<String>,
    },

    /// Response body did not match the expected shape
    #[error("decode: {message}")]
    Decode {
        /// What failed to decode
        message: String,
        /// Raw response body
        body: String,
    },

    /// Connection, DNS or other transport failure
    #[error("transport: {0}")]
    Transport(String),

    /// Request timeout
    #[error("timeout")]
    Timeout,

    /// Configuration error
    #[error("config: {0}")]
    Config(String),

    /// Invalid argument passed to an operation
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Other errors
    #[error("other: {0}")]
    Other(String),
}

/// Error categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network or timeout failure
    Transport,
    /// Authentication/authorization errors (401/403)
    Auth,
    /// Validation errors (400, 415, or a rejected argument)
    Validation,
    /// Resource not found (404)
    NotFound,
    /// Conflicting resource state (409)
    Conflict,
    /// Rate limit exceeded (429)
    RateLimit,
    /// Internal server error (500)
    Internal,
    /// Service unavailable (502/503/504)
    ServiceUnavailable,
    /// Body could not be decoded
    Decode,
    /// Configuration error
    Config,
    /// Other/unknown error
    Other,
}

impl ErrorKind {
    /// Classify an HTTP status code
    pub fn from_status(status: u16) -> Self {
        match status {
            400 | 413 | 415 => ErrorKind::Validation,
            401 | 403 => ErrorKind::Auth,
            404 => ErrorKind::NotFound,
            409 => ErrorKind::Conflict,
            429 => ErrorKind::RateLimit,
            500 => ErrorKind::Internal,
            502..=504 => ErrorKind::ServiceUnavailable,
            _ => ErrorKind::Other,
        }
    }
}

impl Error {
    /// Get the error kind for categorization
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Api { status, .. } => ErrorKind::from_status(*status),
            Error::Transport(_) | Error::Timeout => ErrorKind::Transport,
            Error::Decode { .. } => ErrorKind::Decode,
            Error::Config(_) => ErrorKind::Config,
            Error::InvalidArgument(_) => ErrorKind::Validation,
            Error::Other(_) => ErrorKind::Other,
        }
    }

    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Api { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            Error::Transport(_) => true,
            Error::Timeout => true,
            _ => false,
        }
    }

    /// True for a 404 from the service
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    /// Get the HTTP status code if this is an API error
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Get the transaction id if available
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Error::Api { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }

    /// Raw response body for API and decode errors
    pub fn body(&self) -> Option<&str> {
        match self {
            Error::Api { body, .. } | Error::Decode { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Create an API error from a raw server response body
    pub(crate) fn from_response(status: u16, body: String, request_id: Option<String>) -> Self {
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .and_then(ErrorResponse::into_message)
            .unwrap_or_else(|| format!("HTTP error {}", status));

        Error::Api {
            status,
            message,
            body,
            request_id,
        }
    }

    pub(crate) fn decode(message: impl std::fmt::Display, body: impl Into<String>) -> Self {
        Error::Decode {
            message: message.to_string(),
            body: body.into(),
        }
    }
}

/// Server error response structure
///
/// The service is not consistent about which member carries the message.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorResponse {
    fn into_message(self) -> Option<String> {
        match self.error {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Object(obj)) => obj
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string),
            _ => None,
        }
        .or(self.description)
        .or(self.message)
    }
}

/// Errors raised while sending a request or reading its body.
///
/// The client never lets reqwest decode bodies, so anything other than a
/// timeout or a malformed request is a failure of the connection itself.
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else if err.is_builder() {
            Error::Other(err.to_string())
        } else {
            Error::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_from_status() {
        assert_eq!(ErrorKind::from_status(400), ErrorKind::Validation);
        assert_eq!(ErrorKind::from_status(403), ErrorKind::Auth);
        assert_eq!(ErrorKind::from_status(404), ErrorKind::NotFound);
        assert_eq!(ErrorKind::from_status(409), ErrorKind::Conflict);
        assert_eq!(ErrorKind::from_status(503), ErrorKind::ServiceUnavailable);
        assert_eq!(ErrorKind::from_status(418), ErrorKind::Other);
    }

    #[test]
    fn test_error_is_retryable() {
        let err = Error::from_response(429, "{}".to_string(), None);
        assert!(err.is_retryable());

        let err = Error::from_response(404, "{}".to_string(), None);
        assert!(!err.is_retryable());
        assert!(err.is_not_found());

        assert!(Error::Transport("connection refused".to_string()).is_retryable());
        assert!(Error::Timeout.is_retryable());
        assert!(!Error::Config("bad url".to_string()).is_retryable());
        assert!(!Error::decode("missing field", "{}").is_retryable());
    }

    #[test]
    fn test_message_from_error_string() {
        let body = r#"{"code":404,"error":"Collection not found"}"#;
        let err = Error::from_response(404, body.to_string(), Some("txn-1".to_string()));
        match &err {
            Error::Api { message, body: raw, .. } => {
                assert_eq!(message, "Collection not found");
                assert_eq!(raw, body);
            }
            other => panic!("expected Api error, got {:?}", other),
        }
        assert_eq!(err.request_id(), Some("txn-1"));
    }

    #[test]
    fn test_message_from_nested_error_or_description() {
        let err = Error::from_response(
            400,
            r#"{"error":{"message":"bad filter"}}"#.to_string(),
            None,
        );
        assert!(err.to_string().contains("bad filter"));

        let err = Error::from_response(
            400,
            r#"{"code":400,"description":"invalid version"}"#.to_string(),
            None,
        );
        assert!(err.to_string().contains("invalid version"));
    }

    #[test]
    fn test_message_fallback_for_non_json_body() {
        let err = Error::from_response(502, "<html>bad gateway</html>".to_string(), None);
        assert!(err.to_string().contains("HTTP error 502"));
        assert_eq!(err.body(), Some("<html>bad gateway</html>"));
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
    }

    #[test]
    fn test_kinds_for_local_errors() {
        assert_eq!(Error::Timeout.kind(), ErrorKind::Transport);
        assert_eq!(
            Error::InvalidArgument("environment_id".to_string()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(Error::decode("x", "y").kind(), ErrorKind::Decode);
        assert_eq!(Error::Timeout.status_code(), None);
    }
}
