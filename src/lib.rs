//! Discovery SDK for Rust
//!
//! A typed client for the Discovery document indexing and retrieval
//! service: manage environments, collections, configurations and source
//! credentials, ingest documents, run queries, and read usage metrics and
//! query logs.
//!
//! # Features
//!
//! - Async/await support with tokio runtime
//! - Opt-in retries with exponential backoff
//! - Multiple authentication methods (Basic, API key, Bearer, token provider)
//! - Multipart document upload with metadata
//! - Typed results alongside the raw JSON body
//! - Comprehensive error handling
//! - Optional blocking facade (`blocking` feature)
//!
//! # Example
//!
//! ```no_run
//! use discovery_sdk::{Auth, ClientBuilder, QueryOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ClientBuilder::new("2017-10-16")
//!         .auth(Auth::basic("username", "password"))
//!         .build()?;
//!
//!     let envs = client.list_environments(None).await?;
//!     for env in &envs.result.environments {
//!         println!("{} {}", env.environment_id, env.name);
//!     }
//!
//!     let res = client
//!         .query(
//!             "env-id",
//!             "coll-id",
//!             QueryOptions {
//!                 query: Some("text:rust".to_string()),
//!                 ..Default::default()
//!             },
//!         )
//!         .await?;
//!     println!("{} matching results", res.result.matching_results);
//!
//!     Ok(())
//! }
//! ```

#![deny(missing_docs, missing_debug_implementations, unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod auth;
/// Blocking facade over the async client
#[cfg(feature = "blocking")]
pub mod blocking;
mod client;
mod config;
mod endpoints;
mod errors;
mod models;
/// Telemetry and observability support
#[cfg(feature = "metrics")]
pub mod telemetry;

#[cfg(not(feature = "metrics"))]
mod telemetry;
mod util;

pub use auth::{Auth, TokenProvider};
pub use client::Client;
pub use config::{ClientBuilder, ClientConfig};
pub use errors::{Error, ErrorKind, Result};
pub use models::*;

// Re-export commonly used types
pub use secrecy::SecretString;

/// SDK version, matches Cargo.toml version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default service URL
pub const DEFAULT_BASE_URL: &str = "https://gateway.watsonplatform.net/discovery/api";

/// Default timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default number of retries
pub const DEFAULT_RETRIES: u32 = 0;
