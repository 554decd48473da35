//! OpenTelemetry instruments for Discovery calls
//!
//! Every instrument is labelled with the Discovery operation name
//! (`list_collections`, `add_document`, ...). One call to an operation may
//! send several HTTP attempts, so attempts and outcomes are counted apart:
//!
//! | Instrument | Kind | Labels |
//! |------------|------|--------|
//! | `discovery_sdk.attempts` | counter | operation, method, status_class |
//! | `discovery_sdk.attempt.duration` | histogram (s) | operation, status_class |
//! | `discovery_sdk.failures` | counter | operation, kind |
//! | `discovery_sdk.retries` | counter | operation, reason |
//! | `discovery_sdk.token_refreshes` | counter | operation |
//! | `discovery_sdk.in_flight` | up/down counter | operation |
//!
//! Without the `metrics` feature every recorder compiles to nothing.

use crate::errors::{Error, ErrorKind};

#[cfg(feature = "metrics")]
use std::sync::Arc;

#[cfg(feature = "metrics")]
use opentelemetry::{
    metrics::{Counter, Histogram, UpDownCounter},
    KeyValue,
};

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Register instruments with the global meter provider
    pub enabled: bool,
    /// Meter name
    pub service_name: String,
    /// SDK version the instruments belong to
    pub service_version: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            service_name: "discovery-sdk".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg_attr(not(feature = "metrics"), allow(dead_code))]
/// Bucket an HTTP status for the `status_class` label
pub(crate) fn status_class(status: u16) -> &'static str {
    match status {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    }
}

#[cfg_attr(not(feature = "metrics"), allow(dead_code))]
/// Label for a failed call: the error kind, with timeouts split from other
/// transport failures
pub(crate) fn failure_kind(error: &Error) -> &'static str {
    if matches!(error, Error::Timeout) {
        return "timeout";
    }
    match error.kind() {
        ErrorKind::Transport => "transport",
        ErrorKind::Auth => "auth",
        ErrorKind::Validation => "validation",
        ErrorKind::NotFound => "not_found",
        ErrorKind::Conflict => "conflict",
        ErrorKind::RateLimit => "rate_limit",
        ErrorKind::Internal => "internal",
        ErrorKind::ServiceUnavailable => "service_unavailable",
        ErrorKind::Decode => "decode",
        ErrorKind::Config => "config",
        ErrorKind::Other => "other",
    }
}

#[cfg_attr(not(feature = "metrics"), allow(dead_code))]
/// Label for why an attempt is retried: the status code, or the failure kind
/// when no response arrived
pub(crate) fn retry_reason(error: &Error) -> String {
    error
        .status_code()
        .map_or_else(|| failure_kind(error).to_string(), |s| s.to_string())
}

/// Per-operation instruments shared by every clone of a client
#[cfg_attr(not(feature = "metrics"), allow(dead_code))]
#[derive(Clone)]
pub struct Metrics {
    #[cfg(feature = "metrics")]
    attempts: Counter<u64>,
    #[cfg(feature = "metrics")]
    attempt_duration: Histogram<f64>,
    #[cfg(feature = "metrics")]
    failures: Counter<u64>,
    #[cfg(feature = "metrics")]
    retries: Counter<u64>,
    #[cfg(feature = "metrics")]
    token_refreshes: Counter<u64>,
    #[cfg(feature = "metrics")]
    in_flight: UpDownCounter<i64>,
}

impl Metrics {
    /// Register the instruments on the meter named by `config`
    #[cfg(feature = "metrics")]
    pub fn new(config: &TelemetryConfig) -> Self {
        use opentelemetry::global;

        let meter = global::meter(config.service_name.clone());

        Self {
            attempts: meter
                .u64_counter("discovery_sdk.attempts")
                .with_description("HTTP attempts sent to Discovery, by operation and status class")
                .init(),
            attempt_duration: meter
                .f64_histogram("discovery_sdk.attempt.duration")
                .with_description("Seconds from sending an attempt to receiving its headers")
                .init(),
            failures: meter
                .u64_counter("discovery_sdk.failures")
                .with_description("Operations that returned an error, by operation and error kind")
                .init(),
            retries: meter
                .u64_counter("discovery_sdk.retries")
                .with_description("Attempts repeated after a 429, 5xx, transport error or timeout")
                .init(),
            token_refreshes: meter
                .u64_counter("discovery_sdk.token_refreshes")
                .with_description("Bearer tokens refreshed after a 401")
                .init(),
            in_flight: meter
                .i64_up_down_counter("discovery_sdk.in_flight")
                .with_description("Attempts waiting on the service")
                .init(),
        }
    }

    /// Instruments that record nothing
    #[cfg(not(feature = "metrics"))]
    #[allow(dead_code)]
    pub fn new(_config: &TelemetryConfig) -> Self {
        Self {}
    }

    /// Count an attempt that got a response
    #[cfg(feature = "metrics")]
    pub fn record_attempt(&self, operation: &'static str, method: &str, status: u16, duration_secs: f64) {
        let class = status_class(status);
        self.attempts.add(
            1,
            &[
                KeyValue::new("operation", operation),
                KeyValue::new("method", method.to_string()),
                KeyValue::new("status_class", class),
            ],
        );
        self.attempt_duration.record(
            duration_secs,
            &[
                KeyValue::new("operation", operation),
                KeyValue::new("status_class", class),
            ],
        );
    }

    #[cfg(not(feature = "metrics"))]
    #[allow(dead_code)]
    pub fn record_attempt(&self, _operation: &'static str, _method: &str, _status: u16, _duration_secs: f64) {}

    /// Count an operation that returned `error` to the caller
    #[cfg(feature = "metrics")]
    pub fn record_failure(&self, operation: &'static str, error: &Error) {
        self.failures.add(
            1,
            &[
                KeyValue::new("operation", operation),
                KeyValue::new("kind", failure_kind(error)),
            ],
        );
    }

    #[cfg(not(feature = "metrics"))]
    #[allow(dead_code)]
    pub fn record_failure(&self, _operation: &'static str, _error: &Error) {}

    /// Count a retry triggered by `error`
    #[cfg(feature = "metrics")]
    pub fn record_retry(&self, operation: &'static str, error: &Error) {
        self.retries.add(
            1,
            &[
                KeyValue::new("operation", operation),
                KeyValue::new("reason", retry_reason(error)),
            ],
        );
    }

    #[cfg(not(feature = "metrics"))]
    #[allow(dead_code)]
    pub fn record_retry(&self, _operation: &'static str, _error: &Error) {}

    /// Count a token refresh
    #[cfg(feature = "metrics")]
    pub fn record_token_refresh(&self, operation: &'static str) {
        self.token_refreshes
            .add(1, &[KeyValue::new("operation", operation)]);
    }

    #[cfg(not(feature = "metrics"))]
    #[allow(dead_code)]
    pub fn record_token_refresh(&self, _operation: &'static str) {}

    /// Mark an attempt as in flight until the guard drops
    #[cfg_attr(not(feature = "metrics"), allow(dead_code))]
    pub fn in_flight(&self, operation: &'static str) -> InFlight<'_> {
        #[cfg(feature = "metrics")]
        self.in_flight
            .add(1, &[KeyValue::new("operation", operation)]);
        #[cfg(not(feature = "metrics"))]
        let _ = operation;

        InFlight {
            #[cfg(feature = "metrics")]
            metrics: self,
            #[cfg(feature = "metrics")]
            operation,
            _marker: std::marker::PhantomData,
        }
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("enabled", &cfg!(feature = "metrics"))
            .finish()
    }
}

/// Guard returned by [`Metrics::in_flight`]
#[cfg_attr(not(feature = "metrics"), allow(dead_code))]
#[derive(Debug)]
pub struct InFlight<'a> {
    #[cfg(feature = "metrics")]
    metrics: &'a Metrics,
    #[cfg(feature = "metrics")]
    operation: &'static str,
    _marker: std::marker::PhantomData<&'a Metrics>,
}

#[cfg(feature = "metrics")]
impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.metrics
            .in_flight
            .add(-1, &[KeyValue::new("operation", self.operation)]);
    }
}

#[cfg(feature = "metrics")]
static TELEMETRY: std::sync::OnceLock<Arc<Metrics>> = std::sync::OnceLock::new();

/// Instruments registered on the global meter provider
///
/// The first configuration wins; later clients share the same instruments.
#[cfg(feature = "metrics")]
pub fn init_telemetry(config: TelemetryConfig) -> Arc<Metrics> {
    TELEMETRY
        .get_or_init(|| Arc::new(Metrics::new(&config)))
        .clone()
}
