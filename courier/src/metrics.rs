//! Metrics declaration and recorders.

use courier_core::Source;

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Track payloads delivered to callers, per source.
    pub static ref EMISSIONS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "courier_emissions_total",
            "Total number of payloads delivered to callers."
        );
        "courier_emissions_total"
    };
    /// Track cache lookups, per result.
    pub static ref CACHE_READ_COUNTER: &'static str = {
        metrics::describe_counter!(
            "courier_cache_read_total",
            "Total number of cache store lookups."
        );
        "courier_cache_read_total"
    };
    /// Track requests handed to the transport.
    pub static ref TRANSPORT_ATTEMPTS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "courier_transport_attempts_total",
            "Total number of transport attempts, retries included."
        );
        "courier_transport_attempts_total"
    };
    /// Track retries after transport failures.
    pub static ref RETRIES_COUNTER: &'static str = {
        metrics::describe_counter!(
            "courier_retries_total",
            "Total number of retries after transport failures."
        );
        "courier_retries_total"
    };
    /// Track cache writes that failed and were swallowed.
    pub static ref STORE_WRITE_ERRORS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "courier_store_write_errors_total",
            "Total number of failed cache store writes."
        );
        "courier_store_write_errors_total"
    };
}

/// Outcome of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheRead {
    /// A live entry was found.
    Hit,
    /// Nothing usable was stored.
    Miss,
    /// The store failed; treated as a miss.
    Error,
}

impl CacheRead {
    /// Label value for this outcome.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CacheRead::Hit => "hit",
            CacheRead::Miss => "miss",
            CacheRead::Error => "error",
        }
    }
}

/// Record a payload delivered to the caller.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_emission(source: Source) {
    metrics::counter!(*EMISSIONS_COUNTER, "source" => source.as_str()).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_emission(_source: Source) {}

/// Record a cache lookup outcome.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_cache_read(result: CacheRead) {
    metrics::counter!(*CACHE_READ_COUNTER, "result" => result.as_str()).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_cache_read(_result: CacheRead) {}

/// Record a transport attempt.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_transport_attempt() {
    metrics::counter!(*TRANSPORT_ATTEMPTS_COUNTER).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_transport_attempt() {}

/// Record a retry.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_retry() {
    metrics::counter!(*RETRIES_COUNTER).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_retry() {}

/// Record a swallowed cache write failure.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_store_write_error(store: &str) {
    metrics::counter!(*STORE_WRITE_ERRORS_COUNTER, "store" => store.to_string()).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_store_write_error(_store: &str) {}
