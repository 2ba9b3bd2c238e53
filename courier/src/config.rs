//! Client configuration.
//!
//! [`ClientConfig`] can be built in code or loaded from YAML:
//!
//! ```yaml
//! default_policy: cache_then_fetch
//! async_policy: cache_else_fetch
//! max_retry: 3
//! retry_backoff:
//!   base: 100ms
//!   max: 2s
//! ```

use std::time::Duration;

use bounded_integer::bounded_integer;
use courier_core::CachePolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

bounded_integer! {
    /// Total attempts the retry stage may make for one call (1-16).
    /// A value of 1 disables retrying.
    #[repr(u8)]
    pub struct MaxRetry { 1..=16 }
}

impl MaxRetry {
    /// Three attempts.
    pub const DEFAULT: MaxRetry = match MaxRetry::new(3) {
        Some(value) => value,
        None => panic!("3 is within 1..=16"),
    };
}

impl Default for MaxRetry {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Exponential delay between retry attempts.
///
/// The delay before retry `n` (1-based) is `base * 2^(n-1)`, capped at `max`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
pub struct RetryBackoff {
    /// Delay before the first retry (e.g. "100ms").
    #[serde(with = "humantime_serde")]
    pub base: Duration,
    /// Upper bound for any single delay (e.g. "5s").
    #[serde(with = "humantime_serde")]
    pub max: Duration,
}

impl RetryBackoff {
    /// Creates a backoff starting at `base` and never exceeding `max`.
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max }
    }

    /// Delay after failed attempt number `attempt` (1-based).
    pub fn delay(&self, attempt: u8) -> Duration {
        let exponent = u32::from(attempt.saturating_sub(1)).min(31);
        self.base.saturating_mul(1u32 << exponent).min(self.max)
    }
}

/// Failure to load a [`ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid configuration YAML.
    #[error("invalid client configuration: {0}")]
    Yaml(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Defaults applied to every call made through a [`Client`](crate::Client).
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Policy for `perform` and `watch` when neither the call nor the
    /// request chooses one.
    pub default_policy: CachePolicy,
    /// Policy for `perform_async` when neither the call nor the request
    /// chooses one.
    pub async_policy: CachePolicy,
    /// Attempts the retry stage may make. Read by the `from_config`
    /// constructors of the standard providers.
    pub max_retry: MaxRetry,
    /// Delay between retry attempts. No delay when absent.
    pub retry_backoff: Option<RetryBackoff>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_policy: CachePolicy::CacheThenFetch,
            async_policy: CachePolicy::CacheElseFetch,
            max_retry: MaxRetry::DEFAULT,
            retry_backoff: None,
        }
    }
}

impl ClientConfig {
    /// Parses a YAML document. Missing keys keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_saphyr::from_str(yaml).map_err(|error| ConfigError::Yaml(Box::new(error)))
    }
}
