//! Cache-fetch semantics.
//!
//! [`CachePolicy`] decides, per call, whether the cache is read, whether the
//! network is fetched, and which emission ends the call:
//!
//! | Policy | Reads cache | Fetches network | Terminal emission |
//! |---|---|---|---|
//! | [`IgnoreCacheCompletely`](CachePolicy::IgnoreCacheCompletely) | no | yes | server |
//! | [`IgnoreCacheData`](CachePolicy::IgnoreCacheData) | no (still written) | yes | server |
//! | [`CacheThenFetch`](CachePolicy::CacheThenFetch) | yes | always | server |
//! | [`CacheElseFetch`](CachePolicy::CacheElseFetch) | yes | on miss | cache hit or server |
//! | [`CacheOnly`](CachePolicy::CacheOnly) | yes | never | cache hit |
//!
//! Only `CacheThenFetch` may emit twice for one call: an early cache emission
//! followed by the terminal server emission.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::response::Source;

/// How a single call uses the cache store and the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Never touch the store: no read, no write.
    IgnoreCacheCompletely,
    /// Skip the read but still write the fresh payload.
    IgnoreCacheData,
    /// Emit a cached payload early when present, then always fetch.
    #[default]
    CacheThenFetch,
    /// Emit the cached payload when present, otherwise fetch.
    CacheElseFetch,
    /// Emit the cached payload or fail; never fetch.
    CacheOnly,
}

impl CachePolicy {
    /// All policies, in declaration order.
    pub const ALL: [CachePolicy; 5] = [
        CachePolicy::IgnoreCacheCompletely,
        CachePolicy::IgnoreCacheData,
        CachePolicy::CacheThenFetch,
        CachePolicy::CacheElseFetch,
        CachePolicy::CacheOnly,
    ];

    /// Whether the store is consulted before the network.
    #[inline]
    pub const fn reads_cache(&self) -> bool {
        matches!(
            self,
            CachePolicy::CacheThenFetch | CachePolicy::CacheElseFetch | CachePolicy::CacheOnly
        )
    }

    /// Whether the store receives the decoded server payload.
    #[inline]
    pub const fn writes_cache(&self) -> bool {
        !matches!(self, CachePolicy::IgnoreCacheCompletely)
    }

    /// Whether the network may be fetched at all.
    ///
    /// For [`CacheElseFetch`](CachePolicy::CacheElseFetch) this is only on a miss.
    #[inline]
    pub const fn fetches_network(&self) -> bool {
        !matches!(self, CachePolicy::CacheOnly)
    }

    /// Whether a cache miss terminates the call with an error.
    #[inline]
    pub const fn miss_is_fatal(&self) -> bool {
        matches!(self, CachePolicy::CacheOnly)
    }

    /// Whether an emission from `source` ends the call under this policy.
    pub const fn is_terminal(&self, source: Source) -> bool {
        match self {
            CachePolicy::IgnoreCacheCompletely
            | CachePolicy::IgnoreCacheData
            | CachePolicy::CacheThenFetch => matches!(source, Source::Server),
            CachePolicy::CacheElseFetch => true,
            CachePolicy::CacheOnly => matches!(source, Source::Cache),
        }
    }

    /// Returns the policy name as used in configuration and logs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CachePolicy::IgnoreCacheCompletely => "ignore_cache_completely",
            CachePolicy::IgnoreCacheData => "ignore_cache_data",
            CachePolicy::CacheThenFetch => "cache_then_fetch",
            CachePolicy::CacheElseFetch => "cache_else_fetch",
            CachePolicy::CacheOnly => "cache_only",
        }
    }
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
