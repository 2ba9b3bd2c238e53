//! Response types.
//!
//! - [`RawResponse`] - what a transport produced for one network attempt
//! - [`Source`] - where a delivered payload came from
//! - [`CallResult`] - the unit delivered to callers

use http::{HeaderMap, StatusCode};

use crate::{CachePolicy, Raw};

/// Status, headers and undecoded body of one network attempt.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Response status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Undecoded body bytes.
    pub body: Raw,
}

impl RawResponse {
    /// Creates a response with no headers.
    pub fn new(status: StatusCode, body: impl Into<Raw>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// `200 OK` with the given body.
    pub fn ok(body: impl Into<Raw>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Whether the status is in the `2xx` range.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// Origin of a delivered payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Read back from the cache store.
    Cache,
    /// Decoded from a network response.
    Server,
}

impl Source {
    /// Returns the source as a string slice.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Source::Cache => "cache",
            Source::Server => "server",
        }
    }
}

/// A decoded payload tagged with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallResult<T> {
    /// Where the payload came from.
    pub source: Source,
    /// The decoded payload.
    pub data: T,
}

impl<T> CallResult<T> {
    /// A payload read from the cache store.
    pub fn from_cache(data: T) -> Self {
        Self {
            source: Source::Cache,
            data,
        }
    }

    /// A payload decoded from the network.
    pub fn from_server(data: T) -> Self {
        Self {
            source: Source::Server,
            data,
        }
    }

    /// Whether this emission ends a call performed under `policy`.
    #[inline]
    pub fn is_final_for(&self, policy: CachePolicy) -> bool {
        policy.is_terminal(self.source)
    }

    /// Extracts the payload.
    pub fn into_inner(self) -> T {
        self.data
    }
}
