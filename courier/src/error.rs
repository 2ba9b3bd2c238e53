use std::fmt;

use courier_core::{RequestError, TransportError};
use http::StatusCode;
use smol_str::SmolStr;
use thiserror::Error;

/// Everything a call can end with instead of a payload.
///
/// Only [`CallError::Transport`] is retried. Provider error handlers may
/// remap any variant before it reaches the caller.
#[derive(Debug, Error)]
pub enum CallError {
    /// The transport could not complete the round trip.
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    /// The response body did not match the declared payload type.
    #[error("failed to decode `{request}` response at `{path}` ({kind}): {source}")]
    Decode {
        /// Name of the request being decoded.
        request: SmolStr,
        /// Path inside the document where decoding stopped.
        path: String,
        /// What went wrong at that path.
        kind: DecodeErrorKind,
        /// Underlying decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// Nothing was cached and the policy forbids the network.
    #[error("no cached value and the cache policy forbids fetching")]
    CacheMissFatal,

    /// The remote API refused the call because of rate limiting.
    #[error("rate limited")]
    RateLimited,

    /// The requested resource does not exist.
    #[error("not found")]
    NotFound,

    /// The resource has not changed since the cached copy.
    #[error("not modified")]
    NotModified,

    /// Stored credentials were rejected.
    #[error("credentials expired")]
    CredentialExpired,

    /// Every allowed attempt failed with a transport error.
    #[error("giving up after {attempts} attempts: {last}")]
    RetryExhausted {
        /// Number of attempts made.
        attempts: u8,
        /// Failure of the final attempt.
        #[source]
        last: Box<CallError>,
    },

    /// Non-2xx status no error handler remapped.
    #[error("unexpected response status {code}")]
    Status {
        /// The status code received.
        code: StatusCode,
    },

    /// The request could not be turned into a wire request.
    #[error(transparent)]
    InvalidRequest(#[from] RequestError),

    /// The chain ran to its end without producing a payload.
    #[error("chain finished without a response")]
    NoResponse,

    /// The call was cancelled before it produced a terminal result.
    #[error("call cancelled")]
    Cancelled,
}

impl CallError {
    /// Whether the failed attempt may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CallError::Transport(_))
    }

    /// The HTTP status behind the error, if there is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            CallError::Status { code } => Some(*code),
            CallError::RateLimited => Some(StatusCode::FORBIDDEN),
            CallError::NotFound => Some(StatusCode::NOT_FOUND),
            CallError::NotModified => Some(StatusCode::NOT_MODIFIED),
            CallError::CredentialExpired => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }
}

/// Kind of mismatch found while decoding a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// A required key is absent.
    MissingField,
    /// A value has the wrong JSON type.
    InvalidType,
    /// A value has the right type but an unacceptable content,
    /// e.g. an unknown enum variant or a malformed date.
    InvalidValue,
    /// The body is not well-formed JSON or ends early.
    Corrupted,
}

impl DecodeErrorKind {
    /// Classifies a decoder error.
    pub fn classify(error: &serde_json::Error) -> Self {
        use serde_json::error::Category;

        match error.classify() {
            Category::Syntax | Category::Eof | Category::Io => DecodeErrorKind::Corrupted,
            Category::Data => {
                let message = error.to_string();
                if message.starts_with("missing field") {
                    DecodeErrorKind::MissingField
                } else if message.starts_with("invalid type") {
                    DecodeErrorKind::InvalidType
                } else {
                    DecodeErrorKind::InvalidValue
                }
            }
        }
    }

    /// Short name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            DecodeErrorKind::MissingField => "missing field",
            DecodeErrorKind::InvalidType => "type mismatch",
            DecodeErrorKind::InvalidValue => "invalid value",
            DecodeErrorKind::Corrupted => "corrupted data",
        }
    }
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
