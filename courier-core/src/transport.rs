//! The outbound transport collaborator.
//!
//! The engine never opens connections itself. It hands a fully prepared
//! [`TransportRequest`] to an injected [`Transport`] and gets back either a
//! [`RawResponse`] or a [`TransportError`]. Any status code, including `4xx`
//! and `5xx`, is a successful transport round trip; only connectivity-level
//! problems are errors here.
//!
//! # Examples
//!
//! ```rust
//! use async_trait::async_trait;
//! use courier_core::{RawResponse, Transport, TransportError, TransportRequest};
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl Transport for Echo {
//!     async fn send(&self, request: TransportRequest) -> Result<RawResponse, TransportError> {
//!         Ok(RawResponse::ok(request.body.unwrap_or_default()))
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use http::{HeaderMap, Method};
use thiserror::Error;
use url::Url;

use crate::{Raw, RawResponse};

/// Everything a transport needs to perform one attempt.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute target.
    pub url: Url,
    /// Headers accumulated by the interceptors.
    pub headers: HeaderMap,
    /// Encoded body, if any.
    pub body: Option<Raw>,
}

/// Connectivity-level failure of a transport attempt.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not establish or keep a connection.
    #[error("connection failed: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The attempt did not finish in time.
    #[error("request timed out")]
    Timeout,
    /// Any other transport-level failure.
    #[error("transport failure: {0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    /// Wraps an arbitrary error as a connection failure.
    pub fn connection<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Connection(error.into())
    }

    /// Wraps an arbitrary error as a generic transport failure.
    pub fn other<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        Self::Other(error.into())
    }
}

/// Performs network round trips on behalf of the chain.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request and waits for the complete response body.
    async fn send(&self, request: TransportRequest) -> Result<RawResponse, TransportError>;
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn send(&self, request: TransportRequest) -> Result<RawResponse, TransportError> {
        (**self).send(request).await
    }
}

#[async_trait]
impl<T> Transport for Box<T>
where
    T: Transport + ?Sized,
{
    async fn send(&self, request: TransportRequest) -> Result<RawResponse, TransportError> {
        (**self).send(request).await
    }
}
