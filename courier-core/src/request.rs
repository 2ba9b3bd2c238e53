//! Request descriptions.
//!
//! A [`Request`] is an immutable description of one call: method, absolute
//! target, encoded body, the payload type the response decodes into, and an
//! optional cache-policy override. The payload type is an associated type so
//! the decode stage targets a concrete type chosen at the call site.
//!
//! Callers either implement [`Request`] on their own types or build a
//! [`RequestDescription`]:
//!
//! ```
//! use courier_core::{CachePolicy, Request, RequestDescription};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct Contributor {
//!     login: String,
//!     contributions: u32,
//! }
//!
//! let request = RequestDescription::<Vec<Contributor>>::get("https://api.github.com/repos/a/b/contributors")
//!     .unwrap()
//!     .with_cache_policy(CachePolicy::CacheElseFetch);
//!
//! assert_eq!(request.method(), http::Method::GET);
//! assert_eq!(request.cache_policy(), Some(CachePolicy::CacheElseFetch));
//! ```

use std::fmt;
use std::marker::PhantomData;

use http::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use smol_str::SmolStr;
use thiserror::Error;
use url::Url;

use crate::{CachePolicy, Raw};

/// Failure to build the wire form of a request.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The target could not be parsed as an absolute URL.
    #[error("invalid request url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The body could not be encoded.
    #[error("failed to encode request body: {0}")]
    Body(#[from] serde_json::Error),
    /// A header value contained bytes not allowed on the wire.
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),
}

/// Description of a single call.
///
/// The engine reads every method once, when the call starts, and never
/// touches the request again.
pub trait Request: Send + Sync + 'static {
    /// The type the response body decodes into.
    type Payload: DeserializeOwned + Serialize + Send + Sync + 'static;

    /// HTTP method. Defaults to `GET`.
    fn method(&self) -> Method {
        Method::GET
    }

    /// Absolute, resolved target of the call.
    fn url(&self) -> Url;

    /// Encoded body bytes, if the call carries one.
    fn body(&self) -> Result<Option<Raw>, RequestError> {
        Ok(None)
    }

    /// Per-request cache policy override.
    fn cache_policy(&self) -> Option<CachePolicy> {
        None
    }

    /// Human-readable name used in logs and decode diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A ready-made [`Request`] built from parts.
///
/// `T` is the payload type; it is only used at the type level.
pub struct RequestDescription<T> {
    method: Method,
    url: Url,
    body: Option<Raw>,
    cache_policy: Option<CachePolicy>,
    name: SmolStr,
    _payload: PhantomData<fn() -> T>,
}

impl<T> RequestDescription<T> {
    /// Creates a description for `method` against an already parsed `url`.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            body: None,
            cache_policy: None,
            name: SmolStr::new_static("request"),
            _payload: PhantomData,
        }
    }

    /// `GET` request for the given absolute URL.
    pub fn get(url: &str) -> Result<Self, RequestError> {
        Ok(Self::new(Method::GET, Url::parse(url)?))
    }

    /// `POST` request for the given absolute URL.
    pub fn post(url: &str) -> Result<Self, RequestError> {
        Ok(Self::new(Method::POST, Url::parse(url)?))
    }

    /// Encodes `body` as JSON and attaches it.
    pub fn json_body<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, RequestError> {
        self.body = Some(Raw::from(serde_json::to_vec(body)?));
        Ok(self)
    }

    /// Attaches pre-encoded body bytes.
    pub fn raw_body(mut self, body: impl Into<Raw>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Overrides the cache policy for this request.
    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = Some(policy);
        self
    }

    /// Names the request for logs and diagnostics.
    pub fn named(mut self, name: impl Into<SmolStr>) -> Self {
        self.name = name.into();
        self
    }
}

impl<T> Clone for RequestDescription<T> {
    fn clone(&self) -> Self {
        Self {
            method: self.method.clone(),
            url: self.url.clone(),
            body: self.body.clone(),
            cache_policy: self.cache_policy,
            name: self.name.clone(),
            _payload: PhantomData,
        }
    }
}

impl<T> fmt::Debug for RequestDescription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDescription")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("body_len", &self.body.as_ref().map(|b| b.len()))
            .field("cache_policy", &self.cache_policy)
            .field("payload", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T> Request for RequestDescription<T>
where
    T: DeserializeOwned + Serialize + Send + Sync + 'static,
{
    type Payload = T;

    fn method(&self) -> Method {
        self.method.clone()
    }

    fn url(&self) -> Url {
        self.url.clone()
    }

    fn body(&self) -> Result<Option<Raw>, RequestError> {
        Ok(self.body.clone())
    }

    fn cache_policy(&self) -> Option<CachePolicy> {
        self.cache_policy
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_body_is_encoded_once() {
        let request = RequestDescription::<serde_json::Value>::post("https://a.io/posts")
            .unwrap()
            .json_body(&serde_json::json!({"title": "hi"}))
            .unwrap();
        let body = request.body().unwrap().unwrap();
        assert_eq!(&body[..], br#"{"title":"hi"}"#);
        assert_eq!(request.method(), Method::POST);
    }

    #[test]
    fn relative_url_is_rejected() {
        let result = RequestDescription::<()>::get("/relative/path");
        assert!(matches!(result, Err(RequestError::InvalidUrl(_))));
    }
}
