use courier_core::{CacheKey, CachePolicy, Raw, Request, RequestError, TransportRequest};
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use smol_str::SmolStr;
use url::Url;

/// State of one attempted call, threaded through every interceptor.
///
/// An `Operation` is created when a call starts and dropped when its chain
/// terminates. It snapshots the request's method, target and encoded body,
/// so every stage sees the same [`CacheKey`]. Interceptors can add headers
/// but have no way to alter the method or body.
#[derive(Debug)]
pub struct Operation {
    method: Method,
    url: Url,
    body: Option<Raw>,
    headers: HeaderMap,
    cache_policy: CachePolicy,
    cache_key: CacheKey,
    name: SmolStr,
}

impl Operation {
    /// Snapshots `request` under the resolved `cache_policy`.
    ///
    /// Fails if the body can't be encoded.
    pub fn new<R: Request>(request: &R, cache_policy: CachePolicy) -> Result<Self, RequestError> {
        let method = request.method();
        let url = request.url();
        let body = request.body()?;
        let cache_key = CacheKey::for_request(&method, &url, body.as_deref());
        Ok(Self {
            method,
            url,
            body,
            headers: HeaderMap::new(),
            cache_policy,
            cache_key,
            name: SmolStr::new(request.name()),
        })
    }

    /// HTTP method of the call.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Absolute target of the call.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Encoded request body.
    pub fn body(&self) -> Option<&Raw> {
        self.body.as_ref()
    }

    /// Headers added so far.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Sets a header. A later write for the same name replaces the earlier one.
    pub fn add_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Cache policy this call runs under.
    pub fn cache_policy(&self) -> CachePolicy {
        self.cache_policy
    }

    /// Identity of the call in the cache store.
    pub fn cache_key(&self) -> &CacheKey {
        &self.cache_key
    }

    /// Request name for logs and diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn transport_request(&self) -> TransportRequest {
        TransportRequest {
            method: self.method.clone(),
            url: self.url.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }
}
