use std::sync::Arc;

use async_trait::async_trait;
use courier_core::{Request, RequestError};
use http::header::{AUTHORIZATION, HeaderName, HeaderValue};
use http::HeaderMap;
use smol_str::SmolStr;
use tracing::trace;

use crate::chain::{Chain, Flow, HttpResponse};
use crate::error::CallError;
use crate::interceptor::Interceptor;
use crate::operation::Operation;

/// Adds a fixed set of headers to every call.
#[derive(Debug, Clone, Default)]
pub struct StaticHeadersInterceptor {
    headers: HeaderMap,
}

impl StaticHeadersInterceptor {
    /// No headers yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name: value`, replacing an earlier value for `name`.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sends `Accept: media_type`.
    pub fn accept(media_type: &'static str) -> Self {
        Self::new().header(http::header::ACCEPT, HeaderValue::from_static(media_type))
    }
}

#[async_trait]
impl<R: Request> Interceptor<R> for StaticHeadersInterceptor {
    async fn intercept(
        &self,
        chain: Chain<'_, R>,
        operation: &mut Operation,
        response: Option<HttpResponse<R::Payload>>,
    ) -> Flow {
        for (name, value) in &self.headers {
            operation.add_header(name.clone(), value.clone());
        }
        chain.proceed(operation, response).await
    }

    fn name(&self) -> &'static str {
        "static_headers"
    }
}

/// Where the current access token comes from.
///
/// Called once per attempt, so a refreshed token is picked up by retries.
pub trait TokenSource: Send + Sync {
    /// The current token, or `None` when signed out.
    fn token(&self) -> Option<String>;
}

impl<F> TokenSource for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn token(&self) -> Option<String> {
        self()
    }
}

/// Adds `Authorization` when the token source has a token.
#[derive(Clone)]
pub struct TokenInterceptor {
    source: Arc<dyn TokenSource>,
    scheme: Option<SmolStr>,
}

impl TokenInterceptor {
    /// Sends the token as the raw header value.
    pub fn new(source: Arc<dyn TokenSource>) -> Self {
        Self {
            source,
            scheme: None,
        }
    }

    /// Prefixes the token with `scheme`, e.g. `Bearer`.
    pub fn with_scheme(mut self, scheme: impl Into<SmolStr>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    fn header_value(&self, token: &str) -> Result<HeaderValue, RequestError> {
        let mut value = match &self.scheme {
            Some(scheme) => HeaderValue::try_from(format!("{scheme} {token}"))?,
            None => HeaderValue::from_str(token)?,
        };
        value.set_sensitive(true);
        Ok(value)
    }
}

#[async_trait]
impl<R: Request> Interceptor<R> for TokenInterceptor {
    async fn intercept(
        &self,
        chain: Chain<'_, R>,
        operation: &mut Operation,
        response: Option<HttpResponse<R::Payload>>,
    ) -> Flow {
        let Some(token) = self.source.token() else {
            trace!("no token, sending unauthenticated");
            return chain.proceed(operation, response).await;
        };
        match self.header_value(&token) {
            Ok(value) => {
                operation.add_header(AUTHORIZATION, value);
                chain.proceed(operation, response).await
            }
            Err(error) => {
                chain
                    .fail(operation, CallError::InvalidRequest(error), None)
                    .await
            }
        }
    }

    fn name(&self) -> &'static str {
        "token"
    }
}
