use std::sync::Arc;

use courier_core::{Request, Transport};
use courier_store::Store;

use crate::config::{ClientConfig, MaxRetry, RetryBackoff};
use crate::handler::{ErrorHandler, GitHubErrorHandler};
use crate::interceptor::{Interceptor, StaticHeadersInterceptor};
use crate::operation::Operation;
use crate::provider::{InterceptorProvider, Pipeline};

/// Media type of the GitHub REST API v3.
pub const GITHUB_MEDIA_TYPE: &str = "application/vnd.github.v3+json";

/// Provider for the public GitHub REST API.
///
/// Sends `Accept: application/vnd.github.v3+json` and maps rate limiting,
/// missing resources and unchanged resources through [`GitHubErrorHandler`].
#[derive(Clone)]
pub struct GitHubProvider {
    pipeline: Pipeline,
    accept: Arc<StaticHeadersInterceptor>,
    handler: Arc<GitHubErrorHandler>,
}

impl GitHubProvider {
    /// Creates the provider.
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn Store>, max_retry: MaxRetry) -> Self {
        Self {
            pipeline: Pipeline::new(transport, store, max_retry),
            accept: Arc::new(StaticHeadersInterceptor::accept(GITHUB_MEDIA_TYPE)),
            handler: Arc::new(GitHubErrorHandler),
        }
    }

    /// Creates the provider with the retry settings of `config`.
    pub fn from_config(
        transport: Arc<dyn Transport>,
        store: Arc<dyn Store>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            pipeline: Pipeline::from_config(transport, store, config),
            accept: Arc::new(StaticHeadersInterceptor::accept(GITHUB_MEDIA_TYPE)),
            handler: Arc::new(GitHubErrorHandler),
        }
    }

    /// Waits between retry attempts.
    pub fn with_backoff(mut self, backoff: RetryBackoff) -> Self {
        self.pipeline = self.pipeline.with_backoff(backoff);
        self
    }
}

impl InterceptorProvider for GitHubProvider {
    fn interceptors<R: Request>(&self, _operation: &Operation) -> Vec<Arc<dyn Interceptor<R>>> {
        self.pipeline.assemble(self.accept.clone())
    }

    fn error_handler(&self) -> Option<Arc<dyn ErrorHandler>> {
        Some(self.handler.clone())
    }
}
