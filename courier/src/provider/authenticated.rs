use std::sync::Arc;

use courier_core::{Request, Transport};
use courier_store::Store;

use crate::config::{ClientConfig, MaxRetry, RetryBackoff};
use crate::handler::{AuthErrorHandler, CredentialRecovery, ErrorHandler};
use crate::interceptor::{Interceptor, TokenInterceptor, TokenSource};
use crate::operation::Operation;
use crate::provider::{InterceptorProvider, Pipeline};

/// Provider for a first-party API authenticated with an access token.
///
/// Every attempt carries `Authorization` when the token source has a token.
/// A `401` response runs the credential recovery action and cancels the call.
#[derive(Clone)]
pub struct AuthenticatedProvider {
    pipeline: Pipeline,
    token: Arc<TokenInterceptor>,
    handler: Arc<AuthErrorHandler>,
}

impl AuthenticatedProvider {
    /// Creates the provider.
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<dyn Store>,
        max_retry: MaxRetry,
        token: Arc<dyn TokenSource>,
        recovery: Arc<dyn CredentialRecovery>,
    ) -> Self {
        Self {
            pipeline: Pipeline::new(transport, store, max_retry),
            token: Arc::new(TokenInterceptor::new(token)),
            handler: Arc::new(AuthErrorHandler::with_recovery(recovery)),
        }
    }

    /// Creates the provider with the retry settings of `config`.
    pub fn from_config(
        transport: Arc<dyn Transport>,
        store: Arc<dyn Store>,
        config: &ClientConfig,
        token: Arc<dyn TokenSource>,
        recovery: Arc<dyn CredentialRecovery>,
    ) -> Self {
        Self {
            pipeline: Pipeline::from_config(transport, store, config),
            token: Arc::new(TokenInterceptor::new(token)),
            handler: Arc::new(AuthErrorHandler::with_recovery(recovery)),
        }
    }

    /// Prefixes the token with an authorization scheme such as `Bearer`.
    pub fn with_scheme(mut self, scheme: &str) -> Self {
        let token = TokenInterceptor::clone(&self.token).with_scheme(scheme);
        self.token = Arc::new(token);
        self
    }

    /// Waits between retry attempts.
    pub fn with_backoff(mut self, backoff: RetryBackoff) -> Self {
        self.pipeline = self.pipeline.with_backoff(backoff);
        self
    }
}

impl InterceptorProvider for AuthenticatedProvider {
    fn interceptors<R: Request>(&self, _operation: &Operation) -> Vec<Arc<dyn Interceptor<R>>> {
        self.pipeline.assemble(self.token.clone())
    }

    fn error_handler(&self) -> Option<Arc<dyn ErrorHandler>> {
        Some(self.handler.clone())
    }
}
