use std::sync::Arc;

use courier_core::{CachePolicy, CallResult, Request};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info_span};

use crate::chain::RequestChain;
use crate::config::ClientConfig;
use crate::error::CallError;
use crate::operation::Operation;
use crate::provider::InterceptorProvider;
use crate::watch::Watch;

/// Cancels the call it was returned for.
///
/// Cancelling is idempotent. After it no further result reaches the callback.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    /// Cancels the call.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the call has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }
}

struct Inner<P> {
    provider: P,
    config: ClientConfig,
}

/// Entry point for performing requests.
///
/// Every call builds a fresh chain from the provider and runs it on its own
/// tokio task, so the methods must be called within a tokio runtime. Cloning
/// is cheap and clones share the provider.
///
/// The cache policy of a call is, most specific first: the `policy`
/// argument, [`Request::cache_policy`], then the configured default for the
/// entry point ([`ClientConfig::default_policy`] for [`perform`](Self::perform)
/// and [`watch`](Self::watch), [`ClientConfig::async_policy`] for
/// [`perform_async`](Self::perform_async)).
pub struct Client<P> {
    inner: Arc<Inner<P>>,
}

impl<P> Clone for Client<P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<P: InterceptorProvider> Client<P> {
    /// Client with the default configuration.
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, ClientConfig::default())
    }

    /// Client with an explicit configuration.
    ///
    /// Only the policy defaults are read here. Build the provider with its
    /// `from_config` constructor to apply the retry settings.
    pub fn with_config(provider: P, config: ClientConfig) -> Self {
        Self {
            inner: Arc::new(Inner { provider, config }),
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Provider in use.
    pub fn provider(&self) -> &P {
        &self.inner.provider
    }

    /// Performs `request`, reporting every emission to `callback`.
    ///
    /// The callback runs once, or twice under `CacheThenFetch` when the
    /// cache holds a value. Nothing is reported after the returned handle
    /// is cancelled.
    pub fn perform<R, F>(&self, request: R, policy: Option<CachePolicy>, callback: F) -> CancelHandle
    where
        R: Request,
        F: FnMut(Result<CallResult<R::Payload>, CallError>) + Send + 'static,
    {
        let policy = self.resolve(&request, policy, self.inner.config.default_policy);
        self.start(request, policy, callback)
    }

    /// Performs `request` and waits for its terminal result.
    ///
    /// A non-terminal cache emission is skipped. Dropping the future cancels
    /// the call. A cancelled call resolves to [`CallError::Cancelled`].
    pub async fn perform_async<R>(
        &self,
        request: R,
        policy: Option<CachePolicy>,
    ) -> Result<R::Payload, CallError>
    where
        R: Request,
    {
        let policy = self.resolve(&request, policy, self.inner.config.async_policy);
        let (sender, receiver) = oneshot::channel();
        let mut sender = Some(sender);
        let handle = self.start(request, policy, move |item: Result<CallResult<R::Payload>, CallError>| {
            if let Ok(result) = &item
                && !result.is_final_for(policy)
            {
                return;
            }
            if let Some(sender) = sender.take() {
                let _ = sender.send(item);
            }
        });
        let _guard = handle.token().clone().drop_guard();

        match receiver.await {
            Ok(item) => item.map(CallResult::into_inner),
            Err(_) => Err(CallError::Cancelled),
        }
    }

    /// Performs `request` and streams every emission.
    ///
    /// The stream ends after the terminal emission or after the first error.
    /// Dropping it, or calling [`Watch::cancel`], cancels the call.
    pub fn watch<R>(&self, request: R, policy: Option<CachePolicy>) -> Watch<R::Payload>
    where
        R: Request,
    {
        let policy = self.resolve(&request, policy, self.inner.config.default_policy);
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = self.start(request, policy, move |item| {
            let _ = sender.send(item);
        });
        Watch::new(receiver, handle)
    }

    fn resolve<R: Request>(
        &self,
        request: &R,
        policy: Option<CachePolicy>,
        fallback: CachePolicy,
    ) -> CachePolicy {
        policy.or_else(|| request.cache_policy()).unwrap_or(fallback)
    }

    fn start<R, F>(&self, request: R, policy: CachePolicy, mut callback: F) -> CancelHandle
    where
        R: Request,
        F: FnMut(Result<CallResult<R::Payload>, CallError>) + Send + 'static,
    {
        let token = CancellationToken::new();
        let handle = CancelHandle {
            token: token.clone(),
        };

        let operation = match Operation::new(&request, policy) {
            Ok(operation) => operation,
            Err(error) => {
                debug!(request = request.name(), %error, "request rejected before dispatch");
                callback(Err(CallError::InvalidRequest(error)));
                return handle;
            }
        };

        let interceptors = self.inner.provider.interceptors::<R>(&operation);
        let handler = self.inner.provider.error_handler();
        let chain = RequestChain::with_callback(&operation, interceptors, handler, token, callback);

        let span = info_span!(
            "courier.call",
            request = operation.name(),
            policy = policy.as_str(),
        );
        tokio::spawn(chain.run(operation).instrument(span));
        handle
    }
}
