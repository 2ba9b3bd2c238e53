//! Providers assemble the ordered interceptors and the error handler for a
//! call. Each external API gets its own provider.

use std::sync::Arc;

use courier_core::{Request, Transport};
use courier_store::Store;

use crate::config::{ClientConfig, MaxRetry, RetryBackoff};
use crate::handler::ErrorHandler;
use crate::interceptor::{
    CacheReadInterceptor, CacheWriteInterceptor, Interceptor, NetworkFetchInterceptor,
    PayloadDecodeInterceptor, RetryInterceptor,
};
use crate::operation::Operation;

mod authenticated;
mod github;

pub use authenticated::AuthenticatedProvider;
pub use github::{GITHUB_MEDIA_TYPE, GitHubProvider};

/// Builds the interceptor list and error handler for each call.
pub trait InterceptorProvider: Send + Sync + 'static {
    /// Ordered interceptors for `operation`.
    fn interceptors<R: Request>(&self, operation: &Operation) -> Vec<Arc<dyn Interceptor<R>>>;

    /// Handler consulted when a stage fails.
    fn error_handler(&self) -> Option<Arc<dyn ErrorHandler>> {
        None
    }
}

/// The canonical stages shared by the standard providers.
///
/// [`assemble`](Pipeline::assemble) slots the provider's header stage in
/// between cache read and network fetch:
///
/// ```text
/// Retry -> CacheRead -> <headers> -> NetworkFetch -> PayloadDecode -> CacheWrite
/// ```
#[derive(Clone)]
pub struct Pipeline {
    retry: Arc<RetryInterceptor>,
    cache_read: Arc<CacheReadInterceptor>,
    network: Arc<NetworkFetchInterceptor>,
    decode: Arc<PayloadDecodeInterceptor>,
    cache_write: Arc<CacheWriteInterceptor>,
}

impl Pipeline {
    /// Stages over `transport` and `store`, retrying up to `max_retry` attempts.
    pub fn new(transport: Arc<dyn Transport>, store: Arc<dyn Store>, max_retry: MaxRetry) -> Self {
        Self {
            retry: Arc::new(RetryInterceptor::new(max_retry)),
            cache_read: Arc::new(CacheReadInterceptor::new(store.clone())),
            network: Arc::new(NetworkFetchInterceptor::new(transport)),
            decode: Arc::new(PayloadDecodeInterceptor),
            cache_write: Arc::new(CacheWriteInterceptor::new(store)),
        }
    }

    /// Stages retrying as `config` says: `max_retry` attempts, waiting
    /// `retry_backoff` between them when set.
    pub fn from_config(
        transport: Arc<dyn Transport>,
        store: Arc<dyn Store>,
        config: &ClientConfig,
    ) -> Self {
        let pipeline = Self::new(transport, store, config.max_retry);
        match config.retry_backoff {
            Some(backoff) => pipeline.with_backoff(backoff),
            None => pipeline,
        }
    }

    /// Waits between retry attempts.
    pub fn with_backoff(mut self, backoff: RetryBackoff) -> Self {
        let retry = RetryInterceptor::clone(&self.retry).with_backoff(backoff);
        self.retry = Arc::new(retry);
        self
    }

    /// The canonical list with `headers` in the header slot.
    pub fn assemble<R: Request>(
        &self,
        headers: Arc<dyn Interceptor<R>>,
    ) -> Vec<Arc<dyn Interceptor<R>>> {
        vec![
            self.retry.clone() as Arc<dyn Interceptor<R>>,
            self.cache_read.clone() as Arc<dyn Interceptor<R>>,
            headers,
            self.network.clone() as Arc<dyn Interceptor<R>>,
            self.decode.clone() as Arc<dyn Interceptor<R>>,
            self.cache_write.clone() as Arc<dyn Interceptor<R>>,
        ]
    }
}
