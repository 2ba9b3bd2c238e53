use std::sync::Arc;

use async_trait::async_trait;
use courier_core::{CacheKey, CachePolicy, CallResult, Request};
use courier_store::{CacheStore, Store};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::chain::{Chain, Flow, HttpResponse};
use crate::error::CallError;
use crate::interceptor::Interceptor;
use crate::metrics::{self, CacheRead};
use crate::operation::Operation;

/// Consults the cache store according to the operation's cache policy.
///
/// | Policy | Behaviour |
/// |---|---|
/// | `IgnoreCacheCompletely`, `IgnoreCacheData` | proceeds without reading |
/// | `CacheThenFetch` | reads and proceeds concurrently; a hit is emitted early |
/// | `CacheElseFetch` | returns a hit, proceeds on miss |
/// | `CacheOnly` | returns a hit, fails with [`CallError::CacheMissFatal`] on miss |
///
/// A store error counts as a miss.
#[derive(Clone)]
pub struct CacheReadInterceptor {
    store: Arc<dyn Store>,
}

impl CacheReadInterceptor {
    /// Reads from `store`.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn lookup<T>(&self, key: &CacheKey) -> Option<T>
    where
        T: DeserializeOwned + Send,
    {
        match self.store.get::<T>(key).await {
            Ok(Some(payload)) => {
                debug!(store = %self.store.label(), %key, "cache hit");
                metrics::record_cache_read(CacheRead::Hit);
                Some(payload)
            }
            Ok(None) => {
                debug!(store = %self.store.label(), %key, "cache miss");
                metrics::record_cache_read(CacheRead::Miss);
                None
            }
            Err(error) => {
                warn!(store = %self.store.label(), %key, %error, "cache read failed, treating as miss");
                metrics::record_cache_read(CacheRead::Error);
                None
            }
        }
    }
}

#[async_trait]
impl<R: Request> Interceptor<R> for CacheReadInterceptor {
    async fn intercept(
        &self,
        chain: Chain<'_, R>,
        operation: &mut Operation,
        response: Option<HttpResponse<R::Payload>>,
    ) -> Flow {
        let policy = operation.cache_policy();
        if !policy.reads_cache() {
            return chain.proceed(operation, response).await;
        }

        if policy == CachePolicy::CacheThenFetch {
            let key = operation.cache_key().clone();
            let early = async {
                if let Some(payload) = self.lookup::<R::Payload>(&key).await {
                    chain.return_value(CallResult::from_cache(payload));
                }
            };
            let (_, flow) = tokio::join!(early, chain.proceed(operation, response));
            return flow;
        }

        match self.lookup::<R::Payload>(operation.cache_key()).await {
            Some(payload) => chain.return_value(CallResult::from_cache(payload)),
            None if policy.miss_is_fatal() => {
                chain.fail(operation, CallError::CacheMissFatal, None).await
            }
            None => chain.proceed(operation, response).await,
        }
    }

    fn name(&self) -> &'static str {
        "cache_read"
    }
}
