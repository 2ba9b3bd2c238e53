use std::sync::Arc;

use async_trait::async_trait;
use courier_core::Request;
use courier_store::{CacheStore, Store};
use tracing::{debug, warn};

use crate::chain::{Chain, Flow, HttpResponse};
use crate::interceptor::Interceptor;
use crate::metrics;
use crate::operation::Operation;

/// Persists the decoded payload and raw body under the request identity.
///
/// Skipped under `IgnoreCacheCompletely`. A failed write is logged and
/// never changes the outcome of the call.
#[derive(Clone)]
pub struct CacheWriteInterceptor {
    store: Arc<dyn Store>,
}

impl CacheWriteInterceptor {
    /// Writes to `store`.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<R: Request> Interceptor<R> for CacheWriteInterceptor {
    async fn intercept(
        &self,
        chain: Chain<'_, R>,
        operation: &mut Operation,
        response: Option<HttpResponse<R::Payload>>,
    ) -> Flow {
        if operation.cache_policy().writes_cache()
            && let Some(HttpResponse {
                raw,
                parsed: Some(payload),
            }) = &response
        {
            let key = operation.cache_key();
            match self.store.put(key, payload, raw.body.clone()).await {
                Ok(()) => debug!(store = %self.store.label(), %key, "cache write"),
                Err(error) => {
                    warn!(store = %self.store.label(), %key, %error, "cache write failed");
                    metrics::record_store_write_error(self.store.label().as_str());
                }
            }
        }
        chain.proceed(operation, response).await
    }

    fn name(&self) -> &'static str {
        "cache_write"
    }
}
