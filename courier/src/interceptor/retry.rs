use std::time::Duration;

use async_trait::async_trait;
use courier_core::Request;
use tracing::warn;

use crate::chain::{Chain, Flow, HttpResponse};
use crate::config::{MaxRetry, RetryBackoff};
use crate::error::CallError;
use crate::interceptor::Interceptor;
use crate::metrics;
use crate::operation::Operation;

/// Re-runs the rest of the chain while it fails with a transport error.
///
/// `max_attempts` counts the first attempt, so `MaxRetry` of 3 means at most
/// two retries. Decode failures, non-2xx responses and provider errors are
/// returned as they are. When every attempt failed the chain fails with
/// [`CallError::RetryExhausted`] carrying the last error.
#[derive(Debug, Clone)]
pub struct RetryInterceptor {
    max_attempts: MaxRetry,
    backoff: Option<RetryBackoff>,
}

impl RetryInterceptor {
    /// Allows up to `max_attempts` attempts with no delay between them.
    pub fn new(max_attempts: MaxRetry) -> Self {
        Self {
            max_attempts,
            backoff: None,
        }
    }

    /// Waits between attempts, doubling the delay each time.
    pub fn with_backoff(mut self, backoff: RetryBackoff) -> Self {
        self.backoff = Some(backoff);
        self
    }

    /// Delay before the attempt following `attempt`.
    fn delay(&self, attempt: u8) -> Duration {
        match &self.backoff {
            Some(backoff) => backoff.delay(attempt),
            None => Duration::ZERO,
        }
    }
}

#[async_trait]
impl<R: Request> Interceptor<R> for RetryInterceptor {
    async fn intercept(
        &self,
        chain: Chain<'_, R>,
        operation: &mut Operation,
        response: Option<HttpResponse<R::Payload>>,
    ) -> Flow {
        let max_attempts = self.max_attempts.get();
        let mut response = response;
        let mut attempt: u8 = 0;
        loop {
            attempt += 1;
            let error = match chain.proceed(operation, response.take()).await {
                Flow::Failed(error) if error.is_retryable() => error,
                flow => return flow,
            };

            if attempt >= max_attempts {
                warn!(attempts = attempt, %error, "retries exhausted");
                let exhausted = CallError::RetryExhausted {
                    attempts: attempt,
                    last: Box::new(error),
                };
                return chain.fail(operation, exhausted, None).await;
            }

            let delay = self.delay(attempt);
            warn!(attempt, max_attempts, ?delay, %error, "transport failure, retrying");
            metrics::record_retry();
            if !delay.is_zero() {
                tokio::select! {
                    _ = chain.cancelled() => return Flow::Cancelled,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "retry"
    }
}
