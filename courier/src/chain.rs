use std::sync::Arc;

use courier_core::{CallResult, RawResponse, Request};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::{debug, trace};

use crate::delivery::{Callback, Delivery};
use crate::error::CallError;
use crate::handler::{ErrorHandler, Recovery};
use crate::interceptor::Interceptor;
use crate::operation::Operation;

/// How a stage, and ultimately the whole chain, ended.
#[derive(Debug)]
pub enum Flow {
    /// A value was returned.
    Completed,
    /// The chain failed with this error.
    Failed(CallError),
    /// The chain was cancelled; nothing more will be delivered.
    Cancelled,
}

impl Flow {
    /// Whether the chain failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Flow::Failed(_))
    }
}

/// The latest network response, plus its decoded payload once decoding ran.
#[derive(Debug)]
pub struct HttpResponse<T> {
    /// Response as received from the transport.
    pub raw: RawResponse,
    /// Decoded payload, set by the decode stage.
    pub parsed: Option<T>,
}

impl<T> HttpResponse<T> {
    /// Wraps a response that has not been decoded yet.
    pub fn new(raw: RawResponse) -> Self {
        Self { raw, parsed: None }
    }
}

struct ChainInner<R: Request> {
    interceptors: Vec<Arc<dyn Interceptor<R>>>,
    handler: Option<Arc<dyn ErrorHandler>>,
    token: CancellationToken,
    delivery: Delivery<R::Payload>,
}

/// Handle an interceptor uses to drive the rest of its chain.
///
/// Each stage receives its own handle whose cursor points at the stage after
/// it. Calls on a cancelled chain are no-ops returning [`Flow::Cancelled`].
pub struct Chain<'a, R: Request> {
    inner: &'a ChainInner<R>,
    index: usize,
}

impl<R: Request> Clone for Chain<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: Request> Copy for Chain<'_, R> {}

impl<'a, R: Request> Chain<'a, R> {
    /// Invokes the next interceptor.
    ///
    /// Past the last interceptor the decoded payload is returned as the
    /// server result. If no stage decoded one the chain fails with
    /// [`CallError::NoResponse`].
    pub async fn proceed(
        &self,
        operation: &mut Operation,
        response: Option<HttpResponse<R::Payload>>,
    ) -> Flow {
        if self.is_cancelled() {
            return Flow::Cancelled;
        }
        match self.inner.interceptors.get(self.index) {
            Some(interceptor) => {
                trace!(stage = self.index, interceptor = interceptor.name(), "proceed");
                let next = Chain {
                    inner: self.inner,
                    index: self.index + 1,
                };
                interceptor.intercept(next, operation, response).await
            }
            None => match response.and_then(|response| response.parsed) {
                Some(payload) => self.return_value(CallResult::from_server(payload)),
                None => self.fail(operation, CallError::NoResponse, None).await,
            },
        }
    }

    /// Delivers `result` to the caller without visiting later stages.
    ///
    /// Whether the delivery ends the call depends on the cache policy; see
    /// [`CachePolicy::is_terminal`](courier_core::CachePolicy::is_terminal).
    pub fn return_value(&self, result: CallResult<R::Payload>) -> Flow {
        if self.is_cancelled() {
            return Flow::Cancelled;
        }
        debug!(source = result.source.as_str(), "returning value");
        self.inner.delivery.value(result);
        Flow::Completed
    }

    /// Ends the chain with `error` after offering it to the error handler.
    ///
    /// The handler may remap the error or cancel the chain.
    pub async fn fail(
        &self,
        operation: &Operation,
        error: CallError,
        response: Option<&RawResponse>,
    ) -> Flow {
        if self.is_cancelled() {
            return Flow::Cancelled;
        }
        let recovery = match &self.inner.handler {
            Some(handler) => handler.handle(error, operation, response).await,
            None => Recovery::Fail(error),
        };
        match recovery {
            Recovery::Fail(error) => {
                debug!(%error, "stage failed");
                Flow::Failed(error)
            }
            Recovery::Cancel => {
                debug!("error handler cancelled the chain");
                self.cancel();
                Flow::Cancelled
            }
        }
    }

    /// Cancels the chain. Later calls on any handle of it are no-ops.
    pub fn cancel(&self) {
        self.inner.token.cancel();
    }

    /// Whether the chain has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Resolves once the chain is cancelled.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'a> {
        self.inner.token.cancelled()
    }
}

/// Interceptors, error handler and delivery slots for exactly one call.
///
/// Consumed by [`run`](RequestChain::run), so a chain can't be reused.
pub struct RequestChain<R: Request> {
    inner: ChainInner<R>,
}

impl<R: Request> RequestChain<R> {
    pub(crate) fn new(
        interceptors: Vec<Arc<dyn Interceptor<R>>>,
        handler: Option<Arc<dyn ErrorHandler>>,
        token: CancellationToken,
        delivery: Delivery<R::Payload>,
    ) -> Self {
        Self {
            inner: ChainInner {
                interceptors,
                handler,
                token,
                delivery,
            },
        }
    }

    /// Builds a chain that reports to `callback`.
    pub fn with_callback<F>(
        operation: &Operation,
        interceptors: Vec<Arc<dyn Interceptor<R>>>,
        handler: Option<Arc<dyn ErrorHandler>>,
        token: CancellationToken,
        callback: F,
    ) -> Self
    where
        F: FnMut(Result<CallResult<R::Payload>, CallError>) + Send + 'static,
    {
        let callback: Callback<R::Payload> = Box::new(callback);
        let delivery = Delivery::new(operation.cache_policy(), token.clone(), callback);
        Self::new(interceptors, handler, token, delivery)
    }

    /// Runs `operation` through every interceptor.
    ///
    /// A failure that reaches the root is delivered as the terminal error.
    /// The callback is dropped when this returns.
    pub async fn run(self, mut operation: Operation) {
        let root = Chain {
            inner: &self.inner,
            index: 0,
        };
        match root.proceed(&mut operation, None).await {
            Flow::Completed => trace!("chain completed"),
            Flow::Failed(error) => {
                self.inner.delivery.error(error);
            }
            Flow::Cancelled => debug!("chain cancelled"),
        }
    }
}
