use std::sync::Arc;

use async_trait::async_trait;
use courier_core::{Request, Transport};
use tracing::debug;

use crate::chain::{Chain, Flow, HttpResponse};
use crate::error::CallError;
use crate::interceptor::Interceptor;
use crate::metrics;
use crate::operation::Operation;

/// Hands the operation to the transport.
///
/// Transport failures fail the chain with [`CallError::Transport`]; a non-2xx
/// status fails it with [`CallError::Status`] and passes the response on to
/// the error handler. Cancelling the chain abandons the in-flight request.
#[derive(Clone)]
pub struct NetworkFetchInterceptor {
    transport: Arc<dyn Transport>,
}

impl NetworkFetchInterceptor {
    /// Sends through `transport`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl<R: Request> Interceptor<R> for NetworkFetchInterceptor {
    async fn intercept(
        &self,
        chain: Chain<'_, R>,
        operation: &mut Operation,
        _response: Option<HttpResponse<R::Payload>>,
    ) -> Flow {
        let request = operation.transport_request();
        debug!(method = %request.method, url = %request.url, "sending request");
        metrics::record_transport_attempt();

        let result = tokio::select! {
            _ = chain.cancelled() => {
                debug!("call cancelled, abandoning request");
                return Flow::Cancelled;
            }
            result = self.transport.send(request) => result,
        };

        match result {
            Err(error) => {
                chain
                    .fail(operation, CallError::Transport(error), None)
                    .await
            }
            Ok(raw) if !raw.is_success() => {
                debug!(status = %raw.status, "unsuccessful response");
                let error = CallError::Status { code: raw.status };
                chain.fail(operation, error, Some(&raw)).await
            }
            Ok(raw) => {
                debug!(status = %raw.status, bytes = raw.body.len(), "response received");
                chain.proceed(operation, Some(HttpResponse::new(raw))).await
            }
        }
    }

    fn name(&self) -> &'static str {
        "network_fetch"
    }
}
