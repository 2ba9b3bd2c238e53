//! Pipeline stages.
//!
//! Canonical order, as assembled by [`Pipeline`](crate::Pipeline):
//!
//! 1. [`RetryInterceptor`] - re-runs the rest of the chain on transport failures
//! 2. [`CacheReadInterceptor`] - consults the store according to the cache policy
//! 3. [`StaticHeadersInterceptor`] / [`TokenInterceptor`] - header injection
//! 4. [`NetworkFetchInterceptor`] - performs the transport call
//! 5. [`PayloadDecodeInterceptor`] - decodes the body into the payload type
//! 6. [`CacheWriteInterceptor`] - persists the decoded payload

use async_trait::async_trait;
use courier_core::Request;

use crate::chain::{Chain, Flow, HttpResponse};
use crate::operation::Operation;

mod cache_read;
mod cache_write;
mod decode;
mod headers;
mod network;
mod retry;

pub use cache_read::CacheReadInterceptor;
pub use cache_write::CacheWriteInterceptor;
pub use decode::{PayloadDecodeInterceptor, decode};
pub use headers::{StaticHeadersInterceptor, TokenInterceptor, TokenSource};
pub use network::NetworkFetchInterceptor;
pub use retry::RetryInterceptor;

/// One stage of a request chain.
///
/// An implementation ends by returning the [`Flow`] of exactly one of
/// [`Chain::proceed`], [`Chain::return_value`] or [`Chain::fail`], or
/// [`Flow::Cancelled`] after [`Chain::cancel`]. It may suspend for I/O before
/// doing so.
///
/// ```
/// use async_trait::async_trait;
/// use courier::{Chain, Flow, HttpResponse, Interceptor, Operation, Request};
///
/// struct Trace;
///
/// #[async_trait]
/// impl<R: Request> Interceptor<R> for Trace {
///     async fn intercept(
///         &self,
///         chain: Chain<'_, R>,
///         operation: &mut Operation,
///         response: Option<HttpResponse<R::Payload>>,
///     ) -> Flow {
///         let flow = chain.proceed(operation, response).await;
///         println!("{} finished: failed = {}", operation.name(), flow.is_failed());
///         flow
///     }
/// }
/// ```
#[async_trait]
pub trait Interceptor<R: Request>: Send + Sync {
    /// Runs this stage.
    async fn intercept(
        &self,
        chain: Chain<'_, R>,
        operation: &mut Operation,
        response: Option<HttpResponse<R::Payload>>,
    ) -> Flow;

    /// Name used in trace output.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
