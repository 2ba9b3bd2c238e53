use std::pin::Pin;
use std::task::{Context, Poll};

use courier_core::CallResult;
use futures::Stream;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::client::CancelHandle;
use crate::error::CallError;

/// Stream of the emissions of one call, returned by
/// [`Client::watch`](crate::Client::watch).
///
/// Yields each payload in arrival order and ends after the terminal emission
/// or the first error. Once ended it keeps returning `None`. Cancelling
/// through any [`CancelHandle`] ends it at the next poll, even if emissions
/// are still queued. Dropping the stream cancels the call.
#[must_use = "dropping a Watch cancels its call"]
pub struct Watch<T> {
    receiver: UnboundedReceiver<Result<CallResult<T>, CallError>>,
    handle: CancelHandle,
    finished: bool,
}

impl<T> Watch<T> {
    pub(crate) fn new(
        receiver: UnboundedReceiver<Result<CallResult<T>, CallError>>,
        handle: CancelHandle,
    ) -> Self {
        Self {
            receiver,
            handle,
            finished: false,
        }
    }

    /// Cancels the call and ends the stream.
    pub fn cancel(&mut self) {
        self.handle.cancel();
        self.finish();
    }

    /// Handle cancelling the underlying call.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.handle.clone()
    }

    fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            self.receiver.close();
        }
    }
}

impl<T> Unpin for Watch<T> {}

impl<T> Stream for Watch<T> {
    type Item = Result<CallResult<T>, CallError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }
        // Emissions still queued when the call was cancelled are dropped.
        if this.handle.is_cancelled() {
            this.finish();
            return Poll::Ready(None);
        }
        match this.receiver.poll_recv(cx) {
            Poll::Ready(Some(item)) => {
                if item.is_err() {
                    this.finish();
                }
                Poll::Ready(Some(item))
            }
            Poll::Ready(None) => {
                this.finish();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> Drop for Watch<T> {
    fn drop(&mut self) {
        self.handle.cancel();
    }
}
