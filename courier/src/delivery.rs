//! Emission slots shared by every stage of one chain.

use std::sync::{Mutex, PoisonError};

use courier_core::{CachePolicy, CallResult};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::CallError;
use crate::metrics;

/// Completion callback of one call.
pub(crate) type Callback<T> = Box<dyn FnMut(Result<CallResult<T>, CallError>) + Send>;

/// Routes emissions of one call to its callback.
///
/// There are two slots. The early slot takes the single non-terminal
/// emission `CacheThenFetch` may produce; the terminal slot takes the final
/// result or error. Filling the terminal slot closes both and drops the
/// callback, which is what ends a [`Watch`](crate::Watch). Nothing is
/// delivered once the chain is cancelled.
pub(crate) struct Delivery<T> {
    policy: CachePolicy,
    token: CancellationToken,
    slots: Mutex<Slots<T>>,
}

struct Slots<T> {
    callback: Option<Callback<T>>,
    early_open: bool,
}

impl<T> Delivery<T> {
    pub(crate) fn new(policy: CachePolicy, token: CancellationToken, callback: Callback<T>) -> Self {
        Self {
            policy,
            token,
            slots: Mutex::new(Slots {
                callback: Some(callback),
                early_open: true,
            }),
        }
    }

    /// Delivers a payload. Returns whether it reached the caller.
    pub(crate) fn value(&self, result: CallResult<T>) -> bool {
        if self.token.is_cancelled() {
            debug!(source = result.source.as_str(), "dropping emission of cancelled call");
            return false;
        }
        let source = result.source;
        if result.is_final_for(self.policy) {
            let delivered = self.terminal(Ok(result));
            if delivered {
                metrics::record_emission(source);
            }
            return delivered;
        }

        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if !slots.early_open {
            debug!(source = source.as_str(), "early slot already used");
            return false;
        }
        slots.early_open = false;
        match slots.callback.as_mut() {
            Some(callback) => {
                callback(Ok(result));
                metrics::record_emission(source);
                true
            }
            None => false,
        }
    }

    /// Delivers the terminal error.
    pub(crate) fn error(&self, error: CallError) -> bool {
        if self.token.is_cancelled() {
            debug!(%error, "dropping error of cancelled call");
            return false;
        }
        self.terminal(Err(error))
    }

    fn terminal(&self, item: Result<CallResult<T>, CallError>) -> bool {
        let callback = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.early_open = false;
            slots.callback.take()
        };
        match callback {
            Some(mut callback) => {
                callback(item);
                true
            }
            None => {
                debug!("terminal slot already used");
                false
            }
        }
    }
}
