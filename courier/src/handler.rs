use std::sync::Arc;

use async_trait::async_trait;
use courier_core::RawResponse;
use http::StatusCode;
use tracing::{debug, warn};

use crate::error::CallError;
use crate::operation::Operation;

/// What an [`ErrorHandler`] decided.
#[derive(Debug)]
pub enum Recovery {
    /// End the chain with this error, remapped or passed through.
    Fail(CallError),
    /// Cancel the chain. The caller observes cancellation, not an error.
    Cancel,
}

/// Provider hook consulted every time a stage fails.
///
/// The handler sees the error, the operation and the response that caused it
/// (if any). It can't resume the chain.
#[async_trait]
pub trait ErrorHandler: Send + Sync {
    /// Decides how the failure ends the chain.
    async fn handle(
        &self,
        error: CallError,
        operation: &Operation,
        response: Option<&RawResponse>,
    ) -> Recovery;
}

/// Maps GitHub status codes to domain errors.
///
/// - `403` becomes [`CallError::RateLimited`]
/// - `404` becomes [`CallError::NotFound`]
/// - `304` becomes [`CallError::NotModified`]
///
/// Everything else passes through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitHubErrorHandler;

#[async_trait]
impl ErrorHandler for GitHubErrorHandler {
    async fn handle(
        &self,
        error: CallError,
        operation: &Operation,
        response: Option<&RawResponse>,
    ) -> Recovery {
        let mapped = match response.map(|response| response.status) {
            Some(StatusCode::FORBIDDEN) => CallError::RateLimited,
            Some(StatusCode::NOT_FOUND) => CallError::NotFound,
            Some(StatusCode::NOT_MODIFIED) => CallError::NotModified,
            _ => return Recovery::Fail(error),
        };
        debug!(request = operation.name(), %error, %mapped, "remapped github error");
        Recovery::Fail(mapped)
    }
}

/// Side effect run when the remote API rejects the stored credentials,
/// e.g. wiping them so the app returns to sign-in.
#[async_trait]
pub trait CredentialRecovery: Send + Sync {
    /// Runs the recovery for the rejected `operation`.
    async fn recover(&self, operation: &Operation);
}

#[async_trait]
impl<F> CredentialRecovery for F
where
    F: Fn() + Send + Sync,
{
    async fn recover(&self, _operation: &Operation) {
        self()
    }
}

/// Handles `401 Unauthorized`.
///
/// With a [`CredentialRecovery`] action the action runs and the chain is
/// cancelled. Without one the call fails with [`CallError::CredentialExpired`].
/// Other errors pass through.
#[derive(Clone, Default)]
pub struct AuthErrorHandler {
    recovery: Option<Arc<dyn CredentialRecovery>>,
}

impl AuthErrorHandler {
    /// Reports rejected credentials as [`CallError::CredentialExpired`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `recovery` on rejected credentials, then cancels the call.
    pub fn with_recovery(recovery: Arc<dyn CredentialRecovery>) -> Self {
        Self {
            recovery: Some(recovery),
        }
    }
}

#[async_trait]
impl ErrorHandler for AuthErrorHandler {
    async fn handle(
        &self,
        error: CallError,
        operation: &Operation,
        response: Option<&RawResponse>,
    ) -> Recovery {
        if response.map(|response| response.status) != Some(StatusCode::UNAUTHORIZED) {
            return Recovery::Fail(error);
        }
        match &self.recovery {
            Some(recovery) => {
                warn!(request = operation.name(), "credentials rejected, running recovery");
                recovery.recover(operation).await;
                Recovery::Cancel
            }
            None => Recovery::Fail(CallError::CredentialExpired),
        }
    }
}
