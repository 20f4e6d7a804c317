use std::future::Future;

use platform_api::{ApiError, ApiResult};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Lifetime of a page. Work started through the scope is abandoned once the
/// scope is cancelled or dropped, and results that arrive afterwards are
/// discarded rather than applied to a page that is gone.
#[derive(Debug)]
pub struct ViewScope {
    view: &'static str,
    token: CancellationToken,
}

impl ViewScope {
    pub fn new(view: &'static str) -> Self {
        Self {
            view,
            token: CancellationToken::new(),
        }
    }

    /// Scope cancelled together with this one.
    pub fn child(&self, view: &'static str) -> Self {
        Self {
            view,
            token: self.token.child_token(),
        }
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub async fn guard<F>(&self, work: F) -> Option<F::Output>
    where
        F: Future,
    {
        let output = tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            output = work => Some(output),
        };
        if output.is_none() || self.token.is_cancelled() {
            debug!(view = self.view, "discarding result for torn-down view");
            return None;
        }
        output
    }

    /// [`ViewScope::guard`] for API calls: cancellation becomes
    /// [`ApiError::Cancelled`].
    pub async fn request<T, F>(&self, call: F) -> ApiResult<T>
    where
        F: Future<Output = ApiResult<T>>,
    {
        self.guard(call).await.unwrap_or(Err(ApiError::Cancelled))
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
