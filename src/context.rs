//! # Cancellation Context
//!
//! Every leaf actor execution is bound to exactly one [`Context`]. The context
//! starts live and is cancelled exactly once, either by `Actor::stop` or by the
//! runtime when the worker reports [`WorkerStatus::End`](crate::WorkerStatus::End).
//! Once cancelled it stays cancelled.

use tokio_util::sync::CancellationToken;

/// Read-only handle to an actor's one-shot cancellation signal.
///
/// Cloning is cheap; all clones observe the same signal. Workers are expected
/// to include [`Context::done`] as one branch of every blocking wait:
///
/// ```rust
/// use actor_mailbox::{Context, WorkerStatus};
///
/// async fn step(ctx: &Context, ticks: &mut tokio::time::Interval) -> WorkerStatus {
///     tokio::select! {
///         _ = ticks.tick() => WorkerStatus::Continue,
///         _ = ctx.done() => WorkerStatus::End,
///     }
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
}

impl Context {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once the context has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves when the context is cancelled. Resolves immediately if it
    /// already is.
    pub async fn done(&self) {
        self.token.cancelled().await;
    }

    /// Cancels the context. Repeated calls are no-ops.
    pub(crate) fn cancel(&self) {
        self.token.cancel();
    }
}
