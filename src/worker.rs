//! # Worker Contract
//!
//! A [`Worker`] is the unit of repeatable work driven by an [`Actor`](crate::Actor).
//! The runtime calls [`Worker::do_work`] in a loop until it returns
//! [`WorkerStatus::End`]. Cancellation is cooperative: a worker that blocks must
//! also wait on [`Context::done`] and return `End` once it fires.
//!
//! ```rust
//! use actor_mailbox::{Context, Worker, WorkerStatus};
//! use async_trait::async_trait;
//!
//! struct Ticker {
//!     ticks: u32,
//! }
//!
//! #[async_trait]
//! impl Worker for Ticker {
//!     async fn do_work(&mut self, ctx: &Context) -> WorkerStatus {
//!         tokio::select! {
//!             _ = tokio::time::sleep(std::time::Duration::from_millis(10)) => {
//!                 self.ticks += 1;
//!                 WorkerStatus::Continue
//!             }
//!             _ = ctx.done() => WorkerStatus::End,
//!         }
//!     }
//! }
//! ```

use crate::context::Context;
use async_trait::async_trait;
use std::future::Future;

/// Outcome of a single [`Worker::do_work`] step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerStatus {
    /// Run the step again.
    Continue,
    /// Shut this actor's execution down.
    End,
}

/// User-supplied behavior of a leaf actor.
///
/// # Hooks
/// [`Worker::on_start`] runs once inside the actor's task before the first
/// step; [`Worker::on_stop`] runs once after the last step, when the context
/// has already been cancelled. Both default to doing nothing.
#[async_trait]
pub trait Worker: Send + 'static {
    /// Called once before the first step.
    async fn on_start(&mut self, _ctx: &Context) {}

    /// One step of work.
    async fn do_work(&mut self, ctx: &Context) -> WorkerStatus;

    /// Called once after the last step.
    async fn on_stop(&mut self) {}
}

/// Worker backed by a closure. See [`from_fn`].
pub struct WorkerFn<F> {
    step: F,
}

/// Builds a [`Worker`] from a closure returning the step future.
///
/// The closure receives its own clone of the [`Context`] on every call so the
/// returned future can be `'static`.
///
/// ```rust
/// use actor_mailbox::{worker, Actor, WorkerStatus};
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut actor = Actor::new(worker::from_fn(|ctx| async move {
///     ctx.done().await;
///     WorkerStatus::End
/// }));
/// actor.start().unwrap();
/// actor.stop().await.unwrap();
/// # }
/// ```
pub fn from_fn<F, Fut>(step: F) -> WorkerFn<F>
where
    F: FnMut(Context) -> Fut + Send + 'static,
    Fut: Future<Output = WorkerStatus> + Send + 'static,
{
    WorkerFn { step }
}

#[async_trait]
impl<F, Fut> Worker for WorkerFn<F>
where
    F: FnMut(Context) -> Fut + Send + 'static,
    Fut: Future<Output = WorkerStatus> + Send + 'static,
{
    async fn do_work(&mut self, ctx: &Context) -> WorkerStatus {
        (self.step)(ctx.clone()).await
    }
}
