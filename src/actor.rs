//! # Actor Lifecycle
//!
//! This module defines [`Actor`], the schedulable unit of the runtime. An actor
//! is either a **leaf**, which owns exactly one Tokio task driving a
//! [`Worker`], or a **combined** actor built with [`combine`], which fans
//! `start`/`stop` out to its children without owning a task of its own.
//! [`idle`] builds a leaf whose only job is to run a teardown hook when stopped.
//!
//! ## State Machine
//!
//! ```text
//! Created --start--> Running --stop--> Stopped
//!    |                                    ^
//!    +---------------stop-----------------+
//! ```
//!
//! - `start` spawns the task bound to a fresh [`Context`]. It must be called
//!   from inside a Tokio runtime.
//! - `stop` cancels the context, then waits until the task has exited. No step
//!   of the worker survives a returned `stop`.
//! - Stopping a stopped actor is a no-op. Stopping a never-started actor moves
//!   it to `Stopped` without ever running its worker (hooks included).
//! - Starting a running or stopped actor is a usage error and is reported as
//!   [`ActorError::AlreadyStarted`] / [`ActorError::AlreadyStopped`].
//!
//! Both operations take `&mut self`, so concurrent `stop` callers are ruled
//! out by the borrow checker; share an actor behind a mutex if several tasks
//! need to stop it.
//!
//! ## Cooperative Cancellation
//!
//! The runtime never preempts a step. The task loop is simply:
//!
//! ```rust,ignore
//! worker.on_start(&ctx).await;
//! while worker.do_work(&ctx).await == WorkerStatus::Continue {}
//! ctx.cancel();
//! worker.on_stop().await;
//! ```
//!
//! A worker that never waits on [`Context::done`] will keep `stop` waiting.
//!
//! ## Composition
//!
//! ```rust
//! use actor_mailbox::{actor, worker, Actor, WorkerStatus};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let producer = Actor::new(worker::from_fn(|ctx| async move {
//!     ctx.done().await;
//!     WorkerStatus::End
//! }));
//! let teardown = actor::idle(|| println!("closing resources"));
//!
//! let mut group = actor::combine(vec![producer, teardown]);
//! group.start().unwrap();
//! group.stop().await.unwrap();
//! # }
//! ```

use crate::context::Context;
use crate::error::ActorError;
use crate::worker::{Worker, WorkerStatus};
use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A startable/stoppable unit of execution.
pub struct Actor {
    kind: ActorKind,
}

enum ActorKind {
    Leaf(Leaf),
    Combined(Vec<Actor>),
}

struct Leaf {
    name: &'static str,
    state: LeafState,
}

enum LeafState {
    Created(Box<dyn Worker>),
    Running { ctx: Context, handle: JoinHandle<()> },
    Stopped,
}

impl Actor {
    /// Creates a leaf actor driven by `worker`. Nothing runs until
    /// [`Actor::start`].
    pub fn new<W: Worker>(worker: W) -> Self {
        Self {
            kind: ActorKind::Leaf(Leaf {
                name: short_type_name::<W>(),
                state: LeafState::Created(Box::new(worker)),
            }),
        }
    }

    /// Starts the actor. For a combined actor every child is started; the first
    /// error is returned after all children have been attempted.
    pub fn start(&mut self) -> Result<(), ActorError> {
        match &mut self.kind {
            ActorKind::Leaf(leaf) => leaf.start(),
            ActorKind::Combined(children) => {
                let mut result = Ok(());
                for child in children.iter_mut() {
                    if let Err(e) = child.start() {
                        result = result.and(Err(e));
                    }
                }
                result
            }
        }
    }

    /// Stops the actor and waits until every task it owns has exited.
    ///
    /// All leaves are cancelled before any of them is awaited, so members of a
    /// combined actor never wait on each other's shutdown order.
    pub async fn stop(&mut self) -> Result<(), ActorError> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);

        for leaf in leaves.iter_mut() {
            leaf.cancel();
        }

        let mut result = Ok(());
        for leaf in leaves {
            if let Err(e) = leaf.join().await {
                result = result.and(Err(e));
            }
        }
        result
    }

    /// `true` while any task owned by this actor is running. A worker that
    /// returned [`WorkerStatus::End`] on its own no longer counts, even
    /// before `stop` joins it.
    pub fn is_running(&self) -> bool {
        match &self.kind {
            ActorKind::Leaf(leaf) => match &leaf.state {
                LeafState::Running { handle, .. } => !handle.is_finished(),
                LeafState::Created(_) | LeafState::Stopped => false,
            },
            ActorKind::Combined(children) => children.iter().any(Actor::is_running),
        }
    }

    fn collect_leaves<'a>(&'a mut self, out: &mut Vec<&'a mut Leaf>) {
        match &mut self.kind {
            ActorKind::Leaf(leaf) => out.push(leaf),
            ActorKind::Combined(children) => {
                for child in children.iter_mut() {
                    child.collect_leaves(out);
                }
            }
        }
    }
}

impl std::fmt::Debug for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ActorKind::Leaf(leaf) => f
                .debug_struct("Actor")
                .field("worker", &leaf.name)
                .field("running", &self.is_running())
                .finish(),
            ActorKind::Combined(children) => {
                f.debug_struct("Actor").field("children", children).finish()
            }
        }
    }
}

impl Leaf {
    fn start(&mut self) -> Result<(), ActorError> {
        match std::mem::replace(&mut self.state, LeafState::Stopped) {
            LeafState::Created(worker) => {
                let ctx = Context::new();
                let handle = tokio::spawn(run(self.name, worker, ctx.clone()));
                self.state = LeafState::Running { ctx, handle };
                info!(actor = self.name, "Actor started");
                Ok(())
            }
            running @ LeafState::Running { .. } => {
                self.state = running;
                Err(ActorError::AlreadyStarted)
            }
            LeafState::Stopped => Err(ActorError::AlreadyStopped),
        }
    }

    fn cancel(&mut self) {
        if let LeafState::Running { ctx, .. } = &self.state {
            ctx.cancel();
        } else if matches!(self.state, LeafState::Created(_)) {
            debug!(actor = self.name, "Stopped before start");
            self.state = LeafState::Stopped;
        }
    }

    async fn join(&mut self) -> Result<(), ActorError> {
        let LeafState::Running { handle, .. } =
            std::mem::replace(&mut self.state, LeafState::Stopped)
        else {
            return Ok(());
        };

        match handle.await {
            Ok(()) => {
                info!(actor = self.name, "Actor stopped");
                Ok(())
            }
            Err(e) => {
                warn!(actor = self.name, error = %e, "Actor task failed");
                Err(ActorError::Panicked {
                    actor: self.name,
                    reason: e.to_string(),
                })
            }
        }
    }
}

impl Drop for Leaf {
    // A dropped running actor must not leave its task waiting forever.
    fn drop(&mut self) {
        if let LeafState::Running { ctx, .. } = &self.state {
            ctx.cancel();
        }
    }
}

async fn run(name: &'static str, mut worker: Box<dyn Worker>, ctx: Context) {
    worker.on_start(&ctx).await;
    let mut steps: u64 = 0;
    while worker.do_work(&ctx).await == WorkerStatus::Continue {
        steps += 1;
    }
    ctx.cancel();
    worker.on_stop().await;
    debug!(actor = name, steps, "Worker finished");
}

/// Composes `actors` into one actor whose `start`/`stop` fan out to all of them.
pub fn combine(actors: impl IntoIterator<Item = Actor>) -> Actor {
    Actor {
        kind: ActorKind::Combined(actors.into_iter().collect()),
    }
}

/// An actor that does nothing until stopped, then runs `on_stop` exactly once.
pub fn idle<F>(on_stop: F) -> Actor
where
    F: FnOnce() + Send + 'static,
{
    Actor::new(IdleWorker {
        on_stop: Some(Box::new(on_stop)),
    })
}

struct IdleWorker {
    on_stop: Option<Box<dyn FnOnce() + Send>>,
}

#[async_trait]
impl Worker for IdleWorker {
    async fn do_work(&mut self, ctx: &Context) -> WorkerStatus {
        ctx.done().await;
        WorkerStatus::End
    }

    async fn on_stop(&mut self) {
        if let Some(hook) = self.on_stop.take() {
            hook();
        }
    }
}

// "crate::mailbox::MailboxWorker<u32>" -> "MailboxWorker"
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct Counters {
        started: AtomicUsize,
        steps: AtomicUsize,
        stopped: AtomicUsize,
    }

    struct CountingWorker {
        counters: Arc<Counters>,
    }

    #[async_trait]
    impl Worker for CountingWorker {
        async fn on_start(&mut self, _ctx: &Context) {
            self.counters.started.fetch_add(1, Ordering::SeqCst);
        }

        async fn do_work(&mut self, ctx: &Context) -> WorkerStatus {
            self.counters.steps.fetch_add(1, Ordering::SeqCst);
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(1)) => WorkerStatus::Continue,
                _ = ctx.done() => WorkerStatus::End,
            }
        }

        async fn on_stop(&mut self) {
            self.counters.stopped.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<CountingWorker>(), "CountingWorker");
        assert_eq!(short_type_name::<Vec<String>>(), "Vec");
    }

    #[tokio::test]
    async fn test_start_then_stop_runs_hooks_once() {
        let counters = Arc::new(Counters::default());
        let mut actor = Actor::new(CountingWorker {
            counters: counters.clone(),
        });
        assert!(!actor.is_running());

        actor.start().unwrap();
        assert!(actor.is_running());
        tokio::time::sleep(Duration::from_millis(10)).await;

        actor.stop().await.unwrap();
        assert!(!actor.is_running());
        assert_eq!(counters.started.load(Ordering::SeqCst), 1);
        assert_eq!(counters.stopped.load(Ordering::SeqCst), 1);
        assert!(counters.steps.load(Ordering::SeqCst) >= 1);

        // No step survives stop.
        let steps = counters.steps.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(counters.steps.load(Ordering::SeqCst), steps);
    }

    #[tokio::test]
    async fn test_start_twice_is_reported() {
        let mut actor = idle(|| {});
        actor.start().unwrap();
        assert_eq!(actor.start(), Err(ActorError::AlreadyStarted));
        actor.stop().await.unwrap();
        assert_eq!(actor.start(), Err(ActorError::AlreadyStopped));
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let mut actor = idle(|| {});
        actor.start().unwrap();
        actor.stop().await.unwrap();
        actor.stop().await.unwrap();
        assert!(!actor.is_running());
    }

    #[tokio::test]
    async fn test_stop_before_start_never_runs_worker() {
        let counters = Arc::new(Counters::default());
        let mut actor = Actor::new(CountingWorker {
            counters: counters.clone(),
        });

        actor.stop().await.unwrap();
        assert_eq!(actor.start(), Err(ActorError::AlreadyStopped));
        assert_eq!(counters.started.load(Ordering::SeqCst), 0);
        assert_eq!(counters.stopped.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_worker_end_finishes_task() {
        let mut remaining = 3;
        let mut actor = Actor::new(worker::from_fn(move |_ctx| {
            remaining -= 1;
            let status = if remaining == 0 {
                WorkerStatus::End
            } else {
                WorkerStatus::Continue
            };
            async move { status }
        }));

        actor.start().unwrap();
        // The task ends on its own; stop just joins it.
        actor.stop().await.unwrap();
        assert!(!actor.is_running());
    }

    #[tokio::test]
    async fn test_is_running_false_once_worker_ends_on_its_own() {
        let mut actor = Actor::new(worker::from_fn(|_ctx| async { WorkerStatus::End }));
        actor.start().unwrap();

        tokio::time::timeout(Duration::from_secs(2), async {
            while actor.is_running() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("actor still reported running after its worker ended");

        actor.stop().await.unwrap();
        assert!(!actor.is_running());
    }

    #[tokio::test]
    async fn test_panicking_worker_is_reported() {
        let mut actor = Actor::new(worker::from_fn(|_ctx| async move {
            let explode = true;
            if explode {
                panic!("worker blew up");
            }
            WorkerStatus::Continue
        }));
        actor.start().unwrap();

        let err = actor.stop().await.unwrap_err();
        assert!(matches!(err, ActorError::Panicked { actor: "WorkerFn", .. }));
    }

    #[tokio::test]
    async fn test_nested_combine_stops_every_leaf() {
        let counters = Arc::new(Counters::default());
        let leaf = |counters: &Arc<Counters>| {
            Actor::new(CountingWorker {
                counters: counters.clone(),
            })
        };

        let inner = combine(vec![leaf(&counters), leaf(&counters)]);
        let mut outer = combine(vec![inner, leaf(&counters)]);

        outer.start().unwrap();
        assert!(outer.is_running());
        outer.stop().await.unwrap();

        assert!(!outer.is_running());
        assert_eq!(counters.started.load(Ordering::SeqCst), 3);
        assert_eq!(counters.stopped.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_combine_reports_start_error_but_starts_others() {
        let mut already = idle(|| {});
        already.start().unwrap();

        let hits = Arc::new(AtomicUsize::new(0));
        let hook_hits = hits.clone();
        let fresh = idle(move || {
            hook_hits.fetch_add(1, Ordering::SeqCst);
        });

        let mut group = combine(vec![already, fresh]);
        assert_eq!(group.start(), Err(ActorError::AlreadyStarted));
        group.stop().await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
