//! # Actor Mailbox
//!
//! A minimal actor runtime on top of Tokio: independently scheduled units of
//! work ("actors") driven by user-supplied [`Worker`]s, composed and stopped
//! uniformly, talking through unbounded, non-blocking FIFO [`Mailbox`]es.
//!
//! ## Core Abstractions
//!
//! - [`Worker`] - one step of repeatable work returning [`WorkerStatus`].
//! - [`Context`] - the one-shot cancellation signal handed to every step.
//! - [`Actor`] - start/stop lifecycle around a worker's task, or around a group
//!   of actors ([`actor::combine`]), or around a teardown hook ([`actor::idle`]).
//! - [`Mailbox`] - an actor exposing a [`MailboxSender`] and a
//!   [`MailboxReceiver`]; sends never wait for a consumer.
//! - [`Queue`] - the growable ring buffer owned by a mailbox's worker.
//!
//! ## Concurrency Model
//!
//! - Each started leaf actor runs in its own Tokio task; combined actors add
//!   no tasks.
//! - Workers block only inside `tokio::select!` waits that include
//!   [`Context::done`]. Cancellation is cooperative.
//! - `stop` has join semantics: when it returns, the task is gone.
//! - A mailbox's queue is owned by exactly one task; all other interaction goes
//!   through the channel endpoints, so nothing is locked around it.
//!
//! ## Pipeline Example
//!
//! A producer, a consumer and the mailbox between them, started and stopped as
//! one unit:
//!
//! ```rust
//! use actor_mailbox::{actor, worker, Actor, Mailbox, MailboxOptions, WorkerStatus};
//! use std::sync::atomic::{AtomicU64, Ordering};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mailbox = Mailbox::new(MailboxOptions::default());
//! let (tx, rx) = (mailbox.sender(), mailbox.receiver());
//!
//! let mut next = 0u64;
//! let producer = Actor::new(worker::from_fn(move |ctx| {
//!     let tx = tx.clone();
//!     next += 1;
//!     let value = next;
//!     async move {
//!         tokio::select! {
//!             sent = tx.send(value) => match sent {
//!                 Ok(()) => WorkerStatus::Continue,
//!                 Err(_) => WorkerStatus::End,
//!             },
//!             _ = ctx.done() => WorkerStatus::End,
//!         }
//!     }
//! }));
//!
//! let total = Arc::new(AtomicU64::new(0));
//! let sum = total.clone();
//! let consumer = Actor::new(worker::from_fn(move |ctx| {
//!     let rx = rx.clone();
//!     let sum = sum.clone();
//!     async move {
//!         tokio::select! {
//!             value = rx.recv() => match value {
//!                 Some(value) => {
//!                     sum.fetch_add(value, Ordering::SeqCst);
//!                     WorkerStatus::Continue
//!                 }
//!                 None => WorkerStatus::End,
//!             },
//!             _ = ctx.done() => WorkerStatus::End,
//!         }
//!     }
//! }));
//!
//! let mut pipeline = actor::combine(vec![mailbox.into_actor(), producer, consumer]);
//! pipeline.start().unwrap();
//! tokio::time::sleep(std::time::Duration::from_millis(20)).await;
//! pipeline.stop().await.unwrap();
//!
//! assert!(!pipeline.is_running());
//! # }
//! ```
//!
//! ## Observability
//!
//! Lifecycle and mailbox events are emitted with `tracing`; see [`tracing`]
//! and [`tracing::setup_tracing`].

pub mod actor;
pub mod context;
pub mod error;
pub mod mailbox;
pub mod options;
pub mod queue;
pub mod tracing;
pub mod worker;

// Re-export core types for convenience
pub use actor::{combine, idle, Actor};
pub use context::Context;
pub use error::{ActorError, MailboxError};
pub use mailbox::{
    fan_out, fan_out_actor, from_mailboxes, new_mailboxes, Mailbox, MailboxReceiver,
    MailboxSender,
};
pub use options::MailboxOptions;
pub use queue::Queue;
pub use worker::{Worker, WorkerStatus};
