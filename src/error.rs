//! # Runtime Errors
//!
//! Error types shared by actors and mailboxes. Cancellation is never an error:
//! a worker observing its context's cancellation simply reports
//! [`WorkerStatus::End`](crate::WorkerStatus::End).

/// Errors reported by the actor lifecycle.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ActorError {
    /// `start` was called on an actor that is already running.
    #[error("Actor already started")]
    AlreadyStarted,

    /// `start` was called on an actor that has been stopped.
    #[error("Actor already stopped")]
    AlreadyStopped,

    /// The worker task panicked (or was aborted) before it could finish.
    #[error("Actor {actor} panicked: {reason}")]
    Panicked { actor: &'static str, reason: String },
}

/// Errors reported by mailbox endpoints.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum MailboxError {
    /// The mailbox has been stopped; it no longer accepts values.
    #[error("Mailbox closed")]
    Closed,
}
