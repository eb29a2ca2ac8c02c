//! # Observability
//!
//! The runtime reports its lifecycle through the `tracing` crate:
//!
//! - `info`: actor started / stopped, tagged with the worker's type name
//!   (`actor="MailboxWorker"`);
//! - `debug`: values accepted and delivered by a mailbox, with queue length and
//!   capacity, and actors stopped before they were started;
//! - `trace`: queue storage grown or shrunk;
//! - `warn`: a worker task that panicked, a fan-out target that was closed.
//!
//! ```bash
//! RUST_LOG=info cargo test -- --nocapture    # lifecycle only
//! RUST_LOG=actor_mailbox=trace cargo test    # every queue resize
//! ```

/// Initializes a compact `tracing` subscriber filtered by `RUST_LOG`.
///
/// Safe to call more than once: later calls leave the first subscriber in
/// place, so every test can call it.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // the `actor` field already says who is talking
        .compact()
        .try_init();
}
