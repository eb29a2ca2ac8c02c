//! # Mailbox
//!
//! A [`Mailbox`] is an actor exposing a send endpoint and a receive endpoint for
//! FIFO message passing. Two strategies are available, selected by
//! [`MailboxOptions::using_chan`]:
//!
//! 1. **Queue-backed (default, unbounded)**: an inbound and an outbound Tokio
//!    channel, each with a single slot, mediated by one internal worker that
//!    owns a [`Queue`]. Producers never wait on buffer capacity; buffering is
//!    bounded only by memory.
//! 2. **Simple channel**: a single bounded `mpsc` channel of
//!    [`MailboxOptions::capacity`] slots serves both endpoints. Senders wait once
//!    it is full. The backing actor is an [`idle`](crate::actor::idle) actor that
//!    closes the mailbox when stopped.
//!
//! ## The Mailbox Worker
//!
//! Each step of the queue-backed worker races the events it can make progress
//! on:
//!
//! | Queue     | Branches                                                    |
//! |-----------|-------------------------------------------------------------|
//! | empty     | value arrives → push · cancelled → End                      |
//! | non-empty | outbound slot free → pop front into it · value arrives → push · cancelled → End |
//!
//! Because a new value can always be accepted while the worker waits for a
//! consumer, a send is serviced regardless of whether anybody is reading. The
//! queue is touched only by this worker, so it needs no lock.
//!
//! ## Shutdown
//!
//! Stopping the mailbox closes both endpoints: pending and future
//! [`MailboxSender::send`] calls fail with [`MailboxError::Closed`], and
//! [`MailboxReceiver::recv`] hands out whatever was already delivered to the
//! receive side, then returns `None`. Values still queued inside the worker are
//! dropped.
//!
//! ## Example
//!
//! ```rust
//! use actor_mailbox::{Mailbox, MailboxOptions};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let mut mailbox = Mailbox::new(MailboxOptions::default());
//! mailbox.start().unwrap();
//!
//! let sender = mailbox.sender();
//! for i in 0..1000 {
//!     sender.send(i).await.unwrap(); // nobody is reading yet
//! }
//!
//! let receiver = mailbox.receiver();
//! for i in 0..1000 {
//!     assert_eq!(receiver.recv().await, Some(i));
//! }
//!
//! mailbox.stop().await.unwrap();
//! assert_eq!(receiver.recv().await, None);
//! # }
//! ```

use crate::actor::{self, Actor};
use crate::context::Context;
use crate::error::{ActorError, MailboxError};
use crate::options::MailboxOptions;
use crate::queue::Queue;
use crate::worker::{Worker, WorkerStatus};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// An actor owning a FIFO channel with a send and a receive endpoint.
pub struct Mailbox<T> {
    actor: Actor,
    sender: MailboxSender<T>,
    receiver: MailboxReceiver<T>,
    closed: CancellationToken,
}

impl<T: Send + 'static> Mailbox<T> {
    /// Creates a mailbox in the Created state. Values can be sent only after
    /// [`Mailbox::start`] (or after starting the actor it was merged into).
    pub fn new(options: MailboxOptions) -> Self {
        let closed = CancellationToken::new();

        if options.using_chan {
            let (tx, rx) = mpsc::channel(options.capacity.max(1));
            let on_stop = closed.clone();
            return Self {
                actor: actor::idle(move || on_stop.cancel()),
                sender: MailboxSender::new(tx, closed.clone()),
                receiver: MailboxReceiver::new(rx, closed.clone()),
                closed,
            };
        }

        let (inbound_tx, inbound_rx) = mpsc::channel(1);
        let (outbound_tx, outbound_rx) = mpsc::channel(1);
        let worker = MailboxWorker {
            inbound: inbound_rx,
            inbound_open: true,
            outbound: outbound_tx,
            queue: Queue::new(options.capacity, options.min_capacity),
            closed: closed.clone(),
        };

        Self {
            actor: Actor::new(worker),
            sender: MailboxSender::new(inbound_tx, closed.clone()),
            receiver: MailboxReceiver::new(outbound_rx, closed.clone()),
            closed,
        }
    }
}

impl<T> Mailbox<T> {
    /// A handle for producers.
    pub fn sender(&self) -> MailboxSender<T> {
        self.sender.clone()
    }

    /// A handle for consumers.
    pub fn receiver(&self) -> MailboxReceiver<T> {
        self.receiver.clone()
    }

    /// Starts the backing actor.
    pub fn start(&mut self) -> Result<(), ActorError> {
        self.actor.start()
    }

    /// Stops the backing actor and closes both endpoints.
    pub async fn stop(&mut self) -> Result<(), ActorError> {
        let result = self.actor.stop().await;
        // Covers a mailbox stopped before it was ever started.
        self.closed.cancel();
        result
    }

    /// `true` while the backing actor's task is running.
    pub fn is_running(&self) -> bool {
        self.actor.is_running()
    }

    /// Detaches the backing actor so it can be composed with others.
    ///
    /// Take the endpoints you need first: the mailbox's own handles are
    /// dropped.
    pub fn into_actor(self) -> Actor {
        self.actor
    }
}

impl<T> From<Mailbox<T>> for Actor {
    fn from(mailbox: Mailbox<T>) -> Self {
        mailbox.into_actor()
    }
}

impl<T> std::fmt::Debug for Mailbox<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mailbox")
            .field("actor", &self.actor)
            .field("closed", &self.closed.is_cancelled())
            .finish()
    }
}

/// Write-only endpoint of a [`Mailbox`]. Cheap to clone.
pub struct MailboxSender<T> {
    tx: mpsc::Sender<T>,
    closed: CancellationToken,
}

impl<T> MailboxSender<T> {
    fn new(tx: mpsc::Sender<T>, closed: CancellationToken) -> Self {
        Self { tx, closed }
    }

    /// Sends a value.
    ///
    /// With a queue-backed mailbox this only waits for the mailbox worker to
    /// take the value, never for a consumer.
    pub async fn send(&self, value: T) -> Result<(), MailboxError> {
        if self.closed.is_cancelled() {
            return Err(MailboxError::Closed);
        }
        tokio::select! {
            biased;
            _ = self.closed.cancelled() => Err(MailboxError::Closed),
            sent = self.tx.send(value) => sent.map_err(|_| MailboxError::Closed),
        }
    }

    /// `true` once the mailbox no longer accepts values, either because it
    /// was stopped or because its worker is gone.
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled() || self.tx.is_closed()
    }
}

impl<T> Clone for MailboxSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            closed: self.closed.clone(),
        }
    }
}

impl<T> std::fmt::Debug for MailboxSender<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailboxSender")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Read-only endpoint of a [`Mailbox`].
///
/// Clones share the same stream: each value is received by exactly one of
/// them, in FIFO order.
pub struct MailboxReceiver<T> {
    rx: Arc<Mutex<mpsc::Receiver<T>>>,
    closed: CancellationToken,
}

impl<T> MailboxReceiver<T> {
    fn new(rx: mpsc::Receiver<T>, closed: CancellationToken) -> Self {
        Self {
            rx: Arc::new(Mutex::new(rx)),
            closed,
        }
    }

    /// Receives the next value, or `None` once the mailbox is closed and the
    /// values already handed to the receive side are drained.
    pub async fn recv(&self) -> Option<T> {
        let mut rx = self.rx.lock().await;
        tokio::select! {
            biased;
            _ = self.closed.cancelled() => {
                rx.close();
                rx.try_recv().ok()
            }
            value = rx.recv() => value,
        }
    }

    /// `true` once the mailbox has closed, on stop or after its last sender
    /// went away and the queue drained. Values already handed to the receive
    /// side may still be drained.
    pub fn is_closed(&self) -> bool {
        self.closed.is_cancelled()
    }
}

impl<T> Clone for MailboxReceiver<T> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
            closed: self.closed.clone(),
        }
    }
}

impl<T> std::fmt::Debug for MailboxReceiver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailboxReceiver")
            .field("closed", &self.is_closed())
            .finish()
    }
}

struct MailboxWorker<T> {
    inbound: mpsc::Receiver<T>,
    inbound_open: bool,
    outbound: mpsc::Sender<T>,
    queue: Queue<T>,
    closed: CancellationToken,
}

impl<T> MailboxWorker<T> {
    fn accept(&mut self, value: Option<T>) -> WorkerStatus {
        match value {
            Some(value) => {
                self.queue.push_back(value);
                debug!(
                    queued = self.queue.len(),
                    capacity = self.queue.capacity(),
                    "Accepted"
                );
            }
            None => {
                debug!(queued = self.queue.len(), "All senders dropped");
                self.inbound_open = false;
            }
        }
        WorkerStatus::Continue
    }
}

#[async_trait]
impl<T: Send + 'static> Worker for MailboxWorker<T> {
    async fn do_work(&mut self, ctx: &Context) -> WorkerStatus {
        if self.queue.is_empty() {
            if !self.inbound_open {
                return WorkerStatus::End;
            }
            let received = tokio::select! {
                value = self.inbound.recv() => value,
                _ = ctx.done() => return WorkerStatus::End,
            };
            return self.accept(received);
        }

        let received = tokio::select! {
            permit = self.outbound.reserve() => {
                let Ok(permit) = permit else {
                    debug!(queued = self.queue.len(), "All receivers dropped");
                    return WorkerStatus::End;
                };
                if let Some(value) = self.queue.pop_front() {
                    permit.send(value);
                }
                debug!(queued = self.queue.len(), "Delivered");
                return WorkerStatus::Continue;
            }
            value = self.inbound.recv(), if self.inbound_open => value,
            _ = ctx.done() => return WorkerStatus::End,
        };
        self.accept(received)
    }

    async fn on_stop(&mut self) {
        self.closed.cancel();
        self.inbound.close();
        debug!(dropped = self.queue.len(), "Mailbox closed");
    }
}

/// Creates `count` independent mailboxes sharing the same options.
pub fn new_mailboxes<T: Send + 'static>(count: usize, options: MailboxOptions) -> Vec<Mailbox<T>> {
    (0..count).map(|_| Mailbox::new(options)).collect()
}

/// Combines the backing actors of `mailboxes` into one actor.
pub fn from_mailboxes<T>(mailboxes: impl IntoIterator<Item = Mailbox<T>>) -> Actor {
    actor::combine(mailboxes.into_iter().map(Mailbox::into_actor))
}

/// Spawns a task forwarding every value from `receiver` to each of `senders`.
///
/// The task runs until `receiver` is closed and is **not** tied to any actor's
/// lifecycle: make sure the input mailbox is eventually stopped, or the task
/// leaks. Prefer [`fan_out_actor`] when the forwarding should stop with the
/// rest of a group. Senders that turn out to be closed are skipped from then
/// on.
pub fn fan_out<T>(receiver: MailboxReceiver<T>, senders: Vec<MailboxSender<T>>) -> JoinHandle<()>
where
    T: Clone + Send + 'static,
{
    tokio::spawn(async move {
        let mut senders = senders;
        // Never cancelled: this task ends only when its input closes.
        let ctx = Context::new();
        while let Some(value) = receiver.recv().await {
            forward(&mut senders, value, &ctx).await;
        }
        debug!("Fan-out input closed");
    })
}

/// Same forwarding as [`fan_out`], driven by an actor so it can be stopped.
pub fn fan_out_actor<T>(receiver: MailboxReceiver<T>, senders: Vec<MailboxSender<T>>) -> Actor
where
    T: Clone + Send + 'static,
{
    Actor::new(FanOutWorker { receiver, senders })
}

struct FanOutWorker<T> {
    receiver: MailboxReceiver<T>,
    senders: Vec<MailboxSender<T>>,
}

#[async_trait]
impl<T: Clone + Send + 'static> Worker for FanOutWorker<T> {
    async fn do_work(&mut self, ctx: &Context) -> WorkerStatus {
        tokio::select! {
            value = self.receiver.recv() => match value {
                Some(value) => forward(&mut self.senders, value, ctx).await,
                None => WorkerStatus::End,
            },
            _ = ctx.done() => WorkerStatus::End,
        }
    }
}

// A full or idle target must not keep `stop` waiting, so every send races
// the context.
async fn forward<T: Clone>(
    senders: &mut Vec<MailboxSender<T>>,
    value: T,
    ctx: &Context,
) -> WorkerStatus {
    for sender in senders.iter() {
        tokio::select! {
            sent = sender.send(value.clone()) => {
                if sent.is_err() {
                    warn!("Fan-out target closed, skipping it");
                }
            }
            _ = ctx.done() => return WorkerStatus::End,
        }
    }
    senders.retain(|sender| !sender.is_closed());
    WorkerStatus::Continue
}
