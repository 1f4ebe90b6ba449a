// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Channels with an explicit terminal state.
//!
//! The queue itself is an [`async_channel`] channel. This module adds what the
//! operators need on top of it:
//!
//! - a terminal state recorded exactly once ([`Termination`]): normal
//!   completion, failure with an error, or cancellation with a cause;
//! - a consumer-to-producer cancellation signal ([`Sender::cancelled`]);
//! - a conflating capacity policy that keeps only the newest item.
//!
//! # Example
//!
//! ```
//! use sluice_core::{channel, Capacity, SluiceError};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (tx, rx) = channel::<i32>(Capacity::Unbounded);
//!
//! tx.send(1).await.unwrap();
//! tx.close_with_error(SluiceError::stream_error("boom"));
//!
//! // Buffered items are delivered before the failure is raised
//! assert_eq!(rx.recv().await.unwrap(), Some(1));
//! assert!(rx.recv().await.is_err());
//! # }
//! ```

use crate::{CancellationToken, Result, SluiceError, StreamItem};
use core::fmt;
use core::pin::Pin;
use core::sync::atomic::{AtomicUsize, Ordering};
use core::task::{Context, Poll};
use futures::Stream;
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};

/// Buffering policy of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capacity {
    /// Never suspends the sender.
    Unbounded,
    /// Suspends the sender while `n` items are waiting. `n` must be at least 1.
    Bounded(usize),
    /// Keeps only the most recent item; the sender never suspends and
    /// intermediate items are dropped when the consumer is slower.
    Conflated,
}

impl Capacity {
    /// Buffer size used by [`Capacity::default`].
    pub const DEFAULT_BUFFER: usize = 64;
}

impl Default for Capacity {
    fn default() -> Self {
        Self::Bounded(Self::DEFAULT_BUFFER)
    }
}

/// How a channel ended.
#[derive(Debug, Clone)]
pub enum Termination {
    /// The producer closed the channel normally.
    Completed,
    /// The producer closed the channel with an error.
    Failed(SluiceError),
    /// The consumer cancelled the channel.
    Cancelled(SluiceError),
}

impl Termination {
    /// The error carried by a failed or cancelled channel.
    pub fn error(&self) -> Option<&SluiceError> {
        match self {
            Self::Completed => None,
            Self::Failed(e) | Self::Cancelled(e) => Some(e),
        }
    }

    /// Returns `true` for [`Termination::Completed`].
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

#[derive(Debug)]
struct Shared {
    termination: Mutex<Option<Termination>>,
    token: CancellationToken,
    consumers: AtomicUsize,
}

impl Shared {
    fn new() -> Self {
        Self {
            termination: Mutex::new(None),
            token: CancellationToken::new(),
            consumers: AtomicUsize::new(1),
        }
    }

    /// Records the terminal state. Returns `false` if one was already recorded.
    fn terminate(&self, termination: Termination) -> bool {
        let mut guard = self.termination.lock();
        if guard.is_some() {
            return false;
        }
        *guard = Some(termination);
        true
    }

    fn termination(&self) -> Option<Termination> {
        self.termination.lock().clone()
    }

    fn send_error(&self) -> Option<SluiceError> {
        self.termination().map(|termination| match termination {
            Termination::Cancelled(cause) => cause,
            Termination::Completed | Termination::Failed(_) => {
                SluiceError::channel_closed("send on a closed channel")
            }
        })
    }
}

/// Completion state shared by every [`Receiver::empty`] stream.
///
/// Initialised once, never mutated afterwards: `terminate` on a completed
/// state is a no-op, so cancelling an empty stream cannot change it.
fn completed_state() -> Arc<Shared> {
    static COMPLETED: OnceLock<Arc<Shared>> = OnceLock::new();
    Arc::clone(COMPLETED.get_or_init(|| {
        let shared = Shared::new();
        shared.terminate(Termination::Completed);
        Arc::new(shared)
    }))
}

fn cancel_shared<T>(
    shared: &Shared,
    queue: Option<&async_channel::Receiver<T>>,
    cause: Option<SluiceError>,
) -> bool {
    let cause = cause.unwrap_or_else(|| SluiceError::cancelled("stream cancelled by consumer"));
    if !shared.terminate(Termination::Cancelled(cause)) {
        return false;
    }

    if let Some(queue) = queue {
        queue.close();
        while queue.try_recv().is_ok() {}
    }
    shared.token.cancel();
    debug!("channel cancelled");
    true
}

/// Creates a channel with the given capacity policy.
///
/// # Panics
///
/// Panics if `capacity` is `Capacity::Bounded(0)`.
pub fn channel<T>(capacity: Capacity) -> (Sender<T>, Receiver<T>) {
    let (tx, rx) = match capacity {
        Capacity::Unbounded => async_channel::unbounded(),
        Capacity::Bounded(n) => {
            assert!(n >= 1, "channel: bounded capacity must be at least 1");
            async_channel::bounded(n)
        }
        Capacity::Conflated => async_channel::bounded(1),
    };
    let shared = Arc::new(Shared::new());

    (
        Sender {
            queue: tx,
            shared: Arc::clone(&shared),
            conflated: capacity == Capacity::Conflated,
        },
        Receiver {
            queue: Some(Box::pin(rx)),
            shared,
        },
    )
}

/// Producing half of a channel. Cheap to clone; all clones feed the same queue.
///
/// Dropping every sender without closing completes the channel normally.
pub struct Sender<T> {
    queue: async_channel::Sender<T>,
    shared: Arc<Shared>,
    conflated: bool,
}

impl<T> Sender<T> {
    /// Sends a value, suspending while a bounded channel is full.
    ///
    /// # Errors
    ///
    /// Fails immediately if the channel was closed or cancelled. On a cancelled
    /// channel the error is the cancellation cause.
    pub async fn send(&self, value: T) -> Result<()> {
        if let Some(err) = self.shared.send_error() {
            return Err(err);
        }

        let sent = if self.conflated {
            self.queue.force_send(value).map(|_| ())
        } else {
            self.queue.send(value).await
        };

        sent.map_err(|_| {
            self.shared
                .send_error()
                .unwrap_or_else(|| SluiceError::cancelled("receiver dropped"))
        })
    }

    /// Sends without suspending.
    ///
    /// Returns `Ok(false)` when a bounded channel is full and the value was
    /// not queued.
    ///
    /// # Errors
    ///
    /// Fails if the channel was closed or cancelled.
    pub fn try_send(&self, value: T) -> Result<bool> {
        if let Some(err) = self.shared.send_error() {
            return Err(err);
        }

        let sent = if self.conflated {
            self.queue.force_send(value).map(|_| ())
        } else {
            match self.queue.try_send(value) {
                Ok(()) => Ok(()),
                Err(async_channel::TrySendError::Full(_)) => return Ok(false),
                Err(async_channel::TrySendError::Closed(value)) => {
                    Err(async_channel::SendError(value))
                }
            }
        };

        sent.map(|()| true).map_err(|_| {
            self.shared
                .send_error()
                .unwrap_or_else(|| SluiceError::cancelled("receiver dropped"))
        })
    }

    /// Closes the channel normally. Buffered items are still delivered.
    ///
    /// Returns `false` if the channel had already terminated.
    pub fn close(&self) -> bool {
        self.close_with(Termination::Completed)
    }

    /// Closes the channel with an error, raised to the consumer once the
    /// buffered items are drained.
    ///
    /// Returns `false` if the channel had already terminated.
    pub fn close_with_error(&self, error: SluiceError) -> bool {
        self.close_with(Termination::Failed(error))
    }

    fn close_with(&self, termination: Termination) -> bool {
        let first = self.shared.terminate(termination);
        self.queue.close();
        first
    }

    /// Returns `true` once the channel has been closed or cancelled.
    pub fn is_closed(&self) -> bool {
        self.queue.is_closed() || self.shared.termination().is_some()
    }

    /// Returns `true` if the consumer cancelled the channel.
    pub fn is_cancelled(&self) -> bool {
        self.shared.token.is_cancelled()
    }

    /// Token fired when the consumer cancels the channel.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.shared.token.clone()
    }

    /// Resolves when the consumer cancels the channel.
    pub async fn cancelled(&self) {
        self.shared.token.cancelled().await;
    }

    /// The terminal state, if the channel has ended.
    pub fn termination(&self) -> Option<Termination> {
        self.shared.termination()
    }

    /// Returns `true` if both senders feed the same channel.
    pub fn same_channel(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
            shared: Arc::clone(&self.shared),
            conflated: self.conflated,
        }
    }
}

impl<T> fmt::Debug for Sender<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sender")
            .field("termination", &self.shared.termination())
            .field("conflated", &self.conflated)
            .finish()
    }
}

/// Consuming half of a channel: the stream type every operator reads from
/// and produces.
///
/// Dropping the last consumer handle cancels the channel, which tells the
/// producing stage to stop.
pub struct Receiver<T> {
    // `None` only for the shared empty stream.
    queue: Option<Pin<Box<async_channel::Receiver<T>>>>,
    shared: Arc<Shared>,
}

impl<T> Receiver<T> {
    /// A stream that has already completed without items.
    ///
    /// All empty streams share one immutable, lazily created completion state.
    pub fn empty() -> Self {
        Self {
            queue: None,
            shared: completed_state(),
        }
    }

    /// Receives the next item.
    ///
    /// Returns `Ok(None)` once the channel completed normally.
    ///
    /// # Errors
    ///
    /// Returns the failure (or cancellation cause) of the channel after all
    /// buffered items have been received. Every later call returns it again.
    pub async fn recv(&self) -> Result<Option<T>> {
        let Some(queue) = self.queue.as_ref() else {
            return Ok(None);
        };

        match queue.recv().await {
            Ok(value) => Ok(Some(value)),
            Err(_) => self.closed_outcome(),
        }
    }

    fn closed_outcome(&self) -> Result<Option<T>> {
        // Every sender dropped without closing: the channel completed.
        self.shared.terminate(Termination::Completed);
        match self.shared.termination() {
            None | Some(Termination::Completed) => Ok(None),
            Some(Termination::Failed(e) | Termination::Cancelled(e)) => Err(e),
        }
    }

    /// Cancels the channel: buffered items are discarded, the producer's
    /// cancellation token fires and its next send fails with `cause`.
    ///
    /// Idempotent; a channel that already terminated ignores the call.
    /// Returns `true` if this call cancelled the channel.
    pub fn cancel(&self, cause: Option<SluiceError>) -> bool {
        cancel_shared(&self.shared, self.queue.as_deref(), cause)
    }

    /// The terminal state, or `None` while the channel is still open.
    pub fn termination(&self) -> Option<Termination> {
        self.shared.termination().or_else(|| {
            self.queue
                .as_ref()
                .filter(|queue| queue.is_closed())
                .map(|_| Termination::Completed)
        })
    }

    /// Returns `true` once the channel completed, failed or was cancelled.
    pub fn is_terminated(&self) -> bool {
        self.termination().is_some()
    }

    /// Returns `true` if the channel was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self.shared.termination(), Some(Termination::Cancelled(_)))
    }

    /// A handle that can cancel this channel after the receiver itself has
    /// been moved elsewhere.
    pub fn cancel_handle(&self) -> CancelHandle<T> {
        CancelHandle {
            queue: self.queue.as_ref().map(|queue| (**queue).clone()),
            shared: Arc::clone(&self.shared),
        }
    }

    /// Another consumer competing for the items of this channel.
    ///
    /// Each item is received by exactly one of the handles. Only fan-out
    /// operators should need this.
    pub fn split_work(&self) -> Self {
        if self.queue.is_some() {
            self.shared.consumers.fetch_add(1, Ordering::AcqRel);
        }
        Self {
            queue: self.queue.as_ref().map(|queue| Box::pin((**queue).clone())),
            shared: Arc::clone(&self.shared),
        }
    }

    /// Receives every remaining item.
    ///
    /// # Errors
    ///
    /// Returns the channel failure, discarding the items received so far.
    pub async fn to_vec(self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.recv().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// A `futures::Stream` view of this channel.
    pub fn into_stream(self) -> ReceiverStream<T> {
        ReceiverStream {
            receiver: self,
            done: false,
        }
    }
}

impl<T> Drop for Receiver<T> {
    fn drop(&mut self) {
        if self.queue.is_none() {
            return;
        }
        if self.shared.consumers.fetch_sub(1, Ordering::AcqRel) == 1 {
            cancel_shared(
                &self.shared,
                self.queue.as_deref(),
                Some(SluiceError::cancelled("receiver dropped")),
            );
        }
    }
}

impl<T> fmt::Debug for Receiver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver")
            .field("termination", &self.termination())
            .finish()
    }
}

/// Cancels a channel without owning its [`Receiver`].
///
/// Obtained from [`Receiver::cancel_handle`]. Dropping the handle does nothing.
pub struct CancelHandle<T> {
    queue: Option<async_channel::Receiver<T>>,
    shared: Arc<Shared>,
}

impl<T> CancelHandle<T> {
    /// Same as [`Receiver::cancel`].
    pub fn cancel(&self, cause: Option<SluiceError>) -> bool {
        cancel_shared(&self.shared, self.queue.as_ref(), cause)
    }

    /// Returns `true` if the channel completed normally.
    pub fn is_completed(&self) -> bool {
        matches!(self.shared.termination(), Some(Termination::Completed))
    }
}

impl<T> fmt::Debug for CancelHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelHandle")
            .field("termination", &self.shared.termination())
            .finish()
    }
}

/// `futures::Stream` view of a [`Receiver`], created by [`Receiver::into_stream`].
///
/// A failed or cancelled channel yields one final [`StreamItem::Error`].
#[derive(Debug)]
pub struct ReceiverStream<T> {
    receiver: Receiver<T>,
    done: bool,
}

impl<T> ReceiverStream<T> {
    /// Cancels the underlying channel.
    pub fn cancel(&self, cause: Option<SluiceError>) -> bool {
        self.receiver.cancel(cause)
    }
}

impl<T> Stream for ReceiverStream<T> {
    type Item = StreamItem<T>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }

        let Some(queue) = this.receiver.queue.as_mut() else {
            this.done = true;
            return Poll::Ready(None);
        };

        match queue.as_mut().poll_next(cx) {
            Poll::Ready(Some(value)) => Poll::Ready(Some(StreamItem::Value(value))),
            Poll::Ready(None) => {
                this.done = true;
                match this.receiver.closed_outcome() {
                    Ok(_) => Poll::Ready(None),
                    Err(e) => Poll::Ready(Some(StreamItem::Error(e))),
                }
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
