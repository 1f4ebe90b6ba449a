// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Hot, multi-subscriber subject.
//!
//! A [`Subject`] broadcasts each value to all active subscribers. It is the
//! push-side entry point of a pipeline and the broadcast primitive behind
//! state stores.
//!
//! ## Characteristics
//!
//! - **Hot**: late subscribers only see values sent after subscribing, except
//!   for the latest value when the subject replays it ([`Subject::replaying`]).
//! - **Backpressure**: every subscriber gets its own channel with the
//!   subject's [`Capacity`]; a full bounded subscriber suspends [`Subject::next`].
//! - **Error/close**: terminal events reach all subscribers and end the subject.
//!
//! ## Example
//!
//! ```
//! use sluice_core::{Capacity, Subject};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let subject = Subject::<i32>::new(Capacity::Unbounded);
//! let stream = subject.subscribe().unwrap();
//!
//! subject.next(1).await.unwrap();
//! subject.next(2).await.unwrap();
//! subject.close();
//!
//! assert_eq!(stream.to_vec().await.unwrap(), vec![1, 2]);
//! # }
//! ```

use crate::channel::{channel, Capacity, Receiver, Sender, Termination};
use crate::{Result, SluiceError};
use parking_lot::Mutex;
use std::sync::Arc;

struct SubjectState<T> {
    termination: Option<Termination>,
    latest: Option<T>,
    senders: Vec<Sender<T>>,
}

struct SubjectInner<T> {
    state: Mutex<SubjectState<T>>,
    // Serializes broadcasts so every subscriber sees the same order.
    publish: futures::lock::Mutex<()>,
    capacity: Capacity,
    replay: bool,
}

/// A hot subject that broadcasts values to all current subscribers.
///
/// Cheap to clone; all clones share the same subscribers.
pub struct Subject<T> {
    inner: Arc<SubjectInner<T>>,
}

impl<T: Clone + Send + 'static> Subject<T> {
    /// Creates a subject without replay.
    #[must_use]
    pub fn new(capacity: Capacity) -> Self {
        Self::build(None, capacity, false)
    }

    /// Creates a subject that hands its latest value to every new subscriber,
    /// starting with `initial`.
    #[must_use]
    pub fn replaying(initial: T, capacity: Capacity) -> Self {
        Self::build(Some(initial), capacity, true)
    }

    fn build(latest: Option<T>, capacity: Capacity, replay: bool) -> Self {
        Self {
            inner: Arc::new(SubjectInner {
                state: Mutex::new(SubjectState {
                    termination: None,
                    latest,
                    senders: Vec::new(),
                }),
                publish: futures::lock::Mutex::new(()),
                capacity,
                replay,
            }),
        }
    }

    /// Subscribes to the subject.
    ///
    /// # Errors
    ///
    /// Returns `SluiceError::ChannelClosed` once the subject has terminated.
    pub fn subscribe(&self) -> Result<Receiver<T>> {
        let mut state = self.inner.state.lock();
        if state.termination.is_some() {
            return Err(SluiceError::channel_closed("subject closed"));
        }

        let (tx, rx) = channel(self.inner.capacity);
        if self.inner.replay {
            if let Some(latest) = state.latest.clone() {
                // Fresh channel: always has room for one item.
                tx.try_send(latest)?;
            }
        }
        state.senders.push(tx);
        Ok(rx)
    }

    /// Sends a value to all active subscribers.
    ///
    /// Subscribers that went away are dropped from the subject.
    ///
    /// # Errors
    ///
    /// Returns `SluiceError::ChannelClosed` if the subject has terminated.
    pub async fn next(&self, value: T) -> Result<()> {
        let _publishing = self.inner.publish.lock().await;

        let senders = {
            let mut state = self.inner.state.lock();
            if state.termination.is_some() {
                return Err(SluiceError::channel_closed("subject closed"));
            }
            if self.inner.replay {
                state.latest = Some(value.clone());
            }
            state.senders.clone()
        };

        let mut gone = Vec::new();
        for (index, tx) in senders.iter().enumerate() {
            if tx.send(value.clone()).await.is_err() {
                gone.push(index);
            }
        }

        if !gone.is_empty() {
            let dropped: Vec<&Sender<T>> = gone.iter().map(|&index| &senders[index]).collect();
            let mut state = self.inner.state.lock();
            state
                .senders
                .retain(|tx| !dropped.iter().any(|gone| gone.same_channel(tx)));
            debug!("subject dropped {} closed subscriber(s)", dropped.len());
        }
        Ok(())
    }

    /// The latest value of a replaying subject.
    #[must_use]
    pub fn latest(&self) -> Option<T> {
        self.inner.state.lock().latest.clone()
    }

    /// Number of subscribers that were still open at the last broadcast.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let mut state = self.inner.state.lock();
        state.senders.retain(|tx| !tx.is_closed());
        state.senders.len()
    }
}

impl<T> Subject<T> {
    /// Fails every subscriber with `error` and terminates the subject.
    ///
    /// Returns `false` if the subject had already terminated.
    pub fn error(&self, error: SluiceError) -> bool {
        self.terminate(Termination::Failed(error))
    }

    /// Completes every subscriber and terminates the subject. Idempotent.
    pub fn close(&self) -> bool {
        self.terminate(Termination::Completed)
    }

    fn terminate(&self, termination: Termination) -> bool {
        let senders = {
            let mut state = self.inner.state.lock();
            if state.termination.is_some() {
                return false;
            }
            state.termination = Some(termination.clone());
            std::mem::take(&mut state.senders)
        };

        for tx in senders {
            match &termination {
                Termination::Failed(e) => tx.close_with_error(e.clone()),
                Termination::Completed | Termination::Cancelled(_) => tx.close(),
            };
        }
        true
    }

    /// Returns `true` once the subject has been closed or failed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().termination.is_some()
    }
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> core::fmt::Debug for Subject<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Subject")
            .field("termination", &state.termination)
            .field("subscribers", &state.senders.len())
            .field("capacity", &self.inner.capacity)
            .finish()
    }
}
