// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The stage constructor every operator is built from.
//!
//! [`transform`] starts one stage: a task that owns a fresh output channel and
//! runs an async body with read access to the source and write access to the
//! output. The stage enforces the lifecycle contract so bodies only have to
//! move data:
//!
//! - body returns `Ok` → output closes normally, even if the source was not
//!   drained;
//! - body returns `Err(e)` → output closes with `e`;
//! - body panics → output closes with a `stage panicked` stream error;
//! - either way the source is cancelled unless it already completed, with
//!   `e` as the cause on failure;
//! - the output's consumer cancels → the body is dropped at its next
//!   suspension point and the source is cancelled with the same cause.
//!
//! # Example
//!
//! ```
//! use sluice_core::{channel, Capacity};
//! use sluice_stream::transform;
//! use sluice_runtime::TokioRuntime;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (tx, rx) = channel::<i32>(Capacity::Unbounded);
//!
//! let doubled = transform(rx, Capacity::default(), &TokioRuntime, |source, output| async move {
//!     while let Some(x) = source.recv().await? {
//!         output.send(x * 2).await?;
//!     }
//!     Ok(())
//! });
//!
//! tx.send(21).await.unwrap();
//! tx.close();
//!
//! assert_eq!(doubled.to_vec().await.unwrap(), vec![42]);
//! # }
//! ```

use core::future::Future;
use futures::future::{self, Either, FutureExt};
use sluice_core::{channel, Capacity, Receiver, Result, Sender, SluiceError, Termination};
use sluice_runtime::{DefaultRuntime, Runtime};
use std::panic::AssertUnwindSafe;

/// Starts a stage reading `source` and writing a new output channel with the
/// given capacity.
///
/// The body gets its own handle on `source`; the stage keeps another so it
/// can cancel the source with the right cause once the body is gone.
pub fn transform<T, U, R, F, Fut>(
    source: Receiver<T>,
    capacity: Capacity,
    runtime: &R,
    body: F,
) -> Receiver<U>
where
    T: Send + 'static,
    U: Send + 'static,
    R: Runtime,
    F: FnOnce(Receiver<T>, Sender<U>) -> Fut,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let (output, rx) = channel(capacity);
    let work = body(source.split_work(), output.clone());
    runtime.spawn(drive(vec![source], output, work));
    rx
}

/// Starts a stage over several sources of the same type.
///
/// Cancelling the output cancels every source; a failing body cancels every
/// source with its error.
pub fn transform_all<T, U, R, F, Fut>(
    sources: Vec<Receiver<T>>,
    capacity: Capacity,
    runtime: &R,
    body: F,
) -> Receiver<U>
where
    T: Send + 'static,
    U: Send + 'static,
    R: Runtime,
    F: FnOnce(Vec<Receiver<T>>, Sender<U>) -> Fut,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let (output, rx) = channel(capacity);
    let handed = sources.iter().map(Receiver::split_work).collect();
    let work = body(handed, output.clone());
    runtime.spawn(drive(sources, output, work));
    rx
}

/// Starts a stage without upstream: the body only produces.
pub fn produce<U, R, F, Fut>(capacity: Capacity, runtime: &R, body: F) -> Receiver<U>
where
    U: Send + 'static,
    R: Runtime,
    F: FnOnce(Sender<U>) -> Fut,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let (output, rx) = channel(capacity);
    let work = body(output.clone());
    runtime.spawn(drive(Vec::<Receiver<()>>::new(), output, work));
    rx
}

async fn drive<T, U, Fut>(upstream: Vec<Receiver<T>>, output: Sender<U>, work: Fut)
where
    Fut: Future<Output = Result<()>>,
{
    trace!("stage started");

    let work = AssertUnwindSafe(work).catch_unwind().map(|outcome| {
        outcome.unwrap_or_else(|_| {
            error!("stage panicked");
            Err(SluiceError::stream_error("stage panicked"))
        })
    });
    let cancelled = Box::pin(output.cancellation_token().cancelled_owned());
    let cause = match future::select(Box::pin(work), cancelled).await {
        Either::Left((Ok(()), _)) => {
            output.close();
            trace!("stage completed");
            None
        }
        Either::Left((Err(error), _)) => {
            debug!("stage failed: {}", error);
            output.close_with_error(error.clone());
            Some(error)
        }
        Either::Right(((), work)) => {
            // Unwind the body before touching the sources.
            drop(work);
            debug!("stage output cancelled");
            match output.termination() {
                Some(Termination::Cancelled(cause)) => Some(cause),
                _ => Some(SluiceError::cancelled("stage output cancelled")),
            }
        }
    };

    for source in &upstream {
        source.cancel(cause.clone());
    }
}

/// Copies every item of `source` into `sink`.
///
/// Does not close `sink`: its owner decides when the output ends.
///
/// # Errors
///
/// Returns the failure of `source`, or the error of a rejected send.
pub async fn pipe<T>(source: &Receiver<T>, sink: &Sender<T>) -> Result<()> {
    while let Some(item) = source.recv().await? {
        sink.send(item).await?;
    }
    Ok(())
}

/// Extension trait providing [`transform`] as a method.
pub trait TransformExt<T>: Sized {
    /// Method form of [`transform`].
    fn transform_with_runtime<U, R, F, Fut>(
        self,
        capacity: Capacity,
        runtime: &R,
        body: F,
    ) -> Receiver<U>
    where
        U: Send + 'static,
        R: Runtime,
        F: FnOnce(Receiver<T>, Sender<U>) -> Fut,
        Fut: Future<Output = Result<()>> + Send + 'static;

    /// [`transform_with_runtime`](Self::transform_with_runtime) on the default runtime.
    fn transform<U, F, Fut>(self, capacity: Capacity, body: F) -> Receiver<U>
    where
        U: Send + 'static,
        F: FnOnce(Receiver<T>, Sender<U>) -> Fut,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.transform_with_runtime(capacity, &DefaultRuntime::default(), body)
    }
}

impl<T: Send + 'static> TransformExt<T> for Receiver<T> {
    fn transform_with_runtime<U, R, F, Fut>(
        self,
        capacity: Capacity,
        runtime: &R,
        body: F,
    ) -> Receiver<U>
    where
        U: Send + 'static,
        R: Runtime,
        F: FnOnce(Receiver<T>, Sender<U>) -> Fut,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        transform(self, capacity, runtime, body)
    }
}
