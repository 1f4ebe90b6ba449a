// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Dynamic re-subscription.
//!
//! Every source item is mapped to an inner stream and only the newest inner
//! stream is forwarded. A new source item cancels the active inner stream and
//! stops its forwarding loop before the next inner stream is started, so
//! items of two inner streams never interleave.
//!
//! When the source completes, the active inner stream runs to its end and
//! then the output completes. A failing source or inner stream fails the
//! output and cancels everything else.

use crate::transform::{pipe, transform};
use futures::channel::oneshot;
use futures::future::{Fuse, FutureExt};
use sluice_core::{CancelHandle, Capacity, Receiver, Result, Sender, SluiceError};
use sluice_runtime::{DefaultRuntime, Runtime, StageTask};

struct ActiveInner<U> {
    handle: CancelHandle<U>,
    task: StageTask,
    finished: Fuse<oneshot::Receiver<Result<()>>>,
}

impl<U: Send + 'static> ActiveInner<U> {
    fn start<R: Runtime>(inner: Receiver<U>, output: &Sender<U>, runtime: &R) -> Self {
        let handle = inner.cancel_handle();
        let output = output.clone();
        let (done, finished) = oneshot::channel();
        let parent = output.cancellation_token();
        let task = StageTask::spawn_child(runtime, &parent, move |_| async move {
            let _ = done.send(pipe(&inner, &output).await);
        });
        Self {
            handle,
            task,
            finished: finished.fuse(),
        }
    }

    async fn cancel(self, cause: SluiceError) {
        // No item of this inner stream reaches the output once joined.
        self.task.cancel_and_join().await;
        self.handle.cancel(Some(cause));
    }
}

fn forward_outcome(outcome: core::result::Result<Result<()>, oneshot::Canceled>) -> Result<()> {
    outcome.unwrap_or_else(|_| Err(SluiceError::cancelled("inner stream forwarding stopped")))
}

enum Step<T> {
    Source(Result<Option<T>>),
    InnerFinished(Result<()>),
}

/// Extension trait providing the [`switch_map`](Self::switch_map) operator.
pub trait SwitchMapExt<T>: Sized {
    /// Maps every item to an inner stream and forwards the most recent one.
    fn switch_map_with_runtime<U, F, R>(self, f: F, runtime: &R) -> Receiver<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> Receiver<U> + Send + 'static,
        R: Runtime;

    /// [`switch_map_with_runtime`](Self::switch_map_with_runtime) on the default runtime.
    ///
    /// ```
    /// use sluice_core::{channel, Capacity, Receiver};
    /// use sluice_stream::SwitchMapExt;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let (tx, rx) = channel::<u32>(Capacity::Unbounded);
    ///
    /// let repeated = rx.switch_map(|n| {
    ///     let (inner_tx, inner_rx) = channel(Capacity::Unbounded);
    ///     for _ in 0..n {
    ///         inner_tx.try_send(n).unwrap();
    ///     }
    ///     inner_tx.close();
    ///     inner_rx
    /// });
    ///
    /// tx.send(2).await.unwrap();
    /// tx.close();
    ///
    /// assert_eq!(repeated.to_vec().await.unwrap(), vec![2, 2]);
    /// # }
    /// ```
    fn switch_map<U, F>(self, f: F) -> Receiver<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> Receiver<U> + Send + 'static,
    {
        self.switch_map_with_runtime(f, &DefaultRuntime::default())
    }
}

impl<T: Send + 'static> SwitchMapExt<T> for Receiver<T> {
    fn switch_map_with_runtime<U, F, R>(self, mut f: F, runtime: &R) -> Receiver<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> Receiver<U> + Send + 'static,
        R: Runtime,
    {
        let spawner = runtime.clone();
        transform(self, Capacity::default(), runtime, move |source, output| async move {
            let mut active: Option<ActiveInner<U>> = None;

            loop {
                let step = match active.as_mut() {
                    None => Step::Source(source.recv().await),
                    Some(inner) => {
                        futures::select! {
                            next = source.recv().fuse() => Step::Source(next),
                            finished = &mut inner.finished => Step::InnerFinished(forward_outcome(finished)),
                        }
                    }
                };

                match step {
                    Step::Source(Ok(Some(item))) => {
                        if let Some(previous) = active.take() {
                            previous
                                .cancel(SluiceError::cancelled("switched to a newer inner stream"))
                                .await;
                        }
                        active = Some(ActiveInner::start(f(item), &output, &spawner));
                    }
                    Step::Source(Ok(None)) => {
                        if let Some(last) = active.take() {
                            forward_outcome(last.finished.await)?;
                        }
                        return Ok(());
                    }
                    Step::Source(Err(error)) => {
                        if let Some(inner) = active.take() {
                            inner.cancel(error.clone()).await;
                        }
                        return Err(error);
                    }
                    Step::InnerFinished(finished) => {
                        active = None;
                        finished?;
                    }
                }
            }
        })
    }
}
