// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Runtime-agnostic task spawning with cancellation.

use crate::runtime::Runtime;
use core::future::Future;
use core::sync::atomic::{AtomicBool, Ordering};
use event_listener::Event;
use futures::future::{self, Either};
use sluice_core::CancellationToken;
use std::sync::Arc;

#[derive(Debug)]
struct Completion {
    finished: AtomicBool,
    event: Event,
}

impl Completion {
    fn new() -> Self {
        Self {
            finished: AtomicBool::new(false),
            event: Event::new(),
        }
    }

    fn finish(&self) {
        self.finished.store(true, Ordering::Release);
        self.event.notify(usize::MAX);
    }

    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    async fn wait(&self) {
        loop {
            if self.is_finished() {
                return;
            }
            let listener = self.event.listen();
            if self.is_finished() {
                return;
            }
            listener.await;
        }
    }
}

// Marks the task finished even when the runtime drops the future unpolled.
struct FinishOnDrop(Arc<Completion>);

impl Drop for FinishOnDrop {
    fn drop(&mut self) {
        self.0.finish();
    }
}

/// Handle to a spawned task that is cancelled when dropped.
///
/// The spawned future receives the task's [`CancellationToken`]. It does not
/// have to poll it: once the token fires, the future is dropped at its next
/// suspension point.
///
/// # Example
///
/// ```rust
/// use sluice_runtime::{StageTask, TokioRuntime};
///
/// # #[tokio::main]
/// # async fn main() {
/// let task = StageTask::spawn(&TokioRuntime, |_cancel| async move {
///     futures::future::pending::<()>().await;
/// });
///
/// task.cancel_and_join().await;
/// assert!(task.is_finished());
/// # }
/// ```
#[derive(Debug)]
pub struct StageTask {
    cancel: CancellationToken,
    completion: Arc<Completion>,
}

impl StageTask {
    /// Spawns a task on `runtime` under a fresh cancellation scope.
    pub fn spawn<R, F, Fut>(runtime: &R, f: F) -> Self
    where
        R: Runtime,
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::spawn_with_token(runtime, CancellationToken::new(), f)
    }

    /// Spawns a task whose scope is a child of `parent`: cancelling `parent`
    /// cancels the task, cancelling the task leaves `parent` alone.
    pub fn spawn_child<R, F, Fut>(runtime: &R, parent: &CancellationToken, f: F) -> Self
    where
        R: Runtime,
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::spawn_with_token(runtime, parent.child_token(), f)
    }

    fn spawn_with_token<R, F, Fut>(runtime: &R, cancel: CancellationToken, f: F) -> Self
    where
        R: Runtime,
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let completion = Arc::new(Completion::new());
        let finish = FinishOnDrop(Arc::clone(&completion));
        let work = f(cancel.clone());
        let stop = cancel.clone();

        runtime.spawn(async move {
            let _finish = finish;
            let work = Box::pin(work);
            let stopped = Box::pin(stop.cancelled_owned());
            if let Either::Right(_) = future::select(work, stopped).await {
                debug!("stage task cancelled");
            }
        });

        Self { cancel, completion }
    }

    /// Requests cancellation without waiting.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns `true` once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Returns `true` once the task has stopped running.
    pub fn is_finished(&self) -> bool {
        self.completion.is_finished()
    }

    /// Waits until the task has stopped, without cancelling it.
    pub async fn join(&self) {
        self.completion.wait().await;
    }

    /// Cancels the task and waits until it has stopped.
    pub async fn cancel_and_join(&self) {
        self.cancel();
        self.join().await;
    }

    /// The task's cancellation token.
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Drop for StageTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
