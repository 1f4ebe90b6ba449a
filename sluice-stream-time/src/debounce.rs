// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Trailing debounce.
//!
//! Every item starts a quiet period of `span`. An item arriving before the
//! period is over replaces the pending one and restarts the period, so only
//! the last item of a burst is emitted, `span` after it arrived.
//!
//! When the source completes, a pending item is emitted right away. When the
//! source fails, the pending item is dropped and the output fails.
//!
//! # Example
//!
//! ```
//! use sluice_core::{channel, Capacity};
//! use sluice_stream_time::DebounceExt;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (tx, rx) = channel::<&str>(Capacity::Unbounded);
//! let settled = rx.debounce(Duration::from_millis(20));
//!
//! tx.send("h").await.unwrap();
//! tx.send("he").await.unwrap();
//! tx.send("hello").await.unwrap();
//!
//! assert_eq!(settled.recv().await.unwrap(), Some("hello"));
//! # }
//! ```

use core::future::Future;
use core::pin::{pin, Pin};
use core::task::{Context, Poll};
use core::time::Duration;
use futures::future::{self, Either};
use futures::ready;
use pin_project::pin_project;
use sluice_core::{Capacity, Receiver, Result};
use sluice_runtime::{DefaultRuntime, Runtime, Timer};
use sluice_stream::transform;

/// An item waiting for its quiet period to end.
#[pin_project]
struct PendingEmit<S, T> {
    #[pin]
    sleep: S,
    value: Option<T>,
}

impl<S, T> PendingEmit<S, T> {
    fn new(sleep: S, value: T) -> Self {
        Self {
            sleep,
            value: Some(value),
        }
    }

    fn take(self: Pin<&mut Self>) -> Option<T> {
        self.project().value.take()
    }
}

impl<S: Future<Output = ()>, T> Future for PendingEmit<S, T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let this = self.project();
        ready!(this.sleep.poll(cx));
        match this.value.take() {
            Some(value) => Poll::Ready(value),
            None => Poll::Pending,
        }
    }
}

enum Event<T> {
    Source(Result<Option<T>>),
    Elapsed(T),
}

/// Extension trait providing the [`debounce`](Self::debounce) operator.
pub trait DebounceExt<T>: Sized {
    /// Emits an item only once `span` has passed without a newer one,
    /// using the timer of `runtime`.
    fn debounce_with_runtime<R: Runtime>(self, span: Duration, runtime: &R) -> Receiver<T>;

    /// [`debounce_with_runtime`](Self::debounce_with_runtime) on the default runtime.
    fn debounce(self, span: Duration) -> Receiver<T> {
        self.debounce_with_runtime(span, &DefaultRuntime::default())
    }
}

impl<T: Send + 'static> DebounceExt<T> for Receiver<T> {
    fn debounce_with_runtime<R: Runtime>(self, span: Duration, runtime: &R) -> Receiver<T> {
        let timer = runtime.timer();

        transform(self, Capacity::default(), runtime, move |source, output| async move {
            let mut pending: Option<Pin<Box<PendingEmit<<R::Timer as Timer>::Sleep, T>>>> = None;

            loop {
                let event = match pending.as_mut() {
                    None => Event::Source(source.recv().await),
                    Some(emit) => {
                        let next = pin!(source.recv());
                        match future::select(next, emit.as_mut()).await {
                            Either::Left((next, _)) => Event::Source(next),
                            Either::Right((value, _)) => Event::Elapsed(value),
                        }
                    }
                };

                match event {
                    Event::Source(Ok(Some(item))) => {
                        if pending.is_some() {
                            trace!("debounce: pending item replaced");
                        }
                        pending = Some(Box::pin(PendingEmit::new(timer.sleep_future(span), item)));
                    }
                    Event::Source(Ok(None)) => {
                        if let Some(value) = pending.as_mut().and_then(|emit| emit.as_mut().take()) {
                            output.send(value).await?;
                        }
                        return Ok(());
                    }
                    Event::Source(Err(error)) => return Err(error),
                    Event::Elapsed(value) => {
                        pending = None;
                        output.send(value).await?;
                    }
                }
            }
        })
    }
}
