// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use core::error::Error;
use core::future::Future;
use core::pin::pin;
use futures::future::{self, Either};
use sluice_core::{CancellationToken, Receiver, Result, SluiceError};

/// Extension trait providing the [`subscribe`](Self::subscribe) terminal
/// consumer.
#[async_trait]
pub trait SubscribeExt<T>: Sized {
    /// Drains the stream, running `on_next` for one item at a time.
    ///
    /// Each handler call completes before the next item is received, so
    /// items are handled in stream order and a slow handler holds back the
    /// producer.
    ///
    /// # Behavior
    ///
    /// - Handler failures are passed to `on_error` and the subscription goes
    ///   on with the next item.
    /// - Without `on_error`, handler failures are collected and returned as
    ///   [`SluiceError::MultipleErrors`] once the stream completes.
    /// - Cancelling `cancellation_token` cancels the stream and returns
    ///   `Ok(())`. The token is handed to every handler call as well.
    ///
    /// # Errors
    ///
    /// Returns the stream's failure if it fails, or the collected handler
    /// failures when no `on_error` was given.
    ///
    /// # Example
    ///
    /// ```
    /// use sluice_core::{channel, Capacity};
    /// use sluice_exec::SubscribeExt;
    /// use std::sync::{Arc, Mutex};
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let (tx, rx) = channel::<u32>(Capacity::Unbounded);
    /// for i in 1..=3 {
    ///     tx.try_send(i).unwrap();
    /// }
    /// tx.close();
    ///
    /// let seen = Arc::new(Mutex::new(Vec::new()));
    /// let sink = Arc::clone(&seen);
    /// rx.subscribe(
    ///     move |item, _token| {
    ///         let sink = Arc::clone(&sink);
    ///         async move {
    ///             sink.lock().unwrap().push(item * 10);
    ///             Ok::<(), std::io::Error>(())
    ///         }
    ///     },
    ///     None,
    ///     None::<fn(std::io::Error)>,
    /// )
    /// .await
    /// .unwrap();
    ///
    /// assert_eq!(*seen.lock().unwrap(), vec![10, 20, 30]);
    /// # }
    /// ```
    async fn subscribe<F, Fut, E, OnError>(
        self,
        on_next: F,
        cancellation_token: Option<CancellationToken>,
        on_error: Option<OnError>,
    ) -> Result<()>
    where
        F: Fn(T, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = core::result::Result<(), E>> + Send + 'static,
        OnError: Fn(E) + Send + Sync + 'static,
        E: Error + Send + Sync + 'static;
}

#[async_trait]
impl<T: Send + 'static> SubscribeExt<T> for Receiver<T> {
    async fn subscribe<F, Fut, E, OnError>(
        self,
        on_next: F,
        cancellation_token: Option<CancellationToken>,
        on_error: Option<OnError>,
    ) -> Result<()>
    where
        F: Fn(T, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = core::result::Result<(), E>> + Send + 'static,
        OnError: Fn(E) + Send + Sync + 'static,
        E: Error + Send + Sync + 'static,
    {
        let cancellation_token = cancellation_token.unwrap_or_default();
        let mut collected_errors = Vec::new();

        loop {
            let next = {
                let received = pin!(self.recv());
                let cancelled = pin!(cancellation_token.cancelled());
                match future::select(received, cancelled).await {
                    Either::Left((next, _)) => next,
                    Either::Right(((), _)) => {
                        debug!("subscription cancelled by token");
                        self.cancel(Some(SluiceError::cancelled("subscription cancelled")));
                        return Ok(());
                    }
                }
            };

            let item = match next {
                Ok(Some(item)) => item,
                Ok(None) => break,
                Err(error) => {
                    if !collected_errors.is_empty() {
                        warn!(
                            "stream failed, discarding {} handler error(s)",
                            collected_errors.len()
                        );
                    }
                    return Err(error);
                }
            };

            if let Err(error) = on_next(item, cancellation_token.clone()).await {
                match &on_error {
                    Some(on_error) => on_error(error),
                    None => collected_errors.push(error),
                }
            }
        }

        trace!("subscription completed");
        if collected_errors.is_empty() {
            Ok(())
        } else {
            Err(SluiceError::from_user_errors(collected_errors))
        }
    }
}
