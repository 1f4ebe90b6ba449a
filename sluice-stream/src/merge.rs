// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Fan-in of several streams into one.
//!
//! Items are forwarded in arrival order: the order within each source is
//! kept, the interleaving across sources is whatever the scheduler produces.
//!
//! # Error Handling
//!
//! The first source to fail closes the output with its error. Every other
//! source is cancelled with a clone of that error so no producer keeps
//! running for a dead output. The stage still waits for every copy loop to
//! stop before it closes the output.

use crate::transform::{pipe, transform_all};
use futures::StreamExt;
use futures_util::stream::FuturesUnordered;
use sluice_core::{CancelHandle, Capacity, Receiver};
use sluice_runtime::{DefaultRuntime, Runtime};

/// Merges `sources` into one output on `runtime`.
///
/// An empty `sources` yields a stream that completes immediately.
pub fn merge<T, R>(sources: Vec<Receiver<T>>, runtime: &R) -> Receiver<T>
where
    T: Send + 'static,
    R: Runtime,
{
    merge_with_capacity(sources, Capacity::default(), runtime)
}

pub(crate) fn merge_with_capacity<T, R>(
    sources: Vec<Receiver<T>>,
    capacity: Capacity,
    runtime: &R,
) -> Receiver<T>
where
    T: Send + 'static,
    R: Runtime,
{
    let handles: Vec<CancelHandle<T>> = sources.iter().map(Receiver::cancel_handle).collect();

    transform_all(sources, capacity, runtime, move |sources, output| async move {
        let mut copies: FuturesUnordered<_> = sources
            .into_iter()
            .map(|source| {
                let output = output.clone();
                async move { pipe(&source, &output).await }
            })
            .collect();

        let mut first_error = None;
        while let Some(copied) = copies.next().await {
            let Err(error) = copied else {
                continue;
            };
            if first_error.is_none() {
                debug!("merge source failed, cancelling siblings: {}", error);
                for handle in &handles {
                    handle.cancel(Some(error.clone()));
                }
                first_error = Some(error);
            }
        }

        first_error.map_or(Ok(()), Err::<(), _>)
    })
}

/// Extension trait providing the [`merge_with`](Self::merge_with) operator.
pub trait MergeExt<T>: Sized {
    /// Merges `self` with `others` on `runtime`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice_core::{channel, Capacity};
    /// use sluice_stream::MergeExt;
    /// use sluice_runtime::TokioRuntime;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let (tx1, rx1) = channel::<i32>(Capacity::Unbounded);
    /// let (tx2, rx2) = channel::<i32>(Capacity::Unbounded);
    ///
    /// let merged = rx1.merge_with_runtime(vec![rx2], &TokioRuntime);
    ///
    /// tx1.send(1).await.unwrap();
    /// tx2.send(2).await.unwrap();
    /// drop((tx1, tx2));
    ///
    /// let mut items = merged.to_vec().await.unwrap();
    /// items.sort();
    /// assert_eq!(items, vec![1, 2]);
    /// # }
    /// ```
    fn merge_with_runtime<R: Runtime>(self, others: Vec<Receiver<T>>, runtime: &R) -> Receiver<T>;

    /// [`merge_with_runtime`](Self::merge_with_runtime) on the default runtime.
    fn merge_with(self, others: Vec<Receiver<T>>) -> Receiver<T> {
        self.merge_with_runtime(others, &DefaultRuntime::default())
    }
}

impl<T: Send + 'static> MergeExt<T> for Receiver<T> {
    fn merge_with_runtime<R: Runtime>(self, others: Vec<Receiver<T>>, runtime: &R) -> Receiver<T> {
        let mut sources = Vec::with_capacity(others.len() + 1);
        sources.push(self);
        sources.extend(others);
        merge(sources, runtime)
    }
}
