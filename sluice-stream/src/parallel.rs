// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Bounded-concurrency fan-out.
//!
//! [`parallel`](ParallelExt::parallel) runs `concurrency` copies of a
//! sub-pipeline. All copies read the same source and compete for its items,
//! so every item is processed by exactly one copy. Their outputs are merged:
//! the output order is not the source order, and a failing copy fails the
//! output and cancels the others as [`merge`](crate::merge::merge) does.
//!
//! # Example
//!
//! ```
//! use sluice_core::{channel, Capacity};
//! use sluice_stream::ParallelExt;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (tx, rx) = channel::<u64>(Capacity::Unbounded);
//! let squares = rx.parallel_map(4, |x| async move { x * x });
//!
//! for i in 1..=4 {
//!     tx.send(i).await.unwrap();
//! }
//! tx.close();
//!
//! let mut results = squares.to_vec().await.unwrap();
//! results.sort();
//! assert_eq!(results, vec![1, 4, 9, 16]);
//! # }
//! ```

use crate::merge::merge;
use crate::transform::transform;
use core::future::Future;
use sluice_core::{Capacity, Receiver};
use sluice_runtime::{DefaultRuntime, Runtime};
use std::sync::Arc;

/// Extension trait providing the [`parallel`](Self::parallel),
/// [`parallel_map`](Self::parallel_map) and
/// [`parallel_filter`](Self::parallel_filter) operators.
pub trait ParallelExt<T>: Sized {
    /// Runs `concurrency` copies of `pipeline` over the items of `self`.
    ///
    /// # Panics
    ///
    /// Panics if `concurrency` is 0.
    fn parallel_with_runtime<U, P, R>(self, concurrency: usize, pipeline: P, runtime: &R) -> Receiver<U>
    where
        U: Send + 'static,
        P: FnMut(Receiver<T>) -> Receiver<U>,
        R: Runtime;

    /// Maps items with an async function, at most `concurrency` at a time.
    fn parallel_map_with_runtime<U, F, Fut, R>(
        self,
        concurrency: usize,
        f: F,
        runtime: &R,
    ) -> Receiver<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = U> + Send + 'static,
        R: Runtime;

    /// Keeps the items an async predicate accepts, evaluating at most
    /// `concurrency` predicates at a time.
    fn parallel_filter_with_runtime<F, Fut, R>(
        self,
        concurrency: usize,
        predicate: F,
        runtime: &R,
    ) -> Receiver<T>
    where
        F: Fn(&T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
        R: Runtime;

    /// [`parallel_with_runtime`](Self::parallel_with_runtime) on the default runtime.
    fn parallel<U, P>(self, concurrency: usize, pipeline: P) -> Receiver<U>
    where
        U: Send + 'static,
        P: FnMut(Receiver<T>) -> Receiver<U>,
    {
        self.parallel_with_runtime(concurrency, pipeline, &DefaultRuntime::default())
    }

    /// [`parallel_map_with_runtime`](Self::parallel_map_with_runtime) on the default runtime.
    fn parallel_map<U, F, Fut>(self, concurrency: usize, f: F) -> Receiver<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = U> + Send + 'static,
    {
        self.parallel_map_with_runtime(concurrency, f, &DefaultRuntime::default())
    }

    /// [`parallel_filter_with_runtime`](Self::parallel_filter_with_runtime) on the default runtime.
    fn parallel_filter<F, Fut>(self, concurrency: usize, predicate: F) -> Receiver<T>
    where
        F: Fn(&T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.parallel_filter_with_runtime(concurrency, predicate, &DefaultRuntime::default())
    }
}

impl<T: Send + 'static> ParallelExt<T> for Receiver<T> {
    fn parallel_with_runtime<U, P, R>(
        self,
        concurrency: usize,
        mut pipeline: P,
        runtime: &R,
    ) -> Receiver<U>
    where
        U: Send + 'static,
        P: FnMut(Receiver<T>) -> Receiver<U>,
        R: Runtime,
    {
        assert!(concurrency >= 1, "parallel: concurrency must be at least 1");

        let outputs = (0..concurrency)
            .map(|_| pipeline(self.split_work()))
            .collect();
        merge(outputs, runtime)
    }

    fn parallel_map_with_runtime<U, F, Fut, R>(
        self,
        concurrency: usize,
        f: F,
        runtime: &R,
    ) -> Receiver<U>
    where
        U: Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = U> + Send + 'static,
        R: Runtime,
    {
        let f = Arc::new(f);
        self.parallel_with_runtime(
            concurrency,
            |worker| {
                let f = Arc::clone(&f);
                transform(worker, Capacity::default(), runtime, move |source, output| async move {
                    while let Some(item) = source.recv().await? {
                        let mapped = f(item).await;
                        output.send(mapped).await?;
                    }
                    Ok(())
                })
            },
            runtime,
        )
    }

    fn parallel_filter_with_runtime<F, Fut, R>(
        self,
        concurrency: usize,
        predicate: F,
        runtime: &R,
    ) -> Receiver<T>
    where
        F: Fn(&T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
        R: Runtime,
    {
        let predicate = Arc::new(predicate);
        self.parallel_with_runtime(
            concurrency,
            |worker| {
                let predicate = Arc::clone(&predicate);
                transform(worker, Capacity::default(), runtime, move |source, output| async move {
                    while let Some(item) = source.recv().await? {
                        if predicate(&item).await {
                            output.send(item).await?;
                        }
                    }
                    Ok(())
                })
            },
            runtime,
        )
    }
}
