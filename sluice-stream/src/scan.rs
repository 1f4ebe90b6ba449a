// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::transform::transform;
use sluice_core::{Capacity, Receiver};
use sluice_runtime::{DefaultRuntime, Runtime};

/// Extension trait providing the [`scan`](Self::scan) and
/// [`scan_reduce`](Self::scan_reduce) operators.
pub trait ScanExt<T>: Sized {
    /// Running fold: emits `initial` right away, then the accumulator after
    /// every item.
    ///
    /// ```
    /// use sluice_core::{channel, Capacity};
    /// use sluice_stream::ScanExt;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let (tx, rx) = channel::<i32>(Capacity::Unbounded);
    /// let sums = rx.scan(0, |acc, x| acc + x);
    ///
    /// for i in 1..=3 {
    ///     tx.send(i).await.unwrap();
    /// }
    /// tx.close();
    ///
    /// assert_eq!(sums.to_vec().await.unwrap(), vec![0, 1, 3, 6]);
    /// # }
    /// ```
    fn scan_with_runtime<A, F, R>(self, initial: A, op: F, runtime: &R) -> Receiver<A>
    where
        A: Clone + Send + 'static,
        F: FnMut(&A, T) -> A + Send + 'static,
        R: Runtime;

    /// Running fold seeded by the first item. Emits from the second item on.
    fn scan_reduce_with_runtime<F, R>(self, op: F, runtime: &R) -> Receiver<T>
    where
        T: Clone,
        F: FnMut(&T, T) -> T + Send + 'static,
        R: Runtime;

    /// [`scan_with_runtime`](Self::scan_with_runtime) on the default runtime.
    fn scan<A, F>(self, initial: A, op: F) -> Receiver<A>
    where
        A: Clone + Send + 'static,
        F: FnMut(&A, T) -> A + Send + 'static,
    {
        self.scan_with_runtime(initial, op, &DefaultRuntime::default())
    }

    /// [`scan_reduce_with_runtime`](Self::scan_reduce_with_runtime) on the default runtime.
    fn scan_reduce<F>(self, op: F) -> Receiver<T>
    where
        T: Clone,
        F: FnMut(&T, T) -> T + Send + 'static,
    {
        self.scan_reduce_with_runtime(op, &DefaultRuntime::default())
    }
}

impl<T: Send + 'static> ScanExt<T> for Receiver<T> {
    fn scan_with_runtime<A, F, R>(self, initial: A, mut op: F, runtime: &R) -> Receiver<A>
    where
        A: Clone + Send + 'static,
        F: FnMut(&A, T) -> A + Send + 'static,
        R: Runtime,
    {
        transform(self, Capacity::default(), runtime, move |source, output| async move {
            let mut acc = initial;
            output.send(acc.clone()).await?;
            while let Some(item) = source.recv().await? {
                acc = op(&acc, item);
                output.send(acc.clone()).await?;
            }
            Ok(())
        })
    }

    fn scan_reduce_with_runtime<F, R>(self, mut op: F, runtime: &R) -> Receiver<T>
    where
        T: Clone,
        F: FnMut(&T, T) -> T + Send + 'static,
        R: Runtime,
    {
        transform(self, Capacity::default(), runtime, move |source, output| async move {
            let Some(mut acc) = source.recv().await? else {
                return Ok(());
            };
            while let Some(item) = source.recv().await? {
                acc = op(&acc, item);
                output.send(acc.clone()).await?;
            }
            Ok(())
        })
    }
}
