// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::transform::transform;
use sluice_core::{Capacity, Receiver};
use sluice_runtime::{DefaultRuntime, Runtime};

/// Extension trait providing the [`map`](Self::map) and
/// [`filter_map`](Self::filter_map) operators.
pub trait MapExt<T>: Sized {
    /// Applies `f` to every item.
    fn map_with_runtime<U, F, R>(self, f: F, runtime: &R) -> Receiver<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> U + Send + 'static,
        R: Runtime;

    /// Applies `f` to every item and keeps the `Some` results.
    fn filter_map_with_runtime<U, F, R>(self, f: F, runtime: &R) -> Receiver<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> Option<U> + Send + 'static,
        R: Runtime;

    /// [`map_with_runtime`](Self::map_with_runtime) on the default runtime.
    ///
    /// ```
    /// use sluice_core::{channel, Capacity};
    /// use sluice_stream::MapExt;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let (tx, rx) = channel::<i32>(Capacity::Unbounded);
    /// let lengths = rx.map(|x| x.to_string().len());
    ///
    /// tx.send(100).await.unwrap();
    /// tx.close();
    ///
    /// assert_eq!(lengths.to_vec().await.unwrap(), vec![3]);
    /// # }
    /// ```
    fn map<U, F>(self, f: F) -> Receiver<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> U + Send + 'static,
    {
        self.map_with_runtime(f, &DefaultRuntime::default())
    }

    /// [`filter_map_with_runtime`](Self::filter_map_with_runtime) on the default runtime.
    fn filter_map<U, F>(self, f: F) -> Receiver<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> Option<U> + Send + 'static,
    {
        self.filter_map_with_runtime(f, &DefaultRuntime::default())
    }
}

impl<T: Send + 'static> MapExt<T> for Receiver<T> {
    fn map_with_runtime<U, F, R>(self, mut f: F, runtime: &R) -> Receiver<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> U + Send + 'static,
        R: Runtime,
    {
        transform(self, Capacity::default(), runtime, move |source, output| async move {
            while let Some(item) = source.recv().await? {
                output.send(f(item)).await?;
            }
            Ok(())
        })
    }

    fn filter_map_with_runtime<U, F, R>(self, mut f: F, runtime: &R) -> Receiver<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> Option<U> + Send + 'static,
        R: Runtime,
    {
        transform(self, Capacity::default(), runtime, move |source, output| async move {
            while let Some(item) = source.recv().await? {
                if let Some(mapped) = f(item) {
                    output.send(mapped).await?;
                }
            }
            Ok(())
        })
    }
}
