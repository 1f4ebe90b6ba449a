// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Latest-value combination.
//!
//! Each source is tagged by a forwarding stage, the tagged streams are merged,
//! and one combining stage reads the merged stream. The latest values live
//! only inside that combining stage, so they are never touched by two tasks.
//!
//! Nothing is emitted until every source has produced a value; after that
//! every upstream item produces exactly one combined item. Failures and
//! cancellation behave as in [`merge`](crate::merge::merge).

use crate::map::MapExt;
use crate::merge::merge;
use crate::transform::transform;
use sluice_core::{Capacity, Receiver};
use sluice_runtime::{DefaultRuntime, Runtime};

enum Update<A, B> {
    Left(A),
    Right(B),
}

/// Snapshot of the latest value of every source, in source order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CombinedState<T> {
    values: Vec<T>,
}

impl<T> CombinedState<T> {
    /// Creates a snapshot from values in source order.
    pub fn new(values: Vec<T>) -> Self {
        Self { values }
    }

    /// The latest values, in source order.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Consumes the snapshot.
    pub fn into_values(self) -> Vec<T> {
        self.values
    }

    /// Number of combined sources.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no source was combined.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Extension trait providing the [`combine_latest_with`](Self::combine_latest_with)
/// and [`combine_latest`](Self::combine_latest) operators.
pub trait CombineLatestExt<T>: Sized {
    /// Emits `combine(latest_self, latest_other)` whenever either stream emits,
    /// once both have emitted.
    fn combine_latest_with_runtime<B, C, F, R>(
        self,
        other: Receiver<B>,
        combine: F,
        runtime: &R,
    ) -> Receiver<C>
    where
        B: Send + 'static,
        C: Send + 'static,
        F: FnMut(&T, &B) -> C + Send + 'static,
        R: Runtime;

    /// Emits the latest value of `self` and of every stream in `others`
    /// whenever one of them emits, once all have emitted.
    fn combine_latest_all_with_runtime<R>(
        self,
        others: Vec<Receiver<T>>,
        runtime: &R,
    ) -> Receiver<CombinedState<T>>
    where
        T: Clone,
        R: Runtime;

    /// [`combine_latest_with_runtime`](Self::combine_latest_with_runtime) on the default runtime.
    ///
    /// ```
    /// use sluice_core::{channel, Capacity};
    /// use sluice_stream::CombineLatestExt;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let (names_tx, names) = channel::<&str>(Capacity::Unbounded);
    /// let (ages_tx, ages) = channel::<u32>(Capacity::Unbounded);
    ///
    /// let people = names.combine_latest_with(ages, |name, age| format!("{name}:{age}"));
    ///
    /// names_tx.send("ada").await.unwrap();
    /// ages_tx.send(36).await.unwrap();
    /// assert_eq!(people.recv().await.unwrap(), Some("ada:36".to_string()));
    /// # }
    /// ```
    fn combine_latest_with<B, C, F>(self, other: Receiver<B>, combine: F) -> Receiver<C>
    where
        B: Send + 'static,
        C: Send + 'static,
        F: FnMut(&T, &B) -> C + Send + 'static,
    {
        self.combine_latest_with_runtime(other, combine, &DefaultRuntime::default())
    }

    /// [`combine_latest_all_with_runtime`](Self::combine_latest_all_with_runtime)
    /// on the default runtime.
    fn combine_latest(self, others: Vec<Receiver<T>>) -> Receiver<CombinedState<T>>
    where
        T: Clone,
    {
        self.combine_latest_all_with_runtime(others, &DefaultRuntime::default())
    }
}

impl<T: Send + 'static> CombineLatestExt<T> for Receiver<T> {
    fn combine_latest_with_runtime<B, C, F, R>(
        self,
        other: Receiver<B>,
        mut combine: F,
        runtime: &R,
    ) -> Receiver<C>
    where
        B: Send + 'static,
        C: Send + 'static,
        F: FnMut(&T, &B) -> C + Send + 'static,
        R: Runtime,
    {
        let left = self.map_with_runtime(Update::Left, runtime);
        let right = other.map_with_runtime(Update::Right, runtime);
        let updates = merge(vec![left, right], runtime);

        transform(updates, Capacity::default(), runtime, move |updates, output| async move {
            let mut latest_left: Option<T> = None;
            let mut latest_right: Option<B> = None;

            while let Some(update) = updates.recv().await? {
                match update {
                    Update::Left(value) => latest_left = Some(value),
                    Update::Right(value) => latest_right = Some(value),
                }
                let combined = match (&latest_left, &latest_right) {
                    (Some(left), Some(right)) => Some(combine(left, right)),
                    _ => None,
                };
                if let Some(combined) = combined {
                    output.send(combined).await?;
                }
            }
            Ok(())
        })
    }

    fn combine_latest_all_with_runtime<R>(
        self,
        others: Vec<Receiver<T>>,
        runtime: &R,
    ) -> Receiver<CombinedState<T>>
    where
        T: Clone,
        R: Runtime,
    {
        let count = others.len() + 1;
        let tagged: Vec<Receiver<(usize, T)>> = std::iter::once(self)
            .chain(others)
            .enumerate()
            .map(|(index, source)| source.map_with_runtime(move |value| (index, value), runtime))
            .collect();
        let updates = merge(tagged, runtime);

        transform(updates, Capacity::default(), runtime, move |updates, output| async move {
            let mut latest: Vec<Option<T>> = vec![None; count];
            let mut ready = 0;

            while let Some((index, value)) = updates.recv().await? {
                if latest[index].replace(value).is_none() {
                    ready += 1;
                }
                if ready == count {
                    let values = latest.iter().flatten().cloned().collect();
                    output.send(CombinedState::new(values)).await?;
                }
            }
            Ok(())
        })
    }
}
