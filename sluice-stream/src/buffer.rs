// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Capacity stages decoupling producer and consumer pace.
//!
//! - `buffer(Capacity::Bounded(n))`: the producer runs up to `n` items ahead,
//!   then waits for the consumer.
//! - `buffer(Capacity::Unbounded)`: the producer never waits.
//! - [`conflate`](BufferExt::conflate): the producer never waits and a slow
//!   consumer only sees the most recent item.

use crate::transform::{pipe, transform};
use sluice_core::{Capacity, Receiver};
use sluice_runtime::{DefaultRuntime, Runtime};

/// Extension trait providing the [`buffer`](Self::buffer) and
/// [`conflate`](Self::conflate) operators.
pub trait BufferExt<T>: Sized {
    /// Forwards every item through a channel of the given capacity.
    ///
    /// # Panics
    ///
    /// Panics on `Capacity::Bounded(0)`.
    fn buffer_with_runtime<R: Runtime>(self, capacity: Capacity, runtime: &R) -> Receiver<T>;

    /// [`buffer_with_runtime`](Self::buffer_with_runtime) on the default runtime.
    fn buffer(self, capacity: Capacity) -> Receiver<T> {
        self.buffer_with_runtime(capacity, &DefaultRuntime::default())
    }

    /// Keeps only the most recent item when the consumer falls behind.
    fn conflate_with_runtime<R: Runtime>(self, runtime: &R) -> Receiver<T> {
        self.buffer_with_runtime(Capacity::Conflated, runtime)
    }

    /// [`conflate_with_runtime`](Self::conflate_with_runtime) on the default runtime.
    fn conflate(self) -> Receiver<T> {
        self.conflate_with_runtime(&DefaultRuntime::default())
    }
}

impl<T: Send + 'static> BufferExt<T> for Receiver<T> {
    fn buffer_with_runtime<R: Runtime>(self, capacity: Capacity, runtime: &R) -> Receiver<T> {
        transform(self, capacity, runtime, |source, output| async move {
            pipe(&source, &output).await
        })
    }
}
