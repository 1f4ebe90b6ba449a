// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::transform::transform;
use sluice_core::{Capacity, Receiver};
use sluice_runtime::{DefaultRuntime, Runtime};

/// Extension trait providing the [`take`](Self::take) operator.
pub trait TakeExt<T>: Sized {
    /// Forwards the first `n` items, then completes and cancels the source.
    fn take_with_runtime<R: Runtime>(self, n: usize, runtime: &R) -> Receiver<T>;

    /// [`take_with_runtime`](Self::take_with_runtime) on the default runtime.
    fn take(self, n: usize) -> Receiver<T> {
        self.take_with_runtime(n, &DefaultRuntime::default())
    }
}

impl<T: Send + 'static> TakeExt<T> for Receiver<T> {
    fn take_with_runtime<R: Runtime>(self, n: usize, runtime: &R) -> Receiver<T> {
        transform(self, Capacity::default(), runtime, move |source, output| async move {
            let mut remaining = n;
            while remaining > 0 {
                let Some(item) = source.recv().await? else {
                    break;
                };
                output.send(item).await?;
                remaining -= 1;
            }
            Ok(())
        })
    }
}
