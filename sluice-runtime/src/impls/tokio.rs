// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{runtime::Runtime, timer::Timer};
use core::future::Future;
use std::time::Duration;

/// Spawns stages on the ambient Tokio runtime.
///
/// Operators using it must be called from within a Tokio runtime context.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioRuntime;

impl Runtime for TokioRuntime {
    type Timer = TokioTimer;

    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        drop(::tokio::spawn(future));
    }

    fn timer(&self) -> Self::Timer {
        TokioTimer
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    type Sleep = ::tokio::time::Sleep;

    fn sleep_future(&self, duration: Duration) -> Self::Sleep {
        ::tokio::time::sleep(duration)
    }
}
