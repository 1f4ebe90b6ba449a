// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::timer::Timer;
use core::fmt::Debug;
use core::future::Future;

/// Execution context every stage runs on.
///
/// Operators never pick a scheduler themselves: each one takes a runtime
/// (the `*_with_runtime` variants) or falls back to [`DefaultRuntime`].
pub trait Runtime: Clone + Send + Sync + Debug + 'static {
    /// Timer used by time-based operators.
    type Timer: Timer;

    /// Runs `future` as a new detached task.
    fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static;

    /// The timer of this runtime.
    fn timer(&self) -> Self::Timer;
}

/// Runtime used by the operator variants that take no explicit runtime.
#[cfg(feature = "runtime-tokio")]
pub type DefaultRuntime = crate::impls::tokio::TokioRuntime;

/// Runtime used by the operator variants that take no explicit runtime.
#[cfg(all(feature = "runtime-smol", not(feature = "runtime-tokio")))]
pub type DefaultRuntime = crate::impls::smol::SmolRuntime;
