// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

#[cfg(not(any(feature = "runtime-tokio", feature = "runtime-smol")))]
compile_error!("sluice-runtime needs the `runtime-tokio` or the `runtime-smol` feature");

#[macro_use]
#[allow(unused_macros)]
mod logging;

pub mod impls;
pub mod runtime;
pub mod task;
pub mod timer;

#[cfg(feature = "runtime-smol")]
pub use self::impls::smol::{SmolRuntime, SmolTimer};
#[cfg(feature = "runtime-tokio")]
pub use self::impls::tokio::{TokioRuntime, TokioTimer};
pub use self::runtime::{DefaultRuntime, Runtime};
pub use self::task::StageTask;
pub use self::timer::Timer;
