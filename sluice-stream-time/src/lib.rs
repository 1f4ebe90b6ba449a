// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Time-based operators for sluice streams.
//!
//! Timers come from the [`Runtime`](sluice_runtime::Runtime) the operator
//! runs on, so a paused tokio clock drives them in tests.

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

#[macro_use]
#[allow(unused_macros)]
mod logging;

pub mod debounce;
pub mod prelude;

pub use self::debounce::DebounceExt;
