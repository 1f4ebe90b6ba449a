// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Terminal consumers for sluice streams.
//!
//! [`SubscribeExt::subscribe`] is the end of a pipeline: it pulls items one
//! at a time and hands each to an async handler.

#[macro_use]
#[allow(unused_macros)]
mod logging;

pub mod subscribe;

pub use self::subscribe::SubscribeExt;
