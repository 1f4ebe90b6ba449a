// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! # Sluice
//!
//! Cancellable, backpressured stream pipelines for async Rust.
//!
//! ## Overview
//!
//! A pipeline is a chain of stages connected by channels. Every stage is a
//! spawned task reading one or more [`Receiver`]s and writing one output
//! [`Sender`]. Completion and failure travel downstream with the items;
//! cancellation travels upstream, so dropping the final receiver stops every
//! stage feeding it.
//!
//! - [`sluice_core`]: channels with terminal states, [`SluiceError`],
//!   [`CancellationToken`] and the hot [`Subject`].
//! - [`sluice_runtime`]: the [`Runtime`] every stage is spawned on.
//! - [`sluice_stream`]: `transform` and the operators built on it.
//! - [`sluice_stream_time`]: `debounce`.
//! - [`sluice_store`]: a reactive state store.
//! - [`sluice_exec`]: the `subscribe` terminal consumer.
//!
//! ## Quick Start
//!
//! ```rust
//! use sluice::prelude::*;
//! use sluice::{channel, Capacity};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (tx, rx) = channel::<u32>(Capacity::Unbounded);
//!     for i in 1..=6 {
//!         tx.try_send(i).unwrap();
//!     }
//!     tx.close();
//!
//!     let sums = rx
//!         .filter(|n| n % 2 == 0)
//!         .map(|n| n * 10)
//!         .scan(0, |total, n| total + n);
//!
//!     assert_eq!(sums.to_vec().await.unwrap(), vec![0, 20, 60, 120]);
//! }
//! ```

pub use sluice_core::{
    channel, CancelHandle, CancellationToken, Capacity, Receiver, ReceiverStream, Result,
    Sender, SluiceError, StreamItem, Subject, Termination,
};
pub use sluice_runtime::{DefaultRuntime, Runtime, StageTask, Timer};
pub use sluice_store::{
    ErrorPolicy, ReducerStore, StateStore, Store, StoreConfig, StoreView,
};
pub use sluice_stream::{from_stream, from_try_stream, merge, pipe, produce, transform};

pub use sluice_core;
pub use sluice_exec;
pub use sluice_runtime;
pub use sluice_store;
pub use sluice_stream;
pub use sluice_stream_time;

/// Every extension trait of the workspace, for glob import.
pub mod prelude {
    pub use sluice_exec::SubscribeExt;
    pub use sluice_store::Store;
    pub use sluice_stream::prelude::*;
    pub use sluice_stream_time::prelude::*;
}
