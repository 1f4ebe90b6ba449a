// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Reactive state store.
//!
//! A [`StateStore`] holds one current value and a reducer. Events are applied
//! one at a time under an async guard; every transition that produces a
//! different value is published to the store's subscribers, which always
//! start with the current value.
//!
//! - [`StateStore::handle`] applies an event and returns the resulting state,
//!   or the reducer's error (the state is then left unchanged).
//! - [`StateStore::dispatch`] queues an event for a background dispatcher
//!   that applies queued events in submission order. Its failures are
//!   handled by the store's [`ErrorPolicy`].
//! - [`StoreView`] exposes a mapped projection of a store.
//!
//! # Example
//!
//! ```
//! use sluice_store::StateStore;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let counter = StateStore::new(0, |count: &i32, delta: i32| Ok(count + delta));
//! let updates = counter.subscribe().unwrap();
//!
//! assert_eq!(counter.handle(5).await.unwrap(), 5);
//! assert_eq!(updates.recv().await.unwrap(), Some(0));
//! assert_eq!(updates.recv().await.unwrap(), Some(5));
//! # }
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

#[macro_use]
#[allow(unused_macros)]
mod logging;

pub mod config;
pub mod reducer_store;
pub mod state_store;
pub mod store;
pub mod view;

pub use self::config::{ErrorHandler, ErrorPolicy, StoreConfig};
pub use self::reducer_store::{ReducerStore, StateReducer};
pub use self::state_store::StateStore;
pub use self::store::Store;
pub use self::view::StoreView;
