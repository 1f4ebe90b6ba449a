// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! A store whose events are the reducers themselves.
//!
//! ```
//! use sluice_store::ReducerStore;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let names = ReducerStore::reducing(Vec::<String>::new());
//!
//! let after = names
//!     .handle_fn(|names| {
//!         let mut next = names.clone();
//!         next.push("ada".to_string());
//!         Ok(next)
//!     })
//!     .await
//!     .unwrap();
//!
//! assert_eq!(after, vec!["ada".to_string()]);
//! # }
//! ```

use crate::config::StoreConfig;
use crate::state_store::StateStore;
use sluice_core::Result;
use sluice_runtime::{DefaultRuntime, Runtime};

/// One state transition: computes the next state from the current one.
pub type StateReducer<S> = Box<dyn FnOnce(&S) -> Result<S> + Send>;

/// A [`StateStore`] applying [`StateReducer`] events.
pub type ReducerStore<S, R = DefaultRuntime> = StateStore<S, StateReducer<S>, R>;

fn apply_reducer<S>(state: &S, reducer: StateReducer<S>) -> Result<S> {
    reducer(state)
}

impl<S> StateStore<S, StateReducer<S>, DefaultRuntime>
where
    S: Clone + PartialEq + Send + Sync + 'static,
{
    /// Creates a reducer store with the default configuration.
    pub fn reducing(initial: S) -> Self {
        Self::with_config(initial, apply_reducer, StoreConfig::default())
    }
}

impl<S, R> StateStore<S, StateReducer<S>, R>
where
    S: Clone + PartialEq + Send + Sync + 'static,
    R: Runtime,
{
    /// Applies `reducer` and returns the resulting state.
    ///
    /// # Errors
    ///
    /// Returns the reducer's failure, leaving the state unchanged.
    pub async fn handle_fn<F>(&self, reducer: F) -> Result<S>
    where
        F: FnOnce(&S) -> Result<S> + Send + 'static,
    {
        self.handle(Box::new(reducer)).await
    }

    /// Queues `reducer` for the background dispatcher.
    ///
    /// # Errors
    ///
    /// Fails once the store is closed or failed.
    pub fn dispatch_fn<F>(&self, reducer: F) -> Result<()>
    where
        F: FnOnce(&S) -> Result<S> + Send + 'static,
    {
        self.dispatch(Box::new(reducer))
    }
}
