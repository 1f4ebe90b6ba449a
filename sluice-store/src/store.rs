// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use async_trait::async_trait;
use sluice_core::{Receiver, Result};

/// Common surface of [`StateStore`](crate::StateStore) and
/// [`StoreView`](crate::StoreView).
#[async_trait]
pub trait Store<S, E>: Send + Sync {
    /// The current state.
    fn get(&self) -> S;

    /// A stream starting with the current state, followed by every change.
    ///
    /// # Errors
    ///
    /// Fails once the store is closed.
    fn subscribe(&self) -> Result<Receiver<S>>;

    /// Applies `event` and returns the resulting state.
    ///
    /// # Errors
    ///
    /// Returns the reducer's failure, leaving the state unchanged, or the
    /// store's failure once it is closed or failed.
    async fn handle(&self, event: E) -> Result<S>;

    /// Queues `event` to be applied in the background, after every event
    /// dispatched before it.
    ///
    /// # Errors
    ///
    /// Fails once the store is closed or failed.
    fn dispatch(&self, event: E) -> Result<()>;
}
