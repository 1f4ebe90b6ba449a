// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Mapped projections of a store.
//!
//! A [`StoreView`] has no state and no guard of its own: every call is
//! forwarded to the underlying store, so transitions made through a view
//! are serialized with every other transition of that store.

use crate::store::Store;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use sluice_core::{Receiver, Result};
use sluice_runtime::{DefaultRuntime, Runtime};
use sluice_stream::MapExt;
use std::sync::Arc;

type GetFn<T> = dyn Fn() -> T + Send + Sync;
type SubscribeFn<T> = dyn Fn() -> Result<Receiver<T>> + Send + Sync;
type HandleFn<T, A> = dyn Fn(A) -> BoxFuture<'static, Result<T>> + Send + Sync;
type DispatchFn<A> = dyn Fn(A) -> Result<()> + Send + Sync;

/// A store seen through a state mapping and an event mapping.
///
/// Created by [`StateStore::view`](crate::StateStore::view) or, for a view
/// of a view, by [`StoreView::view`].
pub struct StoreView<T, A, R = DefaultRuntime> {
    get: Arc<GetFn<T>>,
    subscribe: Arc<SubscribeFn<T>>,
    handle: Arc<HandleFn<T, A>>,
    dispatch: Arc<DispatchFn<A>>,
    runtime: R,
}

impl<T, A, R> StoreView<T, A, R>
where
    T: Send + 'static,
    A: Send + 'static,
    R: Runtime,
{
    /// A view over any store.
    ///
    /// Subscriptions of the view are mapped by a stage on `runtime`.
    pub fn over<S, E, U, MS, ME>(store: U, map_state: MS, map_event: ME, runtime: &R) -> Self
    where
        S: Send + 'static,
        E: Send + 'static,
        U: Store<S, E> + Clone + 'static,
        MS: Fn(&S) -> T + Send + Sync + 'static,
        ME: Fn(A) -> E + Send + Sync + 'static,
    {
        let map_state = Arc::new(map_state);
        let map_event = Arc::new(map_event);

        let get = {
            let store = store.clone();
            let map_state = Arc::clone(&map_state);
            Arc::new(move || map_state(&store.get())) as Arc<GetFn<T>>
        };

        let subscribe = {
            let store = store.clone();
            let map_state = Arc::clone(&map_state);
            let runtime = runtime.clone();
            Arc::new(move || {
                let map_state = Arc::clone(&map_state);
                let states = store.subscribe()?;
                Ok(states.map_with_runtime(move |state| map_state(&state), &runtime))
            }) as Arc<SubscribeFn<T>>
        };

        let handle = {
            let store = store.clone();
            let map_state = Arc::clone(&map_state);
            let map_event = Arc::clone(&map_event);
            Arc::new(move |action: A| {
                let store = store.clone();
                let map_state = Arc::clone(&map_state);
                let event = map_event(action);
                async move {
                    let state = store.handle(event).await?;
                    Ok(map_state(&state))
                }
                .boxed()
            }) as Arc<HandleFn<T, A>>
        };

        let dispatch = Arc::new(move |action: A| store.dispatch(map_event(action))) as Arc<DispatchFn<A>>;

        Self {
            get,
            subscribe,
            handle,
            dispatch,
            runtime: runtime.clone(),
        }
    }

    /// A view of this view.
    pub fn view<T2, A2, MS, ME>(&self, map_state: MS, map_event: ME) -> StoreView<T2, A2, R>
    where
        T2: Send + 'static,
        A2: Send + 'static,
        MS: Fn(&T) -> T2 + Send + Sync + 'static,
        ME: Fn(A2) -> A + Send + Sync + 'static,
    {
        StoreView::over(self.clone(), map_state, map_event, &self.runtime)
    }

    /// The current state, mapped.
    pub fn get(&self) -> T {
        (self.get)()
    }

    /// The mapped states of the underlying store.
    ///
    /// # Errors
    ///
    /// Fails once the underlying store is closed or failed.
    pub fn subscribe(&self) -> Result<Receiver<T>> {
        (self.subscribe)()
    }

    /// Maps `action`, applies it to the underlying store and returns the
    /// resulting state, mapped.
    ///
    /// # Errors
    ///
    /// Returns the failure of the underlying transition.
    pub async fn handle(&self, action: A) -> Result<T> {
        (self.handle)(action).await
    }

    /// Maps `action` and dispatches it to the underlying store.
    ///
    /// # Errors
    ///
    /// Fails once the underlying store is closed or failed.
    pub fn dispatch(&self, action: A) -> Result<()> {
        (self.dispatch)(action)
    }
}

#[async_trait]
impl<T, A, R> Store<T, A> for StoreView<T, A, R>
where
    T: Send + 'static,
    A: Send + 'static,
    R: Runtime,
{
    fn get(&self) -> T {
        StoreView::get(self)
    }

    fn subscribe(&self) -> Result<Receiver<T>> {
        StoreView::subscribe(self)
    }

    async fn handle(&self, action: A) -> Result<T> {
        StoreView::handle(self, action).await
    }

    fn dispatch(&self, action: A) -> Result<()> {
        StoreView::dispatch(self, action)
    }
}

impl<T, A, R: Clone> Clone for StoreView<T, A, R> {
    fn clone(&self) -> Self {
        Self {
            get: Arc::clone(&self.get),
            subscribe: Arc::clone(&self.subscribe),
            handle: Arc::clone(&self.handle),
            dispatch: Arc::clone(&self.dispatch),
            runtime: self.runtime.clone(),
        }
    }
}

impl<T, A, R: core::fmt::Debug> core::fmt::Debug for StoreView<T, A, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StoreView")
            .field("runtime", &self.runtime)
            .finish_non_exhaustive()
    }
}
