// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::config::{ErrorPolicy, StoreConfig};
use crate::store::Store;
use crate::view::StoreView;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use sluice_core::{channel, Capacity, Receiver, Result, Sender, SluiceError, Subject};
use sluice_runtime::{DefaultRuntime, Runtime, StageTask};
use std::sync::{Arc, Weak};

type Reducer<S, E> = dyn Fn(&S, E) -> Result<S> + Send + Sync;

/// Queue of dispatched events and the task draining it.
struct Dispatcher<E> {
    queue: Sender<E>,
    _task: StageTask,
}

struct StoreInner<S, E, R> {
    reducer: Box<Reducer<S, E>>,
    // Held for the whole transition, publication included.
    transition: futures::lock::Mutex<()>,
    current: RwLock<S>,
    states: Subject<S>,
    errors: Subject<SluiceError>,
    failure: Mutex<Option<SluiceError>>,
    error_policy: ErrorPolicy,
    dispatcher: Mutex<Option<Dispatcher<E>>>,
    runtime: R,
}

impl<S, E, R> StoreInner<S, E, R>
where
    S: Clone + PartialEq + Send + Sync + 'static,
    E: Send + 'static,
    R: Runtime,
{
    fn check_open(&self) -> Result<()> {
        if let Some(error) = self.failure.lock().clone() {
            return Err(error);
        }
        if self.states.is_closed() {
            return Err(SluiceError::channel_closed("store closed"));
        }
        Ok(())
    }

    async fn apply(&self, event: E) -> Result<S> {
        let _transition = self.transition.lock().await;
        self.check_open()?;

        let next = {
            let current = self.current.read();
            (self.reducer)(&current, event)?
        };

        let changed = *self.current.read() != next;
        if changed {
            // Commit only once published.
            self.states.next(next.clone()).await?;
            *self.current.write() = next.clone();
            trace!("store state changed");
        }
        Ok(next)
    }

    async fn apply_dispatched(&self, event: E) {
        let Err(error) = self.apply(event).await else {
            return;
        };
        if self.check_open().is_err() {
            return;
        }

        match &self.error_policy {
            ErrorPolicy::Log => error!("store dispatch failed: {}", error),
            ErrorPolicy::Handler(handler) => handler(&error),
            ErrorPolicy::ErrorStream => {
                if self.errors.next(error).await.is_err() {
                    debug!("store error stream closed, dispatch failure dropped");
                }
            }
            ErrorPolicy::FailStore => {
                warn!("store failed by dispatched event: {}", error);
                let _transition = self.transition.lock().await;
                *self.failure.lock() = Some(error.clone());
                self.states.error(error.clone());
                self.errors.error(error);
                self.dispatcher.lock().take();
            }
        }
    }

    fn close(&self) -> bool {
        let closed = self.states.close();
        self.errors.close();
        self.dispatcher.lock().take();
        closed
    }
}

impl<S, E, R> Drop for StoreInner<S, E, R> {
    fn drop(&mut self) {
        self.states.close();
        self.errors.close();
    }
}

impl<E: Send + 'static> Dispatcher<E> {
    fn start<S, R>(store: Weak<StoreInner<S, E, R>>, runtime: &R) -> Self
    where
        S: Clone + PartialEq + Send + Sync + 'static,
        R: Runtime,
    {
        let (queue, events) = channel(Capacity::Unbounded);

        let task = StageTask::spawn(runtime, move |_| async move {
            while let Ok(Some(event)) = events.recv().await {
                let Some(store) = store.upgrade() else {
                    break;
                };
                store.apply_dispatched(event).await;
            }
            trace!("store dispatcher stopped");
        });

        Self { queue, _task: task }
    }
}

/// Reactive store holding one value changed by a reducer.
///
/// Cloning a store yields another handle on the same state. Once the last
/// handle is dropped, every subscription completes normally and queued
/// events are discarded.
pub struct StateStore<S, E, R = DefaultRuntime> {
    inner: Arc<StoreInner<S, E, R>>,
}

impl<S, E> StateStore<S, E, DefaultRuntime>
where
    S: Clone + PartialEq + Send + Sync + 'static,
    E: Send + 'static,
{
    /// Creates a store with the default configuration on the default runtime.
    pub fn new<F>(initial: S, reducer: F) -> Self
    where
        F: Fn(&S, E) -> Result<S> + Send + Sync + 'static,
    {
        Self::with_config(initial, reducer, StoreConfig::default())
    }

    /// Creates a store with `config` on the default runtime.
    pub fn with_config<F>(initial: S, reducer: F, config: StoreConfig) -> Self
    where
        F: Fn(&S, E) -> Result<S> + Send + Sync + 'static,
    {
        Self::with_runtime(initial, reducer, config, &DefaultRuntime::default())
    }
}

impl<S, E, R> StateStore<S, E, R>
where
    S: Clone + PartialEq + Send + Sync + 'static,
    E: Send + 'static,
    R: Runtime,
{
    /// Creates a store whose dispatcher runs on `runtime`.
    pub fn with_runtime<F>(initial: S, reducer: F, config: StoreConfig, runtime: &R) -> Self
    where
        F: Fn(&S, E) -> Result<S> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(StoreInner {
                reducer: Box::new(reducer),
                transition: futures::lock::Mutex::new(()),
                states: Subject::replaying(initial.clone(), config.subscriber_capacity),
                current: RwLock::new(initial),
                errors: Subject::new(Capacity::Unbounded),
                failure: Mutex::new(None),
                error_policy: config.error_policy,
                dispatcher: Mutex::new(None),
                runtime: runtime.clone(),
            }),
        }
    }

    /// The current state.
    pub fn get(&self) -> S {
        self.inner.current.read().clone()
    }

    /// A stream starting with the current state, followed by every change.
    ///
    /// # Errors
    ///
    /// Fails once the store is closed or failed.
    pub fn subscribe(&self) -> Result<Receiver<S>> {
        self.inner.check_open()?;
        self.inner.states.subscribe()
    }

    /// Failures of dispatched events, published under
    /// [`ErrorPolicy::ErrorStream`].
    ///
    /// # Errors
    ///
    /// Fails once the store is closed or failed.
    pub fn errors(&self) -> Result<Receiver<SluiceError>> {
        self.inner.check_open()?;
        self.inner.errors.subscribe()
    }

    /// Applies `event` and returns the resulting state.
    ///
    /// Waits for every transition started before it. Subscribers see the
    /// new state before this returns, unless it equals the previous one.
    ///
    /// # Errors
    ///
    /// Returns the reducer's failure, leaving the state unchanged, or the
    /// store's failure once it is closed or failed.
    pub async fn handle(&self, event: E) -> Result<S> {
        self.inner.apply(event).await
    }

    /// Queues `event` for the background dispatcher and returns at once.
    ///
    /// Dispatched events are applied in the order they were dispatched. The
    /// dispatcher is started by the first call.
    ///
    /// # Errors
    ///
    /// Fails once the store is closed or failed.
    pub fn dispatch(&self, event: E) -> Result<()> {
        self.inner.check_open()?;

        let mut dispatcher = self.inner.dispatcher.lock();
        let dispatcher = dispatcher.get_or_insert_with(|| {
            debug!("store dispatcher started");
            Dispatcher::start(Arc::downgrade(&self.inner), &self.inner.runtime)
        });
        dispatcher.queue.try_send(event).map(|_| ())
    }

    /// Completes every subscription and rejects later events.
    ///
    /// Returns `false` if the store was already closed or failed.
    pub fn close(&self) -> bool {
        self.inner.close()
    }

    /// Returns `true` once the store was closed or failed.
    pub fn is_closed(&self) -> bool {
        self.inner.check_open().is_err()
    }

    /// A projection of this store.
    ///
    /// `map_state` derives the view's state from the store's state and
    /// `map_event` turns view events into store events.
    pub fn view<T, A, MS, ME>(&self, map_state: MS, map_event: ME) -> StoreView<T, A, R>
    where
        T: Send + 'static,
        A: Send + 'static,
        MS: Fn(&S) -> T + Send + Sync + 'static,
        ME: Fn(A) -> E + Send + Sync + 'static,
    {
        StoreView::over(self.clone(), map_state, map_event, &self.inner.runtime)
    }
}

#[async_trait]
impl<S, E, R> Store<S, E> for StateStore<S, E, R>
where
    S: Clone + PartialEq + Send + Sync + 'static,
    E: Send + 'static,
    R: Runtime,
{
    fn get(&self) -> S {
        StateStore::get(self)
    }

    fn subscribe(&self) -> Result<Receiver<S>> {
        StateStore::subscribe(self)
    }

    async fn handle(&self, event: E) -> Result<S> {
        StateStore::handle(self, event).await
    }

    fn dispatch(&self, event: E) -> Result<()> {
        StateStore::dispatch(self, event)
    }
}

impl<S, E, R> Clone for StateStore<S, E, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: core::fmt::Debug, E, R> core::fmt::Debug for StateStore<S, E, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StateStore")
            .field("current", &*self.inner.current.read())
            .field("error_policy", &self.inner.error_policy)
            .finish()
    }
}
