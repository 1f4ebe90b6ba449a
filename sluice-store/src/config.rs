// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use core::fmt;
use sluice_core::{Capacity, SluiceError};
use std::sync::Arc;

/// Callback receiving the failures of dispatched events.
pub type ErrorHandler = Arc<dyn Fn(&SluiceError) + Send + Sync>;

/// What a store does when an event queued with `dispatch` fails.
///
/// Only dispatched events go through the policy: `handle` returns the
/// failure to its caller.
#[derive(Clone, Default)]
pub enum ErrorPolicy {
    /// Log the failure and keep the previous state.
    #[default]
    Log,
    /// Pass the failure to a callback and keep the previous state.
    Handler(ErrorHandler),
    /// Publish the failure on the store's error stream and keep the
    /// previous state.
    ErrorStream,
    /// Fail every subscriber with the error and reject later transitions.
    FailStore,
}

impl ErrorPolicy {
    /// [`ErrorPolicy::Handler`] from a closure.
    pub fn handler<F>(handler: F) -> Self
    where
        F: Fn(&SluiceError) + Send + Sync + 'static,
    {
        Self::Handler(Arc::new(handler))
    }
}

impl fmt::Debug for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Log => f.write_str("Log"),
            Self::Handler(_) => f.write_str("Handler(..)"),
            Self::ErrorStream => f.write_str("ErrorStream"),
            Self::FailStore => f.write_str("FailStore"),
        }
    }
}

/// Run-time settings of a store.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Handling of failed dispatched events.
    pub error_policy: ErrorPolicy,
    /// Capacity of each subscriber's channel.
    ///
    /// A full bounded subscriber holds back every later transition.
    pub subscriber_capacity: Capacity,
}

impl StoreConfig {
    #[must_use]
    pub fn with_error_policy(mut self, error_policy: ErrorPolicy) -> Self {
        self.error_policy = error_policy;
        self
    }

    #[must_use]
    pub fn with_subscriber_capacity(mut self, subscriber_capacity: Capacity) -> Self {
        self.subscriber_capacity = subscriber_capacity;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicy::default(),
            subscriber_capacity: Capacity::Unbounded,
        }
    }
}
