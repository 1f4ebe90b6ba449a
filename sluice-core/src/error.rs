// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Error types for sluice stream operators
//!
//! Every failure that crosses a stage boundary is a [`SluiceError`]. Because a
//! single upstream failure has to reach every derived consumer, and is reused as
//! the cancellation cause of sibling sources in fan-in operators, the error is
//! cheaply cloneable: user errors are held behind an `Arc` instead of a `Box`.
//!
//! # Examples
//!
//! ```
//! use sluice_core::{SluiceError, Result};
//!
//! fn process_data() -> Result<()> {
//!     Err(SluiceError::stream_error("Stream not ready"))
//! }
//!
//! let err = process_data().unwrap_err();
//! assert_eq!(err.to_string(), "Stream processing error: Stream not ready");
//! ```

use std::error::Error;
use std::sync::Arc;

/// Root error type for all sluice operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum SluiceError {
    /// Stream processing encountered an error
    ///
    /// General failure of a stage body that does not fit another category.
    #[error("Stream processing error: {context}")]
    StreamProcessingError {
        /// Description of what went wrong during stream processing
        context: String,
    },

    /// Custom error from user code
    ///
    /// Wraps errors produced by user-provided functions and callbacks.
    #[error("User error: {0}")]
    UserError(#[source] Arc<dyn Error + Send + Sync>),

    /// Multiple errors occurred
    ///
    /// Produced by terminal consumers that aggregate handler failures.
    #[error("Multiple errors occurred: {count} errors")]
    MultipleErrors {
        /// Number of errors that occurred
        count: usize,
        /// The individual errors
        errors: Vec<SluiceError>,
    },

    /// The stream was cancelled by its consumer or by a failing sibling
    #[error("Stream cancelled: {context}")]
    Cancelled {
        /// Why the stream was cancelled
        context: String,
    },

    /// A send was attempted on a channel that is already closed
    #[error("Channel closed: {context}")]
    ChannelClosed {
        /// Which channel, or why it was closed
        context: String,
    },

    /// A state reducer rejected a transition
    #[error("Reducer error: {context}")]
    ReducerError {
        /// Description of the rejected transition
        context: String,
    },
}

impl SluiceError {
    /// Create a stream processing error with the given context
    pub fn stream_error(context: impl Into<String>) -> Self {
        Self::StreamProcessingError {
            context: context.into(),
        }
    }

    /// Create a cancellation error with the given context
    pub fn cancelled(context: impl Into<String>) -> Self {
        Self::Cancelled {
            context: context.into(),
        }
    }

    /// Create a closed-channel error with the given context
    pub fn channel_closed(context: impl Into<String>) -> Self {
        Self::ChannelClosed {
            context: context.into(),
        }
    }

    /// Create a reducer error with the given context
    pub fn reducer_error(context: impl Into<String>) -> Self {
        Self::ReducerError {
            context: context.into(),
        }
    }

    /// Wrap a user error
    pub fn user_error(error: impl Error + Send + Sync + 'static) -> Self {
        Self::UserError(Arc::new(error))
    }

    /// Aggregate multiple user errors into a `MultipleErrors` variant
    ///
    /// # Examples
    ///
    /// ```
    /// use sluice_core::SluiceError;
    ///
    /// #[derive(Debug, thiserror::Error)]
    /// #[error("Custom error: {msg}")]
    /// struct CustomError {
    ///     msg: String,
    /// }
    ///
    /// let errors = vec![
    ///     CustomError { msg: "first".to_string() },
    ///     CustomError { msg: "second".to_string() },
    /// ];
    ///
    /// let result = SluiceError::from_user_errors(errors);
    /// assert!(matches!(result, SluiceError::MultipleErrors { count: 2, .. }));
    /// ```
    pub fn from_user_errors<E>(errors: Vec<E>) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        let count = errors.len();
        let errors = errors.into_iter().map(Self::user_error).collect();

        Self::MultipleErrors { count, errors }
    }

    /// Returns `true` if this error only records a cancellation.
    ///
    /// Cancellations travel backwards from consumers to producers and are not
    /// failures of the data itself.
    #[must_use]
    pub const fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Check if this error indicates a permanent failure
    ///
    /// User errors and stream processing errors are considered permanent.
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::StreamProcessingError { .. } | Self::UserError(_) | Self::ReducerError { .. }
        )
    }
}

/// Specialized Result type for sluice operations
pub type Result<T> = std::result::Result<T, SluiceError>;

/// Extension trait for converting errors into `SluiceError`
///
/// Implemented for all `std::error::Error + Send + Sync + 'static` types.
pub trait IntoSluiceError {
    /// Convert this error into a `SluiceError` with additional context
    fn into_sluice_error(self, context: &str) -> SluiceError;

    /// Convert this error into a `SluiceError` without additional context
    fn into_sluice(self) -> SluiceError
    where
        Self: Sized,
    {
        self.into_sluice_error("")
    }
}

impl<E: Error + Send + Sync + 'static> IntoSluiceError for E {
    fn into_sluice_error(self, context: &str) -> SluiceError {
        if context.is_empty() {
            SluiceError::user_error(self)
        } else {
            SluiceError::stream_error(format!("{context}: {self}"))
        }
    }
}

/// Helper trait for adding context to `Result`s
pub trait ResultExt<T> {
    /// Add context to an error
    ///
    /// # Errors
    /// Returns `Err(SluiceError)` if the underlying result is `Err`.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context to an error using a closure (lazy evaluation)
    ///
    /// # Errors
    /// Returns `Err(SluiceError)` if the underlying result is `Err`.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<SluiceError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.with_context(|| context.into())
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| match e.into() {
            SluiceError::UserError(inner) => SluiceError::StreamProcessingError {
                context: format!("{}: {inner}", f()),
            },
            other => other,
        })
    }
}
