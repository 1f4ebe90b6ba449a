// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Streams that fail on purpose.

use crate::test_channel::test_channel;
use sluice_core::{Receiver, SluiceError};

/// Error type raised by test callbacks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("test error: {0}")]
pub struct TestError(pub String);

/// A `SluiceError` wrapping a [`TestError`] with the given message.
pub fn test_error(message: &str) -> SluiceError {
    SluiceError::user_error(TestError(message.to_string()))
}

/// A stream delivering `values`, then failing with `error`.
///
/// ```rust
/// use sluice_test_utils::{failing_after, test_error};
///
/// # #[tokio::main]
/// # async fn main() {
/// let stream = failing_after(vec![1, 2], test_error("boom"));
///
/// assert_eq!(stream.recv().await.unwrap(), Some(1));
/// assert_eq!(stream.recv().await.unwrap(), Some(2));
/// assert!(stream.recv().await.is_err());
/// # }
/// ```
pub fn failing_after<T>(values: impl IntoIterator<Item = T>, error: SluiceError) -> Receiver<T> {
    let (tx, rx) = test_channel();
    for value in values {
        let _ = tx.try_send(value);
    }
    tx.close_with_error(error);
    rx
}
