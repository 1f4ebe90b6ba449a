// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use sluice_core::{channel, Capacity, Receiver, Sender};

/// Unbounded channel for imperative test setup.
pub fn test_channel<T>() -> (Sender<T>, Receiver<T>) {
    channel(Capacity::Unbounded)
}

/// A completed stream holding `values`.
pub fn channel_of<T>(values: impl IntoIterator<Item = T>) -> Receiver<T> {
    let (tx, rx) = test_channel();
    for value in values {
        // An unbounded channel that nobody cancelled accepts every item.
        let _ = tx.try_send(value);
    }
    tx.close();
    rx
}
