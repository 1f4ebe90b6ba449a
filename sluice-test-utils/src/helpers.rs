// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use sluice_core::{Receiver, StreamItem};
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Panics if `stream` delivers anything within `timeout_ms`.
pub async fn assert_no_element_emitted<T>(stream: &Receiver<T>, timeout_ms: u64) {
    tokio::select! {
        received = stream.recv() => {
            match received {
                Ok(Some(_)) => panic!("Unexpected element emitted, expected no output."),
                Ok(None) => panic!("Stream completed, expected it to stay open."),
                Err(e) => panic!("Stream failed with {e}, expected it to stay open."),
            }
        }
        () = sleep(Duration::from_millis(timeout_ms)) => {}
    }
}

/// Panics unless `stream` completes normally, without further items,
/// within `timeout_ms`.
pub async fn assert_stream_ended<T>(stream: &Receiver<T>, timeout_ms: u64) {
    match timeout(Duration::from_millis(timeout_ms), stream.recv()).await {
        Ok(Ok(None)) => {}
        Ok(Ok(Some(_))) => panic!("Expected stream to end, but it emitted an element."),
        Ok(Err(e)) => panic!("Expected stream to end, but it failed with {e}."),
        Err(_) => panic!("Expected stream to end within {timeout_ms}ms."),
    }
}

/// Receives the next item, panicking on completion, failure or timeout.
pub async fn recv_timeout<T>(stream: &Receiver<T>, timeout_ms: u64) -> T {
    match timeout(Duration::from_millis(timeout_ms), stream.recv()).await {
        Ok(Ok(Some(item))) => item,
        Ok(Ok(None)) => panic!("Expected an element, but the stream completed."),
        Ok(Err(e)) => panic!("Expected an element, but the stream failed with {e}."),
        Err(_) => panic!("Expected an element within {timeout_ms}ms."),
    }
}

/// Unwraps an item of the `futures::Stream` view of a channel.
pub fn unwrap_value<T>(item: Option<StreamItem<T>>) -> T {
    match item {
        Some(StreamItem::Value(value)) => value,
        Some(StreamItem::Error(e)) => panic!("Expected a value, got error {e}."),
        None => panic!("Expected a value, but the stream ended."),
    }
}
