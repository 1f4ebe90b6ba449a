// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Bridges from `futures::Stream` into the operator engine.
//!
//! The way out is [`Receiver::into_stream`](sluice_core::Receiver::into_stream).

use crate::transform::produce;
use futures::{Stream, StreamExt, TryStream, TryStreamExt};
use sluice_core::{Capacity, Receiver, SluiceError};
use sluice_runtime::{DefaultRuntime, Runtime};

/// Runs `stream` as a producer stage feeding a new channel.
///
/// Cancelling the returned channel drops `stream`.
pub fn from_stream<S, R>(stream: S, capacity: Capacity, runtime: &R) -> Receiver<S::Item>
where
    S: Stream + Send + 'static,
    S::Item: Send + 'static,
    R: Runtime,
{
    produce(capacity, runtime, |output| async move {
        let mut stream = Box::pin(stream);
        while let Some(item) = stream.next().await {
            output.send(item).await?;
        }
        Ok(())
    })
}

/// Like [`from_stream`], closing the channel with the first error of `stream`.
pub fn from_try_stream<S, R>(stream: S, capacity: Capacity, runtime: &R) -> Receiver<S::Ok>
where
    S: TryStream<Error = SluiceError> + Send + 'static,
    S::Ok: Send + 'static,
    R: Runtime,
{
    produce(capacity, runtime, |output| async move {
        let mut stream = Box::pin(stream.into_stream());
        while let Some(item) = stream.try_next().await? {
            output.send(item).await?;
        }
        Ok(())
    })
}

/// Extension trait turning any `futures::Stream` into a sluice [`Receiver`].
pub trait IntoReceiverExt: Stream + Sized {
    /// [`from_stream`] as a method.
    fn into_receiver_with_runtime<R: Runtime>(self, capacity: Capacity, runtime: &R) -> Receiver<Self::Item>;

    /// [`into_receiver_with_runtime`](Self::into_receiver_with_runtime) on the default runtime.
    fn into_receiver(self, capacity: Capacity) -> Receiver<Self::Item> {
        self.into_receiver_with_runtime(capacity, &DefaultRuntime::default())
    }
}

impl<S> IntoReceiverExt for S
where
    S: Stream + Send + 'static,
    S::Item: Send + 'static,
{
    fn into_receiver_with_runtime<R: Runtime>(self, capacity: Capacity, runtime: &R) -> Receiver<Self::Item> {
        from_stream(self, capacity, runtime)
    }
}
