// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

#[macro_use]
#[allow(unused_macros)]
mod logging;

pub mod cancellation_token;
pub mod channel;
pub mod error;
pub mod stream_item;
pub mod subject;

pub use self::cancellation_token::{CancellationToken, Cancelled};
pub use self::channel::{
    channel, CancelHandle, Capacity, Receiver, ReceiverStream, Sender, Termination,
};
pub use self::error::{IntoSluiceError, Result, ResultExt, SluiceError};
pub use self::stream_item::StreamItem;
pub use self::subject::Subject;
