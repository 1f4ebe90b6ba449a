// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Cancellable stream operators.
//!
//! Every operator runs as a *stage*: a task owning exactly one output
//! [`Receiver`](sluice_core::Receiver). Stages are built with
//! [`transform`], which ties the output's lifetime to the body and to the
//! sources:
//!
//! - completion and failures travel downstream, from a source to every
//!   stream derived from it;
//! - cancellation travels upstream: cancelling or dropping an output cancels
//!   the sources of its stage, transitively.
//!
//! # Operators
//!
//! | Trait | Operators |
//! |-------|-----------|
//! | [`MergeExt`] | `merge_with` (see also [`merge()`]) |
//! | [`CombineLatestExt`] | `combine_latest_with`, `combine_latest` |
//! | [`SwitchMapExt`] | `switch_map` |
//! | [`WindowedExt`] | `windowed`, `chunked` |
//! | [`BufferExt`] | `buffer`, `conflate` |
//! | [`ScanExt`] | `scan`, `scan_reduce` |
//! | [`ParallelExt`] | `parallel`, `parallel_map`, `parallel_filter` |
//! | [`MapExt`], [`FilterExt`], [`TakeExt`] | `map`, `filter_map`, `filter`, `filter_cast`, `take` |
//! | [`TransformExt`] | `transform` |
//!
//! Each operator has a `*_with_runtime` variant taking the execution context
//! explicitly; the plain variant uses
//! [`DefaultRuntime`](sluice_runtime::DefaultRuntime).
//!
//! # Example
//!
//! ```
//! use sluice_core::{channel, Capacity};
//! use sluice_stream::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (tx, rx) = channel::<i32>(Capacity::Unbounded);
//!
//! let evens = rx.filter(|x| x % 2 == 0).scan(0, |acc, x| acc + x);
//!
//! for i in 1..=4 {
//!     tx.send(i).await.unwrap();
//! }
//! tx.close();
//!
//! assert_eq!(evens.to_vec().await.unwrap(), vec![0, 2, 6]);
//! # }
//! ```

#![allow(clippy::multiple_crate_versions, clippy::doc_markdown)]

#[macro_use]
#[allow(unused_macros)]
mod logging;

pub mod buffer;
pub mod combine_latest;
pub mod filter;
pub mod from_stream;
pub mod map;
pub mod merge;
pub mod parallel;
pub mod prelude;
pub mod scan;
pub mod switch_map;
pub mod take;
pub mod transform;
pub mod windowed;

pub use self::buffer::BufferExt;
pub use self::combine_latest::{CombineLatestExt, CombinedState};
pub use self::filter::FilterExt;
pub use self::from_stream::{from_stream, from_try_stream, IntoReceiverExt};
pub use self::map::MapExt;
pub use self::merge::{merge, MergeExt};
pub use self::parallel::ParallelExt;
pub use self::scan::ScanExt;
pub use self::switch_map::SwitchMapExt;
pub use self::take::TakeExt;
pub use self::transform::{pipe, produce, transform, transform_all, TransformExt};
pub use self::windowed::WindowedExt;
