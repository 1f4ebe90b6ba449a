// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Filtering operators.
//!
//! [`filter_cast`](FilterExt::filter_cast) narrows a stream to the items that
//! convert into a target type. The caller states the capability through a
//! `TryInto` implementation instead of the operator inspecting types at run
//! time:
//!
//! ```
//! use sluice_core::{channel, Capacity};
//! use sluice_stream::FilterExt;
//!
//! #[derive(Debug)]
//! enum Shape {
//!     Circle(f64),
//!     Square(f64),
//! }
//!
//! #[derive(Debug, PartialEq)]
//! struct Circle(f64);
//!
//! impl TryFrom<Shape> for Circle {
//!     type Error = Shape;
//!
//!     fn try_from(shape: Shape) -> Result<Self, Shape> {
//!         match shape {
//!             Shape::Circle(r) => Ok(Circle(r)),
//!             other => Err(other),
//!         }
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (tx, rx) = channel::<Shape>(Capacity::Unbounded);
//! let circles = rx.filter_cast::<Circle>();
//!
//! tx.send(Shape::Square(2.0)).await.unwrap();
//! tx.send(Shape::Circle(1.0)).await.unwrap();
//! tx.close();
//!
//! assert_eq!(circles.to_vec().await.unwrap(), vec![Circle(1.0)]);
//! # }
//! ```

use crate::map::MapExt;
use crate::transform::transform;
use sluice_core::{Capacity, Receiver};
use sluice_runtime::{DefaultRuntime, Runtime};

/// Extension trait providing the [`filter`](Self::filter) and
/// [`filter_cast`](Self::filter_cast) operators.
pub trait FilterExt<T>: Sized {
    /// Keeps the items matching `predicate`.
    fn filter_with_runtime<F, R>(self, predicate: F, runtime: &R) -> Receiver<T>
    where
        F: FnMut(&T) -> bool + Send + 'static,
        R: Runtime;

    /// Keeps the items that convert into `U`, converted.
    fn filter_cast_with_runtime<U, R>(self, runtime: &R) -> Receiver<U>
    where
        T: TryInto<U>,
        U: Send + 'static,
        R: Runtime;

    /// [`filter_with_runtime`](Self::filter_with_runtime) on the default runtime.
    fn filter<F>(self, predicate: F) -> Receiver<T>
    where
        F: FnMut(&T) -> bool + Send + 'static,
    {
        self.filter_with_runtime(predicate, &DefaultRuntime::default())
    }

    /// [`filter_cast_with_runtime`](Self::filter_cast_with_runtime) on the default runtime.
    fn filter_cast<U>(self) -> Receiver<U>
    where
        T: TryInto<U>,
        U: Send + 'static,
    {
        self.filter_cast_with_runtime(&DefaultRuntime::default())
    }
}

impl<T: Send + 'static> FilterExt<T> for Receiver<T> {
    fn filter_with_runtime<F, R>(self, mut predicate: F, runtime: &R) -> Receiver<T>
    where
        F: FnMut(&T) -> bool + Send + 'static,
        R: Runtime,
    {
        transform(self, Capacity::default(), runtime, move |source, output| async move {
            while let Some(item) = source.recv().await? {
                if predicate(&item) {
                    output.send(item).await?;
                }
            }
            Ok(())
        })
    }

    fn filter_cast_with_runtime<U, R>(self, runtime: &R) -> Receiver<U>
    where
        T: TryInto<U>,
        U: Send + 'static,
        R: Runtime,
    {
        self.filter_map_with_runtime(|item: T| item.try_into().ok(), runtime)
    }
}
