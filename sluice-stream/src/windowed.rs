// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Count-based windows.
//!
//! [`windowed`](WindowedExt::windowed) emits a window every time `size` items
//! have accumulated. The next window then starts `step` items after the
//! start of the previous one: with `step < size` the trailing `size - step`
//! items are kept, with `step > size` the next `step - size` items are
//! skipped.
//!
//! When the source completes and `partial_windows` is set, the leftover
//! items are windowed again with the same step, emitting shorter windows
//! until nothing is left.
//!
//! # Example
//!
//! ```
//! use sluice_core::{channel, Capacity};
//! use sluice_stream::WindowedExt;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (tx, rx) = channel::<i32>(Capacity::Unbounded);
//! let windows = rx.windowed(3, 2, true);
//!
//! for i in 1..=6 {
//!     tx.send(i).await.unwrap();
//! }
//! tx.close();
//!
//! assert_eq!(
//!     windows.to_vec().await.unwrap(),
//!     vec![vec![1, 2, 3], vec![3, 4, 5], vec![5, 6]]
//! );
//! # }
//! ```
//!
//! # Error Handling
//!
//! A source failure discards the current window and fails the output.

use crate::transform::transform;
use sluice_core::{Capacity, Receiver};
use sluice_runtime::{DefaultRuntime, Runtime};

/// Extension trait providing the [`windowed`](Self::windowed) and
/// [`chunked`](Self::chunked) operators.
pub trait WindowedExt<T>: Sized {
    /// Emits windows of `size` items, starting a new window every `step` items.
    ///
    /// # Panics
    ///
    /// Panics if `size` or `step` is 0.
    fn windowed_with_runtime<R: Runtime>(
        self,
        size: usize,
        step: usize,
        partial_windows: bool,
        runtime: &R,
    ) -> Receiver<Vec<T>>;

    /// [`windowed_with_runtime`](Self::windowed_with_runtime) on the default runtime.
    fn windowed(self, size: usize, step: usize, partial_windows: bool) -> Receiver<Vec<T>> {
        self.windowed_with_runtime(size, step, partial_windows, &DefaultRuntime::default())
    }

    /// Splits the stream into consecutive chunks of `size` items; the last
    /// chunk may be shorter.
    fn chunked_with_runtime<R: Runtime>(self, size: usize, runtime: &R) -> Receiver<Vec<T>> {
        self.windowed_with_runtime(size, size, true, runtime)
    }

    /// [`chunked_with_runtime`](Self::chunked_with_runtime) on the default runtime.
    fn chunked(self, size: usize) -> Receiver<Vec<T>> {
        self.chunked_with_runtime(size, &DefaultRuntime::default())
    }
}

impl<T: Clone + Send + 'static> WindowedExt<T> for Receiver<T> {
    fn windowed_with_runtime<R: Runtime>(
        self,
        size: usize,
        step: usize,
        partial_windows: bool,
        runtime: &R,
    ) -> Receiver<Vec<T>> {
        assert!(size >= 1, "windowed: size must be at least 1");
        assert!(step >= 1, "windowed: step must be at least 1");

        transform(self, Capacity::default(), runtime, move |source, output| async move {
            let mut window = Vec::with_capacity(size);
            let mut skip = 0usize;

            while let Some(item) = source.recv().await? {
                if skip > 0 {
                    skip -= 1;
                    continue;
                }
                window.push(item);
                if window.len() == size {
                    output.send(window.clone()).await?;
                    if step < size {
                        window.drain(..step);
                    } else {
                        window.clear();
                        skip = step - size;
                    }
                }
            }

            if partial_windows {
                while !window.is_empty() {
                    let end = window.len().min(size);
                    output.send(window[..end].to_vec()).await?;
                    if step >= window.len() {
                        break;
                    }
                    window.drain(..step);
                }
            }
            Ok(())
        })
    }
}
