// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Every operator extension trait, for glob import.
//!
//! ```
//! use sluice_stream::prelude::*;
//! ```

pub use crate::buffer::BufferExt;
pub use crate::combine_latest::{CombineLatestExt, CombinedState};
pub use crate::filter::FilterExt;
pub use crate::from_stream::IntoReceiverExt;
pub use crate::map::MapExt;
pub use crate::merge::MergeExt;
pub use crate::parallel::ParallelExt;
pub use crate::scan::ScanExt;
pub use crate::switch_map::SwitchMapExt;
pub use crate::take::TakeExt;
pub use crate::transform::TransformExt;
pub use crate::windowed::WindowedExt;
