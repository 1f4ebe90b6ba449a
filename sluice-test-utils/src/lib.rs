// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Test utilities and fixtures for the sluice workspace.
//!
//! Designed for tests and benchmarks only.
//!
//! # Channels
//!
//! [`test_channel`] is an unbounded channel whose sender never suspends, so
//! a test can push items synchronously with `try_send`. [`channel_of`]
//! returns a stream that already holds some items and is completed;
//! [`failing_after`] one that fails after its items.
//!
//! # Fixtures
//!
//! [`TestData`] mixes [`Person`] and [`Animal`] records; the conversions from
//! `TestData` into each record type make it a natural input for
//! `filter_cast`:
//!
//! ```rust
//! use sluice_test_utils::{person_alice, Person, TestData};
//!
//! let alice: Result<Person, TestData> = person_alice().try_into();
//! assert_eq!(alice.unwrap().name, "Alice");
//! ```
//!
//! # Assertions
//!
//! [`assert_no_element_emitted`], [`assert_stream_ended`] and
//! [`recv_timeout`] bound every wait with a timeout so a broken operator
//! fails the test instead of hanging it.

pub mod error_injection;
pub mod helpers;
pub mod test_channel;
pub mod test_data;

pub use self::error_injection::{failing_after, test_error, TestError};
pub use self::helpers::{
    assert_no_element_emitted, assert_stream_ended, recv_timeout, unwrap_value,
};
pub use self::test_channel::{channel_of, test_channel};
pub use self::test_data::{
    animal_dog, animal_spider, person_alice, person_bob, person_charlie, Animal, Person, TestData,
};
