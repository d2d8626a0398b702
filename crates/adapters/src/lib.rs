// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters implementing the engine's collaborator traits
//!
//! The in-memory store and sink serve an embedding application until a real
//! database adapter exists, and double as the recording fakes every test
//! uses. The traced wrappers add observability around any implementation.

pub mod memory;
pub mod traced;

pub use memory::{MemoryNotificationSink, MemoryScheduleStore, SinkCall, StoreCall};
pub use traced::{TracedNotificationSink, TracedScheduleStore};
