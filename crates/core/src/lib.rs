// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tend-core: Core library for the tend feeding-schedule engine
//!
//! This crate provides:
//! - The feeding-schedule domain model and its validated recurrence view
//! - Pure next-occurrence computation (no I/O, caller-injected clock)
//! - Adapter traits for the schedule store and notification inbox
//! - Clock and id-generation abstractions for testable wiring

pub mod clock;
pub mod id;

pub mod recurrence;
pub mod schedule;
pub mod store;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use id::{AnimalId, IdGen, NotificationId, OwnerId, ScheduleId, SequentialIdGen, UuidIdGen};
pub use recurrence::{compute_next, compute_next_utc, fallback_next};
pub use schedule::{ConfigError, DayOfWeek, FeedingSchedule, Frequency, Recurrence};
pub use store::{
    Animal, DueSchedule, Notification, NotificationSink, ScheduleStore, SinkError, StoreError,
};
