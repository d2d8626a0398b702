// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory schedule store and notification sink
//!
//! Reference implementations backed by shared state. They record every call
//! and expose injectable failure modes, so they serve both as the default
//! wiring for an embedding application and as the fakes used in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tend_core::{
    Animal, AnimalId, Clock, DueSchedule, FeedingSchedule, IdGen, Notification, NotificationId,
    NotificationSink, OwnerId, ScheduleId, ScheduleStore, SinkError, StoreError,
};

/// Recorded call to the schedule store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    FetchDue { now: DateTime<Utc> },
    Save { id: ScheduleId },
}

/// Recorded call to the notification sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkCall {
    pub owner: OwnerId,
    pub message: String,
}

#[derive(Default)]
struct StoreState {
    animals: HashMap<AnimalId, Animal>,
    schedules: HashMap<ScheduleId, FeedingSchedule>,
    calls: Vec<StoreCall>,
    // Injectable failure modes
    fail_fetches: bool,
    fail_saves: bool,
}

/// In-memory `ScheduleStore` with call recording
#[derive(Clone, Default)]
pub struct MemoryScheduleStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an animal (the subject side of the fetch join)
    pub fn add_animal(&self, animal: Animal) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.animals.insert(animal.id.clone(), animal);
    }

    /// Seed a schedule row without recording a call
    pub fn add_schedule(&self, schedule: FeedingSchedule) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.schedules.insert(schedule.id.clone(), schedule);
    }

    /// Look up a schedule row by id
    pub fn schedule(&self, id: &ScheduleId) -> Option<FeedingSchedule> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.schedules.get(id).cloned()
    }

    /// All schedule rows, in no particular order
    pub fn schedules(&self) -> Vec<FeedingSchedule> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.schedules.values().cloned().collect()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<StoreCall> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.clone()
    }

    /// Make every `fetch_due` fail until cleared
    pub fn set_fail_fetches(&self, fail: bool) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.fail_fetches = fail;
    }

    /// Make every `save` fail until cleared
    pub fn set_fail_saves(&self, fail: bool) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.fail_saves = fail;
    }
}

#[async_trait]
impl ScheduleStore for MemoryScheduleStore {
    async fn fetch_due(&self, now: DateTime<Utc>) -> Result<Vec<DueSchedule>, StoreError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(StoreCall::FetchDue { now });

        if state.fail_fetches {
            return Err(StoreError::Unavailable("injected fetch failure".into()));
        }

        let due = state
            .schedules
            .values()
            .filter(|s| s.next_due <= now)
            // A schedule whose animal row is gone is a cascade-delete
            // artifact; it is skipped, not an error.
            .filter_map(|s| {
                state.animals.get(&s.animal_id).map(|animal| DueSchedule {
                    schedule: s.clone(),
                    subject: animal.clone(),
                })
            })
            .collect();

        Ok(due)
    }

    async fn save(&self, schedule: &FeedingSchedule) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(StoreCall::Save {
            id: schedule.id.clone(),
        });

        if state.fail_saves {
            return Err(StoreError::Unavailable("injected save failure".into()));
        }

        state
            .schedules
            .insert(schedule.id.clone(), schedule.clone());
        Ok(())
    }
}

#[derive(Default)]
struct SinkState {
    notifications: Vec<Notification>,
    calls: Vec<SinkCall>,
    fail_appends: bool,
}

/// In-memory `NotificationSink` with call recording
///
/// The sink owns id generation and timestamping for the records it appends,
/// so production wiring takes `UuidIdGen` + `SystemClock` and tests take
/// their deterministic counterparts.
#[derive(Clone)]
pub struct MemoryNotificationSink<C, G> {
    clock: C,
    ids: G,
    state: Arc<Mutex<SinkState>>,
}

impl<C: Clock, G: IdGen> MemoryNotificationSink<C, G> {
    pub fn new(clock: C, ids: G) -> Self {
        Self {
            clock,
            ids,
            state: Arc::new(Mutex::new(SinkState::default())),
        }
    }

    /// All appended notifications, oldest first
    pub fn notifications(&self) -> Vec<Notification> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.notifications.clone()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<SinkCall> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.clone()
    }

    /// Make every `append` fail until cleared
    pub fn set_fail_appends(&self, fail: bool) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.fail_appends = fail;
    }
}

#[async_trait]
impl<C, G> NotificationSink for MemoryNotificationSink<C, G>
where
    C: Clock + 'static,
    G: IdGen + 'static,
{
    async fn append(&self, owner: &OwnerId, message: &str) -> Result<(), SinkError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(SinkCall {
            owner: owner.clone(),
            message: message.to_string(),
        });

        if state.fail_appends {
            return Err(SinkError::Unavailable("injected append failure".into()));
        }

        state.notifications.push(Notification {
            id: NotificationId::new(self.ids.next()),
            owner: owner.clone(),
            message: message.to_string(),
            created_at: self.clock.now(),
            is_read: false,
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
