// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tend_core::{
    DueSchedule, FeedingSchedule, NotificationSink, OwnerId, ScheduleStore, SinkError, StoreError,
};

/// Wrapper that adds tracing to any ScheduleStore
#[derive(Clone)]
pub struct TracedScheduleStore<S> {
    inner: S,
}

impl<S> TracedScheduleStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: ScheduleStore> ScheduleStore for TracedScheduleStore<S> {
    async fn fetch_due(&self, now: DateTime<Utc>) -> Result<Vec<DueSchedule>, StoreError> {
        let span = tracing::info_span!("store.fetch_due", now = %now);
        let _guard = span.enter();

        let start = std::time::Instant::now();
        let result = self.inner.fetch_due(now).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(due) => tracing::debug!(
                due_count = due.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "fetched"
            ),
            Err(e) => tracing::error!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "fetch failed"
            ),
        }

        result
    }

    async fn save(&self, schedule: &FeedingSchedule) -> Result<(), StoreError> {
        let span = tracing::info_span!("store.save", schedule_id = %schedule.id);
        let _guard = span.enter();

        let start = std::time::Instant::now();
        let result = self.inner.save(schedule).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(()) => tracing::debug!(
                next_due = %schedule.next_due,
                elapsed_ms = elapsed.as_millis() as u64,
                "saved"
            ),
            Err(e) => tracing::error!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "save failed"
            ),
        }

        result
    }
}

/// Wrapper that adds tracing to any NotificationSink
#[derive(Clone)]
pub struct TracedNotificationSink<N> {
    inner: N,
}

impl<N> TracedNotificationSink<N> {
    pub fn new(inner: N) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<N: NotificationSink> NotificationSink for TracedNotificationSink<N> {
    async fn append(&self, owner: &OwnerId, message: &str) -> Result<(), SinkError> {
        let span = tracing::info_span!("sink.append", owner = %owner);
        let _guard = span.enter();

        let start = std::time::Instant::now();
        let result = self.inner.append(owner, message).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(()) => tracing::debug!(
                message_len = message.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "appended"
            ),
            Err(e) => tracing::error!(
                elapsed_ms = elapsed.as_millis() as u64,
                error = %e,
                "append failed"
            ),
        }

        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
