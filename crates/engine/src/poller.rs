// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed-cadence poller over due feeding schedules
//!
//! Each tick fetches every schedule with `next_due <= now` and processes it
//! as one logical step: append a notification to the subject's owner, then
//! recompute and persist `next_due`. The append always happens before the
//! advance, so a crash between the two re-delivers on the next successful
//! tick rather than silently dropping an occurrence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;
use tend_core::{
    compute_next_utc, fallback_next, Clock, DueSchedule, NotificationSink, ScheduleStore,
};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Default scan cadence
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration for the poller
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PollerConfig {
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// The poller's current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    /// Waiting for the next tick
    Idle,
    /// A scan is in progress
    Scanning,
}

impl fmt::Display for PollerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollerState::Idle => write!(f, "idle"),
            PollerState::Scanning => write!(f, "scanning"),
        }
    }
}

/// What one tick observed and did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Unique due schedules observed
    pub due: usize,
    /// Notifications successfully appended
    pub notified: usize,
    /// Schedules whose new `next_due` was persisted
    pub advanced: usize,
    /// Schedules skipped on a sink failure (retried next tick)
    pub skipped: usize,
}

/// Outcome of processing a single due schedule
enum Outcome {
    /// Notified and persisted the new due instant
    Advanced,
    /// Notified but the save failed; the occurrence may repeat
    NotifiedOnly,
    /// Sink failure before any notification; untouched
    Skipped,
}

/// Polls the schedule store on a fixed cadence and fires due occurrences
///
/// No global state: the poller is constructed with its collaborators and an
/// injected clock, and runs only when the host drives [`tick`](Self::tick)
/// or [`run`](Self::run).
pub struct SchedulePoller<S, N, C> {
    store: S,
    sink: N,
    clock: C,
    config: PollerConfig,
    state: PollerState,
}

impl<S, N, C> SchedulePoller<S, N, C>
where
    S: ScheduleStore,
    N: NotificationSink,
    C: Clock,
{
    pub fn new(store: S, sink: N, clock: C) -> Self {
        Self {
            store,
            sink,
            clock,
            config: PollerConfig::default(),
            state: PollerState::Idle,
        }
    }

    pub fn with_config(mut self, config: PollerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Run one scan: fetch everything due at the current instant and fire it
    ///
    /// Public so schedule-create/edit flows and tests can drive the poller a
    /// finite number of times without the timer loop.
    pub async fn tick(&mut self) -> ScanReport {
        self.state = PollerState::Scanning;
        let now = self.clock.now();
        let report = self.scan(now).await;
        self.state = PollerState::Idle;
        report
    }

    async fn scan(&self, now: DateTime<Utc>) -> ScanReport {
        let due = match self.store.fetch_due(now).await {
            Ok(due) => due,
            Err(e) => {
                error!(error = %e, "failed to fetch due schedules, retrying next tick");
                return ScanReport::default();
            }
        };

        let mut report = ScanReport::default();
        let mut seen: HashSet<_> = HashSet::new();

        for item in due {
            // Each schedule fires at most once per tick, however far in the
            // past its due instant is.
            if !seen.insert(item.schedule.id.clone()) {
                continue;
            }
            report.due += 1;

            match self.process(item, now).await {
                Outcome::Advanced => {
                    report.notified += 1;
                    report.advanced += 1;
                }
                Outcome::NotifiedOnly => report.notified += 1,
                Outcome::Skipped => report.skipped += 1,
            }
        }

        debug!(
            state = %self.state,
            due = report.due,
            notified = report.notified,
            advanced = report.advanced,
            skipped = report.skipped,
            "scan complete"
        );
        report
    }

    /// Fire one occurrence: notify, then advance. Never the other way round.
    async fn process(&self, item: DueSchedule, now: DateTime<Utc>) -> Outcome {
        let DueSchedule { schedule, subject } = item;

        let message = format!("It's time to feed {}", subject.name);
        if let Err(e) = self.sink.append(&subject.owner, &message).await {
            warn!(
                schedule_id = %schedule.id,
                error = %e,
                "notification append failed, schedule retried next tick"
            );
            return Outcome::Skipped;
        }

        let next_due = match compute_next_utc(&schedule, now) {
            Ok(next) => next,
            Err(e) => {
                warn!(
                    schedule_id = %schedule.id,
                    error = %e,
                    "invalid recurrence configuration, deferring one day"
                );
                fallback_next(now)
            }
        };

        let mut updated = schedule;
        updated.next_due = next_due;

        if let Err(e) = self.store.save(&updated).await {
            warn!(
                schedule_id = %updated.id,
                error = %e,
                "failed to persist advanced schedule, occurrence may repeat"
            );
            return Outcome::NotifiedOnly;
        }

        debug!(schedule_id = %updated.id, next_due = %updated.next_due, "occurrence fired");
        Outcome::Advanced
    }

    /// Drive ticks at the configured cadence until shutdown is signalled
    ///
    /// The first scan runs immediately on start. Scans are awaited inline,
    /// so ticks never overlap; a tick that comes due mid-scan is delayed,
    /// not dropped. Dropping the shutdown sender also stops the poller.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!(interval = ?self.config.interval, "poller started");

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.tick().await;
                    if report.due > 0 {
                        info!(
                            due = report.due,
                            notified = report.notified,
                            advanced = report.advanced,
                            skipped = report.skipped,
                            "processed due schedules"
                        );
                    }
                }
                _ = shutdown.changed() => {
                    info!("shutdown requested, poller stopping");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "poller_tests.rs"]
mod tests;
