// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure next-occurrence computation for feeding schedules
//!
//! `compute_next` is deterministic given its inputs; the current instant is
//! injected by the caller rather than read from a global clock. Wall-clock
//! schedules are evaluated in the supplied timezone (the engine uses UTC).
//!
//! Local-time resolution convention: an ambiguous local time (DST fall-back)
//! resolves to the earlier instant; a nonexistent local time (spring-forward
//! gap) is skipped forward past the gap. Neither is ever an error.

use crate::schedule::{ConfigError, FeedingSchedule, Recurrence};
use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};

/// Compute the next due instant for a schedule as observed at `now`
///
/// Anchoring by frequency:
/// - `EveryXHours` advances from the *previous* due instant, keeping the
///   cadence grid fixed regardless of poller latency.
/// - `Daily`/`Weekly` anchor to the wall clock: the next slot strictly after
///   `now`, in the given timezone.
///
/// Fails with [`ConfigError`] when the row's frequency-specific fields are
/// missing or invalid; callers that must never stall translate that into
/// [`fallback_next`].
pub fn compute_next<Tz: TimeZone>(
    schedule: &FeedingSchedule,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<DateTime<Utc>, ConfigError> {
    match schedule.recurrence()? {
        Recurrence::EveryHours { interval } => {
            Ok(schedule.next_due + Duration::hours(i64::from(interval)))
        }

        // A daily schedule without a wall-clock slot cannot anchor to one;
        // it behaves as a fixed 24h interval from the moment of observation.
        Recurrence::Daily { time_of_day: None } => Ok(fallback_next(now)),

        Recurrence::Daily {
            time_of_day: Some(time),
        } => {
            let today = now.with_timezone(tz).date_naive();
            let candidate = resolve_local(tz, today, time);
            if candidate > now {
                Ok(candidate)
            } else {
                // Today's slot already passed; roll to tomorrow.
                Ok(resolve_local(tz, today + Duration::days(1), time))
            }
        }

        Recurrence::Weekly { day, time_of_day } => {
            let today = now.with_timezone(tz).date_naive();
            let today_index = today.weekday().num_days_from_monday();
            let days_ahead = (i64::from(day.index()) - i64::from(today_index)).rem_euclid(7);
            let candidate = resolve_local(tz, today + Duration::days(days_ahead), time_of_day);
            if days_ahead == 0 && candidate <= now {
                // Target day is today but the slot already passed.
                Ok(resolve_local(tz, today + Duration::days(7), time_of_day))
            } else {
                Ok(candidate)
            }
        }
    }
}

/// `compute_next` with the engine's UTC convention
pub fn compute_next_utc(
    schedule: &FeedingSchedule,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, ConfigError> {
    compute_next(schedule, now, &Utc)
}

/// Safety-net due instant for rows the recurrence rules cannot interpret
///
/// One day out, so a corrupt or partially-migrated record never stalls the
/// engine permanently.
pub fn fallback_next(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::hours(24)
}

/// Resolve a wall-clock date+time to an absolute instant in `tz`
///
/// Ambiguous local times take the earlier instant. Nonexistent local times
/// are probed forward in 15-minute steps until one resolves; real DST gaps
/// are at most a few hours, so the probe is bounded.
fn resolve_local<Tz: TimeZone>(tz: &Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let mut naive = date.and_time(time);
    for _ in 0..=24 {
        match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) => return dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earlier, _) => return earlier.with_timezone(&Utc),
            LocalResult::None => naive = naive + Duration::minutes(15),
        }
    }
    // No real timezone leaves a 6h span unmapped; treat the wall clock as UTC.
    Utc.from_utc_datetime(&naive)
}

#[cfg(test)]
#[path = "recurrence_tests.rs"]
mod tests;
