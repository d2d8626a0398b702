// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Feeding-schedule domain model
//!
//! A `FeedingSchedule` mirrors the stored row: a closed `Frequency` tag plus
//! the optional frequency-specific fields. `recurrence()` normalizes a row
//! into the validated `Recurrence` view, so inconsistent combinations are
//! rejected at one boundary instead of discovered mid-computation.

use crate::id::{AnimalId, ScheduleId};
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// How often a schedule fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    EveryXHours,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => write!(f, "daily"),
            Frequency::Weekly => write!(f, "weekly"),
            Frequency::EveryXHours => write!(f, "every_x_hours"),
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "every_x_hours" => Ok(Frequency::EveryXHours),
            _ => Err(format!("unknown frequency: {}", s)),
        }
    }
}

/// Day of week for weekly schedules, Monday-first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayOfWeek {
    /// Zero-based index from Monday
    pub fn index(self) -> u32 {
        match self {
            DayOfWeek::Mon => 0,
            DayOfWeek::Tue => 1,
            DayOfWeek::Wed => 2,
            DayOfWeek::Thu => 3,
            DayOfWeek::Fri => 4,
            DayOfWeek::Sat => 5,
            DayOfWeek::Sun => 6,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            DayOfWeek::Mon => "mon",
            DayOfWeek::Tue => "tue",
            DayOfWeek::Wed => "wed",
            DayOfWeek::Thu => "thu",
            DayOfWeek::Fri => "fri",
            DayOfWeek::Sat => "sat",
            DayOfWeek::Sun => "sun",
        };
        write!(f, "{}", tag)
    }
}

impl std::str::FromStr for DayOfWeek {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mon" => Ok(DayOfWeek::Mon),
            "tue" => Ok(DayOfWeek::Tue),
            "wed" => Ok(DayOfWeek::Wed),
            "thu" => Ok(DayOfWeek::Thu),
            "fri" => Ok(DayOfWeek::Fri),
            "sat" => Ok(DayOfWeek::Sat),
            "sun" => Ok(DayOfWeek::Sun),
            _ => Err(format!("unknown day of week: {}", s)),
        }
    }
}

/// A schedule row whose frequency-specific fields are missing or invalid
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("weekly schedule has no time of day")]
    MissingTimeOfDay,
    #[error("weekly schedule has no day of week")]
    MissingDayOfWeek,
    #[error("hourly schedule has no hours interval")]
    MissingHoursInterval,
    #[error("hours interval must be positive, got {0}")]
    NonPositiveHoursInterval(i32),
}

/// Validated recurrence policy derived from a schedule row
///
/// Exactly one policy is active; fields the active variant does not name
/// are ignored even if the row populated them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recurrence {
    /// Fires once a day. Without a time of day the schedule degenerates to
    /// a fixed 24h interval from the moment of observation.
    Daily { time_of_day: Option<NaiveTime> },
    /// Fires once a week at a wall-clock slot
    Weekly {
        day: DayOfWeek,
        time_of_day: NaiveTime,
    },
    /// Fires on a fixed grid anchored to the previous due instant
    EveryHours { interval: i32 },
}

/// A feeding schedule as persisted by the store
///
/// `next_due` is the single source of truth for when the schedule fires
/// next. Ownership is not stored here; it is resolved through the subject
/// when a due schedule is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedingSchedule {
    pub id: ScheduleId,
    pub animal_id: AnimalId,
    pub frequency: Frequency,
    #[serde(default)]
    pub time_of_day: Option<NaiveTime>,
    #[serde(default)]
    pub day_of_week: Option<DayOfWeek>,
    #[serde(default)]
    pub hours_interval: Option<i32>,
    pub next_due: DateTime<Utc>,
}

impl FeedingSchedule {
    pub fn new(
        id: impl Into<ScheduleId>,
        animal_id: impl Into<AnimalId>,
        frequency: Frequency,
        next_due: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            animal_id: animal_id.into(),
            frequency,
            time_of_day: None,
            day_of_week: None,
            hours_interval: None,
            next_due,
        }
    }

    pub fn with_time_of_day(mut self, time: NaiveTime) -> Self {
        self.time_of_day = Some(time);
        self
    }

    pub fn with_day_of_week(mut self, day: DayOfWeek) -> Self {
        self.day_of_week = Some(day);
        self
    }

    pub fn with_hours_interval(mut self, hours: i32) -> Self {
        self.hours_interval = Some(hours);
        self
    }

    /// Normalize the row into its validated recurrence policy
    pub fn recurrence(&self) -> Result<Recurrence, ConfigError> {
        match self.frequency {
            Frequency::Daily => Ok(Recurrence::Daily {
                time_of_day: self.time_of_day,
            }),
            Frequency::Weekly => {
                let day = self.day_of_week.ok_or(ConfigError::MissingDayOfWeek)?;
                let time_of_day = self.time_of_day.ok_or(ConfigError::MissingTimeOfDay)?;
                Ok(Recurrence::Weekly { day, time_of_day })
            }
            Frequency::EveryXHours => {
                let interval = self
                    .hours_interval
                    .ok_or(ConfigError::MissingHoursInterval)?;
                if interval <= 0 {
                    return Err(ConfigError::NonPositiveHoursInterval(interval));
                }
                Ok(Recurrence::EveryHours { interval })
            }
        }
    }

    /// Check the row at a construction or edit boundary
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.recurrence().map(|_| ())
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
