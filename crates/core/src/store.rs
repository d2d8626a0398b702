// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapter traits for the engine's external collaborators
//!
//! The schedule store and notification inbox are owned by the surrounding
//! application (a relational store in practice). The engine only consumes
//! these two narrow interfaces.

use crate::id::{AnimalId, NotificationId, OwnerId};
use crate::schedule::FeedingSchedule;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Schedule Store
// =============================================================================

/// The subject of a feeding schedule, resolved at fetch time
///
/// Ownership lives on the animal, never on the schedule row, so it cannot
/// diverge between the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animal {
    pub id: AnimalId,
    pub name: String,
    pub owner: OwnerId,
}

impl Animal {
    pub fn new(
        id: impl Into<AnimalId>,
        name: impl Into<String>,
        owner: impl Into<OwnerId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            owner: owner.into(),
        }
    }
}

/// A due schedule together with its resolved subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueSchedule {
    pub schedule: FeedingSchedule,
    pub subject: Animal,
}

/// Errors from schedule store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("schedule not found: {0}")]
    NotFound(String),
    #[error("store rejected write: {0}")]
    Rejected(String),
}

/// Adapter for durable schedule storage
#[async_trait]
pub trait ScheduleStore: Clone + Send + Sync + 'static {
    /// Fetch all schedules with `next_due <= now`, subjects resolved
    async fn fetch_due(&self, now: DateTime<Utc>) -> Result<Vec<DueSchedule>, StoreError>;

    /// Persist the full updated schedule record
    async fn save(&self, schedule: &FeedingSchedule) -> Result<(), StoreError>;
}

// =============================================================================
// Notification Sink
// =============================================================================

/// A notification record as appended to the inbox
///
/// Created exactly once per fired occurrence. The engine never touches it
/// again; the read flag belongs to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub owner: OwnerId,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
}

/// Errors from notification delivery
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink unavailable: {0}")]
    Unavailable(String),
    #[error("sink rejected notification: {0}")]
    Rejected(String),
}

/// Adapter for appending notifications to an owner's inbox
#[async_trait]
pub trait NotificationSink: Clone + Send + Sync + 'static {
    /// Append one notification with the given message
    async fn append(&self, owner: &OwnerId, message: &str) -> Result<(), SinkError>;
}
