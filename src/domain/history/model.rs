//! Ride history (audit trail) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle event kind. Together with (ride, user) it forms the audit
/// record's idempotency key, so a retried write never produces duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryEvent {
    Created,
    Booked,
    Completed,
}

impl HistoryEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Booked => "booked",
            Self::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "created" => Self::Created,
            "completed" => Self::Completed,
            _ => Self::Booked,
        }
    }
}

pub const MSG_RIDE_CREATED: &str = "Ride created by driver";
pub const MSG_RIDE_BOOKED: &str = "Ride booked";
pub const MSG_RIDE_COMPLETED: &str = "Ride completed";
pub const MSG_CANCELLED_BY_DRIVER: &str = "Ride cancelled by driver";
pub const MSG_CANCELLED_BY_USER: &str = "Ride cancelled by user";

/// One participant's view of one lifecycle event. The message is mutable:
/// cancellations rewrite existing records instead of appending new ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ride_id: Uuid,
    /// Denormalized at write time so the feed survives driver changes.
    pub driver_name: String,
    pub event: HistoryEvent,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn new(
        user_id: Uuid,
        ride_id: Uuid,
        driver_name: String,
        event: HistoryEvent,
        message: &str,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            ride_id,
            driver_name,
            event,
            message: message.to_string(),
            created_at: Utc::now(),
        }
    }
}
