//! New-ride notification model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A "new ride in your group" marker. One per (recipient, group, ride);
/// a member sharing two groups with the driver gets one per group. All
/// markers for a ride are swept when it reaches a terminal status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub group_id: Uuid,
    pub ride_id: Uuid,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(user_id: Uuid, group_id: Uuid, ride_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            group_id,
            ride_id,
            read: false,
            created_at: Utc::now(),
        }
    }
}
