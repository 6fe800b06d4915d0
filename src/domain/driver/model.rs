//! Driver profile model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's driver profile. One per user; holding one is what allows
/// scheduling rides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub user_id: Uuid,
    pub license_no: String,
    pub car_name: String,
    /// Seats the vehicle can offer; caps `seats` on any scheduled ride.
    pub seats: u32,
    pub created_at: DateTime<Utc>,
}

impl Driver {
    pub fn new(user_id: Uuid, license_no: String, car_name: String, seats: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            license_no,
            car_name,
            seats,
            created_at: Utc::now(),
        }
    }

    /// Profile is complete enough to schedule rides.
    pub fn is_complete(&self) -> bool {
        !self.license_no.is_empty() && !self.car_name.is_empty()
    }
}
