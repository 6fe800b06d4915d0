//! Ride entity
//!
//! The passenger and pending-credential lists are stored as JSON text so
//! the whole aggregate commits in one version-guarded UPDATE.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rides")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub driver_id: Uuid,
    pub scheduled_at: DateTimeUtc,
    pub offered_seats: i32,
    pub seats_remaining: i32,

    /// Ride status: pending, ongoing, completed, cancelled
    pub status: String,

    #[sea_orm(column_type = "Text")]
    pub passengers: String,

    #[sea_orm(column_type = "Text")]
    pub pending_credentials: String,

    pub created_at: DateTimeUtc,

    /// Optimistic concurrency token; bumped on every successful write.
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::DriverId",
        to = "super::user::Column::Id"
    )]
    Driver,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Driver.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
