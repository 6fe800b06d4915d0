//! SeaORM implementation of RideRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::domain::ride::{Booking, Ride, RideRepository, RideStatus};
use crate::infrastructure::database::entities::ride;
use crate::shared::{DomainError, DomainResult};

use super::db_err;

pub struct SeaOrmRideRepository {
    db: DatabaseConnection,
}

impl SeaOrmRideRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn bookings_to_json(bookings: &[Booking]) -> DomainResult<String> {
    serde_json::to_string(bookings)
        .map_err(|e| DomainError::Storage(format!("serializing bookings: {}", e)))
}

fn bookings_from_json(json: &str) -> DomainResult<Vec<Booking>> {
    serde_json::from_str(json)
        .map_err(|e| DomainError::Storage(format!("deserializing bookings: {}", e)))
}

fn model_to_domain(m: ride::Model) -> DomainResult<Ride> {
    Ok(Ride {
        id: m.id,
        driver_id: m.driver_id,
        scheduled_at: m.scheduled_at,
        offered_seats: m.offered_seats as u32,
        seats_remaining: m.seats_remaining as u32,
        status: RideStatus::from_str(&m.status),
        passengers: bookings_from_json(&m.passengers)?,
        pending_credentials: bookings_from_json(&m.pending_credentials)?,
        created_at: m.created_at,
        version: m.version,
    })
}

// ── RideRepository impl ─────────────────────────────────────────

#[async_trait]
impl RideRepository for SeaOrmRideRepository {
    async fn insert(&self, r: Ride) -> DomainResult<()> {
        debug!("Saving ride: {}", r.id);

        let model = ride::ActiveModel {
            id: Set(r.id),
            driver_id: Set(r.driver_id),
            scheduled_at: Set(r.scheduled_at),
            offered_seats: Set(r.offered_seats as i32),
            seats_remaining: Set(r.seats_remaining as i32),
            status: Set(r.status.as_str().to_string()),
            passengers: Set(bookings_to_json(&r.passengers)?),
            pending_credentials: Set(bookings_to_json(&r.pending_credentials)?),
            created_at: Set(r.created_at),
            version: Set(r.version),
        };
        model.insert(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Ride>> {
        let model = ride::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(model_to_domain).transpose()
    }

    /// One conditional UPDATE carries the whole aggregate. The version
    /// filter makes it a compare-and-swap: zero rows affected means a
    /// concurrent writer got there first.
    async fn update(&self, r: &Ride) -> DomainResult<bool> {
        debug!("Updating ride {} at version {}", r.id, r.version);

        let result = ride::Entity::update_many()
            .col_expr(
                ride::Column::SeatsRemaining,
                Expr::value(r.seats_remaining as i32),
            )
            .col_expr(ride::Column::Status, Expr::value(r.status.as_str()))
            .col_expr(
                ride::Column::Passengers,
                Expr::value(bookings_to_json(&r.passengers)?),
            )
            .col_expr(
                ride::Column::PendingCredentials,
                Expr::value(bookings_to_json(&r.pending_credentials)?),
            )
            .col_expr(ride::Column::Version, Expr::value(r.version + 1))
            .filter(ride::Column::Id.eq(r.id))
            .filter(ride::Column::Version.eq(r.version))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected == 1)
    }

    async fn find_related(&self, user_id: Uuid) -> DomainResult<Vec<Ride>> {
        let models = ride::Entity::find()
            .filter(
                Condition::any()
                    .add(ride::Column::DriverId.eq(user_id))
                    .add(ride::Column::Passengers.contains(user_id.to_string())),
            )
            .order_by_desc(ride::Column::ScheduledAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(model_to_domain).collect()
    }

    async fn find_bookable(&self, user_id: Uuid) -> DomainResult<Vec<Ride>> {
        let models = ride::Entity::find()
            .filter(ride::Column::Status.eq(RideStatus::Pending.as_str()))
            .filter(ride::Column::DriverId.ne(user_id))
            .filter(ride::Column::Passengers.contains(user_id.to_string()).not())
            .order_by_desc(ride::Column::ScheduledAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(model_to_domain).collect()
    }
}
