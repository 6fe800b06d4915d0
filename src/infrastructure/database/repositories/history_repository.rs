//! SeaORM implementation of HistoryRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr,
};
use uuid::Uuid;

use crate::domain::history::{HistoryEvent, HistoryRecord, HistoryRepository};
use crate::infrastructure::database::entities::ride_history;
use crate::shared::DomainResult;

use super::db_err;

pub struct SeaOrmHistoryRepository {
    db: DatabaseConnection,
}

impl SeaOrmHistoryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: ride_history::Model) -> HistoryRecord {
    HistoryRecord {
        id: m.id,
        user_id: m.user_id,
        ride_id: m.ride_id,
        driver_name: m.driver_name,
        event: HistoryEvent::from_str(&m.event),
        message: m.message,
        created_at: m.created_at,
    }
}

#[async_trait]
impl HistoryRepository for SeaOrmHistoryRepository {
    /// The unique (ride_id, user_id, event) index backs the idempotency
    /// key; a constraint violation is reported as "already written".
    async fn insert_unique(&self, record: HistoryRecord) -> DomainResult<bool> {
        debug!("Saving history record: {}", record.id);

        let model = ride_history::ActiveModel {
            id: Set(record.id),
            user_id: Set(record.user_id),
            ride_id: Set(record.ride_id),
            driver_name: Set(record.driver_name),
            event: Set(record.event.as_str().to_string()),
            message: Set(record.message),
            created_at: Set(record.created_at),
        };
        match model.insert(&self.db).await {
            Ok(_) => Ok(true),
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Ok(false),
                _ => Err(db_err(err)),
            },
        }
    }

    async fn find_for_user(&self, user_id: Uuid) -> DomainResult<Vec<HistoryRecord>> {
        let models = ride_history::Entity::find()
            .filter(ride_history::Column::UserId.eq(user_id))
            .order_by_desc(ride_history::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn rewrite_for_ride(&self, ride_id: Uuid, message: &str) -> DomainResult<u64> {
        let result = ride_history::Entity::update_many()
            .col_expr(ride_history::Column::Message, Expr::value(message))
            .filter(ride_history::Column::RideId.eq(ride_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }

    async fn rewrite_for_participant(
        &self,
        ride_id: Uuid,
        user_id: Uuid,
        message: &str,
    ) -> DomainResult<u64> {
        let result = ride_history::Entity::update_many()
            .col_expr(ride_history::Column::Message, Expr::value(message))
            .filter(ride_history::Column::RideId.eq(ride_id))
            .filter(ride_history::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }
}
