//! SeaORM implementation of NotificationRepository

use async_trait::async_trait;
use log::debug;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::domain::notification::{Notification, NotificationRepository};
use crate::infrastructure::database::entities::notification;
use crate::shared::DomainResult;

use super::db_err;

pub struct SeaOrmNotificationRepository {
    db: DatabaseConnection,
}

impl SeaOrmNotificationRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: notification::Model) -> Notification {
    Notification {
        id: m.id,
        user_id: m.user_id,
        group_id: m.group_id,
        ride_id: m.ride_id,
        read: m.read,
        created_at: m.created_at,
    }
}

#[async_trait]
impl NotificationRepository for SeaOrmNotificationRepository {
    async fn insert_many(&self, notifications: Vec<Notification>) -> DomainResult<()> {
        if notifications.is_empty() {
            return Ok(());
        }
        debug!("Saving {} notifications", notifications.len());

        let rows: Vec<notification::ActiveModel> = notifications
            .into_iter()
            .map(|n| notification::ActiveModel {
                id: Set(n.id),
                user_id: Set(n.user_id),
                group_id: Set(n.group_id),
                ride_id: Set(n.ride_id),
                read: Set(n.read),
                created_at: Set(n.created_at),
            })
            .collect();
        notification::Entity::insert_many(rows)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn find_unread_for_user(&self, user_id: Uuid) -> DomainResult<Vec<Notification>> {
        let models = notification::Entity::find()
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::Read.eq(false))
            .order_by_desc(notification::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn mark_read(&self, user_id: Uuid, group_id: Uuid) -> DomainResult<u64> {
        let result = notification::Entity::update_many()
            .col_expr(notification::Column::Read, Expr::value(true))
            .filter(notification::Column::UserId.eq(user_id))
            .filter(notification::Column::GroupId.eq(group_id))
            .filter(notification::Column::Read.eq(false))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }

    async fn delete_for_ride(&self, ride_id: Uuid) -> DomainResult<u64> {
        let result = notification::Entity::delete_many()
            .filter(notification::Column::RideId.eq(ride_id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected)
    }
}
