//! Notification repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::Notification;
use crate::shared::DomainResult;

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Save a batch of notifications
    async fn insert_many(&self, notifications: Vec<Notification>) -> DomainResult<()>;

    /// Unread notifications for a user, newest first
    async fn find_unread_for_user(&self, user_id: Uuid) -> DomainResult<Vec<Notification>>;

    /// Mark all of a user's notifications for a group as read
    async fn mark_read(&self, user_id: Uuid, group_id: Uuid) -> DomainResult<u64>;

    /// Remove every notification for a ride (terminal transition sweep)
    async fn delete_for_ride(&self, ride_id: Uuid) -> DomainResult<u64>;
}
