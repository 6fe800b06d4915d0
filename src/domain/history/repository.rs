//! Ride history repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::HistoryRecord;
use crate::shared::DomainResult;

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Save the record unless one with the same (ride, user, event) key
    /// already exists. Returns whether a row was written.
    async fn insert_unique(&self, record: HistoryRecord) -> DomainResult<bool>;

    /// The user's history feed, newest first
    async fn find_for_user(&self, user_id: Uuid) -> DomainResult<Vec<HistoryRecord>>;

    /// Rewrite the message of every record for the ride
    async fn rewrite_for_ride(&self, ride_id: Uuid, message: &str) -> DomainResult<u64>;

    /// Rewrite the message of one participant's records for the ride
    async fn rewrite_for_participant(
        &self,
        ride_id: Uuid,
        user_id: Uuid,
        message: &str,
    ) -> DomainResult<u64>;
}
