//! Driver repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::Driver;
use crate::shared::DomainResult;

#[async_trait]
pub trait DriverRepository: Send + Sync {
    /// Save a new driver profile
    async fn insert(&self, driver: Driver) -> DomainResult<()>;

    /// Find driver profile by owning user
    async fn find_by_user_id(&self, user_id: Uuid) -> DomainResult<Option<Driver>>;

    /// Update an existing driver profile
    async fn update(&self, driver: &Driver) -> DomainResult<()>;
}
