//! Group repository interface

use async_trait::async_trait;
use uuid::Uuid;

use super::model::Group;
use crate::shared::DomainResult;

#[async_trait]
pub trait GroupRepository: Send + Sync {
    /// Save a new group
    async fn insert(&self, group: Group) -> DomainResult<()>;

    /// Find group by ID
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Group>>;

    /// All groups the user belongs to
    async fn find_for_member(&self, user_id: Uuid) -> DomainResult<Vec<Group>>;

    /// Update an existing group (name, color, membership)
    async fn update(&self, group: &Group) -> DomainResult<()>;

    /// Delete a group
    async fn delete(&self, id: Uuid) -> DomainResult<()>;
}
