//! Carpool group management and the new-ride flag.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::application::context::CallerContext;
use crate::domain::{Group, Notification, RepositoryProvider};
use crate::shared::{DomainError, DomainResult};

/// A group joined with whether the caller has unread ride notifications
/// in it.
#[derive(Debug, Clone)]
pub struct GroupOverview {
    pub group: Group,
    pub has_new_ride: bool,
}

pub struct GroupService {
    repos: Arc<dyn RepositoryProvider>,
}

impl GroupService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    async fn require_group(&self, id: Uuid) -> DomainResult<Group> {
        self.repos
            .groups()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("group", "id", id))
    }

    pub async fn create(
        &self,
        caller: CallerContext,
        name: &str,
        color: &str,
    ) -> DomainResult<Group> {
        if name.trim().is_empty() {
            return Err(DomainError::Validation(
                "Group name cannot be empty".to_string(),
            ));
        }
        let group = Group::new(name.to_string(), color.to_string(), caller.user_id);
        self.repos.groups().insert(group.clone()).await?;
        info!(group_id = %group.id, owner = %caller.user_id, "group created");
        Ok(group)
    }

    pub async fn get(&self, group_id: Uuid) -> DomainResult<Group> {
        self.require_group(group_id).await
    }

    /// Rename/recolor; blank fields keep their current value.
    pub async fn update(
        &self,
        caller: CallerContext,
        group_id: Uuid,
        name: Option<&str>,
        color: Option<&str>,
    ) -> DomainResult<Group> {
        let mut group = self.require_group(group_id).await?;
        if !group.is_member(caller.user_id) {
            return Err(DomainError::Forbidden(
                "Only members can update the group".to_string(),
            ));
        }
        if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
            group.name = name.to_string();
        }
        if let Some(color) = color.filter(|c| !c.trim().is_empty()) {
            group.color = color.to_string();
        }
        self.repos.groups().update(&group).await?;
        Ok(group)
    }

    /// Invite a member by email.
    pub async fn add_member(
        &self,
        caller: CallerContext,
        group_id: Uuid,
        email: &str,
    ) -> DomainResult<Group> {
        let mut group = self.require_group(group_id).await?;
        if !group.is_member(caller.user_id) {
            return Err(DomainError::Forbidden(
                "Only members can invite to the group".to_string(),
            ));
        }
        let user = self
            .repos
            .users()
            .find_by_email(email)
            .await?
            .ok_or_else(|| DomainError::not_found("user", "email", email))?;

        if group.add_member(user.id) {
            self.repos.groups().update(&group).await?;
        }
        Ok(group)
    }

    /// A member leaves the group. The owner cannot leave their own group;
    /// they delete it instead.
    pub async fn remove_member(
        &self,
        caller: CallerContext,
        group_id: Uuid,
        user_id: Uuid,
    ) -> DomainResult<Group> {
        let mut group = self.require_group(group_id).await?;
        if caller.user_id != user_id && caller.user_id != group.owner_id {
            return Err(DomainError::Forbidden(
                "Cannot remove another member".to_string(),
            ));
        }
        if user_id == group.owner_id {
            return Err(DomainError::Conflict(
                "Owner cannot leave their own group".to_string(),
            ));
        }
        if !group.remove_member(user_id) {
            return Err(DomainError::not_found("member", "id", user_id));
        }
        self.repos.groups().update(&group).await?;
        Ok(group)
    }

    pub async fn delete(&self, caller: CallerContext, group_id: Uuid) -> DomainResult<()> {
        let group = self.require_group(group_id).await?;
        if caller.user_id != group.owner_id {
            return Err(DomainError::Forbidden(
                "Only the owner can delete the group".to_string(),
            ));
        }
        self.repos.groups().delete(group.id).await?;
        info!(group_id = %group.id, "group deleted");
        Ok(())
    }

    /// The caller's groups, each flagged when it holds an unread new-ride
    /// notification for them.
    pub async fn list_with_flags(&self, caller: CallerContext) -> DomainResult<Vec<GroupOverview>> {
        let groups = self.repos.groups().find_for_member(caller.user_id).await?;
        let unread = self
            .repos
            .notifications()
            .find_unread_for_user(caller.user_id)
            .await?;

        let flagged: std::collections::HashSet<Uuid> =
            unread.iter().map(|n| n.group_id).collect();

        Ok(groups
            .into_iter()
            .map(|group| GroupOverview {
                has_new_ride: flagged.contains(&group.id),
                group,
            })
            .collect())
    }

    pub async fn unread_notifications(
        &self,
        caller: CallerContext,
    ) -> DomainResult<Vec<Notification>> {
        self.repos
            .notifications()
            .find_unread_for_user(caller.user_id)
            .await
    }

    /// Clear the caller's new-ride flag for one group.
    pub async fn mark_notifications_read(
        &self,
        caller: CallerContext,
        group_id: Uuid,
    ) -> DomainResult<u64> {
        self.repos
            .notifications()
            .mark_read(caller.user_id, group_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use crate::infrastructure::memory::MemoryProvider;

    async fn seed_user(repos: &Arc<dyn RepositoryProvider>, email: &str) -> User {
        let user = User::new(email.into(), "hash".into(), "Test".into(), "User".into());
        repos.users().insert(user.clone()).await.unwrap();
        user
    }

    fn setup() -> (Arc<dyn RepositoryProvider>, GroupService) {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(MemoryProvider::new());
        let service = GroupService::new(Arc::clone(&repos));
        (repos, service)
    }

    #[tokio::test]
    async fn create_and_invite_by_email() {
        let (repos, service) = setup();
        let owner = seed_user(&repos, "owner@example.com").await;
        let friend = seed_user(&repos, "friend@example.com").await;
        let ctx = CallerContext::new(owner.id);

        let group = service.create(ctx, "commute", "#3b82f6").await.unwrap();
        let group = service
            .add_member(ctx, group.id, "friend@example.com")
            .await
            .unwrap();
        assert!(group.is_member(friend.id));

        // Inviting again changes nothing.
        let group = service
            .add_member(ctx, group.id, "friend@example.com")
            .await
            .unwrap();
        assert_eq!(group.member_ids.len(), 2);
    }

    #[tokio::test]
    async fn invite_unknown_email_fails() {
        let (repos, service) = setup();
        let owner = seed_user(&repos, "owner@example.com").await;
        let ctx = CallerContext::new(owner.id);
        let group = service.create(ctx, "commute", "#fff").await.unwrap();

        let result = service.add_member(ctx, group.id, "ghost@example.com").await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn owner_cannot_leave_but_member_can() {
        let (repos, service) = setup();
        let owner = seed_user(&repos, "owner@example.com").await;
        let friend = seed_user(&repos, "friend@example.com").await;
        let ctx = CallerContext::new(owner.id);

        let group = service.create(ctx, "commute", "#fff").await.unwrap();
        service
            .add_member(ctx, group.id, "friend@example.com")
            .await
            .unwrap();

        let result = service.remove_member(ctx, group.id, owner.id).await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));

        let group = service
            .remove_member(CallerContext::new(friend.id), group.id, friend.id)
            .await
            .unwrap();
        assert!(!group.is_member(friend.id));
    }

    #[tokio::test]
    async fn new_ride_flag_tracks_unread_notifications() {
        let (repos, service) = setup();
        let owner = seed_user(&repos, "owner@example.com").await;
        let friend = seed_user(&repos, "friend@example.com").await;
        let owner_ctx = CallerContext::new(owner.id);
        let friend_ctx = CallerContext::new(friend.id);

        let group = service.create(owner_ctx, "commute", "#fff").await.unwrap();
        service
            .add_member(owner_ctx, group.id, "friend@example.com")
            .await
            .unwrap();

        repos
            .notifications()
            .insert_many(vec![Notification::new(
                friend.id,
                group.id,
                Uuid::new_v4(),
            )])
            .await
            .unwrap();

        let overview = service.list_with_flags(friend_ctx).await.unwrap();
        assert_eq!(overview.len(), 1);
        assert!(overview[0].has_new_ride);

        service
            .mark_notifications_read(friend_ctx, group.id)
            .await
            .unwrap();
        let overview = service.list_with_flags(friend_ctx).await.unwrap();
        assert!(!overview[0].has_new_ride);
    }
}
