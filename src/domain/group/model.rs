//! Carpool group model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A circle of users who share ride announcements. The owner is always a
/// member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub owner_id: Uuid,
    pub member_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Group {
    pub fn new(name: String, color: String, owner_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            color,
            owner_id,
            member_ids: vec![owner_id],
            created_at: Utc::now(),
        }
    }

    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.member_ids.contains(&user_id)
    }

    /// Add a member; no-op result when already present.
    pub fn add_member(&mut self, user_id: Uuid) -> bool {
        if self.is_member(user_id) {
            return false;
        }
        self.member_ids.push(user_id);
        true
    }

    /// Remove a member. The owner cannot leave their own group.
    pub fn remove_member(&mut self, user_id: Uuid) -> bool {
        if user_id == self.owner_id {
            return false;
        }
        let before = self.member_ids.len();
        self.member_ids.retain(|m| *m != user_id);
        self.member_ids.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_is_initial_member() {
        let owner = Uuid::new_v4();
        let group = Group::new("morning commute".into(), "#3b82f6".into(), owner);
        assert!(group.is_member(owner));
    }

    #[test]
    fn add_member_is_idempotent() {
        let owner = Uuid::new_v4();
        let mut group = Group::new("g".into(), "#fff".into(), owner);
        let member = Uuid::new_v4();
        assert!(group.add_member(member));
        assert!(!group.add_member(member));
        assert_eq!(group.member_ids.len(), 2);
    }

    #[test]
    fn owner_cannot_be_removed() {
        let owner = Uuid::new_v4();
        let mut group = Group::new("g".into(), "#fff".into(), owner);
        assert!(!group.remove_member(owner));
        assert!(group.is_member(owner));
    }
}
