//! In-memory storage backend.
//!
//! DashMap-backed implementation of every repository, used for local
//! development and service-level tests. The ride compare-and-swap runs
//! under the map's shard lock, giving the same winner-takes-the-version
//! semantics as the database backend.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::domain::driver::DriverRepository;
use crate::domain::group::GroupRepository;
use crate::domain::history::HistoryRepository;
use crate::domain::notification::NotificationRepository;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::ride::RideRepository;
use crate::domain::user::UserRepository;
use crate::domain::{Driver, Group, HistoryRecord, Notification, Ride, RideStatus, User};
use crate::shared::DomainResult;

#[derive(Default)]
pub struct MemoryProvider {
    users: DashMap<Uuid, User>,
    drivers: DashMap<Uuid, Driver>,
    groups: DashMap<Uuid, Group>,
    rides: DashMap<Uuid, Ride>,
    history: DashMap<Uuid, HistoryRecord>,
    notifications: DashMap<Uuid, Notification>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryProvider for MemoryProvider {
    fn users(&self) -> &dyn UserRepository {
        self
    }
    fn drivers(&self) -> &dyn DriverRepository {
        self
    }
    fn groups(&self) -> &dyn GroupRepository {
        self
    }
    fn rides(&self) -> &dyn RideRepository {
        self
    }
    fn history(&self) -> &dyn HistoryRepository {
        self
    }
    fn notifications(&self) -> &dyn NotificationRepository {
        self
    }
}

#[async_trait]
impl UserRepository for MemoryProvider {
    async fn insert(&self, user: User) -> DomainResult<()> {
        self.users.insert(user.id, user);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email)
            .map(|u| u.clone()))
    }

    async fn update(&self, user: &User) -> DomainResult<()> {
        self.users.insert(user.id, user.clone());
        Ok(())
    }
}

#[async_trait]
impl DriverRepository for MemoryProvider {
    async fn insert(&self, driver: Driver) -> DomainResult<()> {
        self.drivers.insert(driver.id, driver);
        Ok(())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> DomainResult<Option<Driver>> {
        Ok(self
            .drivers
            .iter()
            .find(|d| d.user_id == user_id)
            .map(|d| d.clone()))
    }

    async fn update(&self, driver: &Driver) -> DomainResult<()> {
        self.drivers.insert(driver.id, driver.clone());
        Ok(())
    }
}

#[async_trait]
impl GroupRepository for MemoryProvider {
    async fn insert(&self, group: Group) -> DomainResult<()> {
        self.groups.insert(group.id, group);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Group>> {
        Ok(self.groups.get(&id).map(|g| g.clone()))
    }

    async fn find_for_member(&self, user_id: Uuid) -> DomainResult<Vec<Group>> {
        Ok(self
            .groups
            .iter()
            .filter(|g| g.is_member(user_id))
            .map(|g| g.clone())
            .collect())
    }

    async fn update(&self, group: &Group) -> DomainResult<()> {
        self.groups.insert(group.id, group.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        self.groups.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl RideRepository for MemoryProvider {
    async fn insert(&self, ride: Ride) -> DomainResult<()> {
        self.rides.insert(ride.id, ride);
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Ride>> {
        Ok(self.rides.get(&id).map(|r| r.clone()))
    }

    async fn update(&self, ride: &Ride) -> DomainResult<bool> {
        // CAS under the shard lock: the write wins only if nobody bumped
        // the version since this caller's read.
        match self.rides.get_mut(&ride.id) {
            Some(mut entry) if entry.version == ride.version => {
                let mut next = ride.clone();
                next.version += 1;
                *entry = next;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_related(&self, user_id: Uuid) -> DomainResult<Vec<Ride>> {
        Ok(self
            .rides
            .iter()
            .filter(|r| r.driver_id == user_id || r.is_passenger(user_id))
            .map(|r| r.clone())
            .collect())
    }

    async fn find_bookable(&self, user_id: Uuid) -> DomainResult<Vec<Ride>> {
        Ok(self
            .rides
            .iter()
            .filter(|r| {
                r.status == RideStatus::Pending
                    && r.driver_id != user_id
                    && !r.is_passenger(user_id)
            })
            .map(|r| r.clone())
            .collect())
    }
}

#[async_trait]
impl HistoryRepository for MemoryProvider {
    async fn insert_unique(&self, record: HistoryRecord) -> DomainResult<bool> {
        let exists = self.history.iter().any(|r| {
            r.ride_id == record.ride_id
                && r.user_id == record.user_id
                && r.event == record.event
        });
        if exists {
            return Ok(false);
        }
        self.history.insert(record.id, record);
        Ok(true)
    }

    async fn find_for_user(&self, user_id: Uuid) -> DomainResult<Vec<HistoryRecord>> {
        let mut records: Vec<HistoryRecord> = self
            .history
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| r.clone())
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    async fn rewrite_for_ride(&self, ride_id: Uuid, message: &str) -> DomainResult<u64> {
        let mut rewritten = 0;
        for mut record in self.history.iter_mut() {
            if record.ride_id == ride_id {
                record.message = message.to_string();
                rewritten += 1;
            }
        }
        Ok(rewritten)
    }

    async fn rewrite_for_participant(
        &self,
        ride_id: Uuid,
        user_id: Uuid,
        message: &str,
    ) -> DomainResult<u64> {
        let mut rewritten = 0;
        for mut record in self.history.iter_mut() {
            if record.ride_id == ride_id && record.user_id == user_id {
                record.message = message.to_string();
                rewritten += 1;
            }
        }
        Ok(rewritten)
    }
}

#[async_trait]
impl NotificationRepository for MemoryProvider {
    async fn insert_many(&self, notifications: Vec<Notification>) -> DomainResult<()> {
        for notification in notifications {
            self.notifications.insert(notification.id, notification);
        }
        Ok(())
    }

    async fn find_unread_for_user(&self, user_id: Uuid) -> DomainResult<Vec<Notification>> {
        let mut out: Vec<Notification> = self
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.read)
            .map(|n| n.clone())
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn mark_read(&self, user_id: Uuid, group_id: Uuid) -> DomainResult<u64> {
        let mut marked = 0;
        for mut notification in self.notifications.iter_mut() {
            if notification.user_id == user_id
                && notification.group_id == group_id
                && !notification.read
            {
                notification.read = true;
                marked += 1;
            }
        }
        Ok(marked)
    }

    async fn delete_for_ride(&self, ride_id: Uuid) -> DomainResult<u64> {
        let before = self.notifications.len() as u64;
        self.notifications.retain(|_, n| n.ride_id != ride_id);
        Ok(before - self.notifications.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn sample_ride() -> Ride {
        Ride::schedule(Uuid::new_v4(), Utc::now() + Duration::hours(2), 3).unwrap()
    }

    #[tokio::test]
    async fn ride_update_is_version_guarded() {
        let store = MemoryProvider::new();
        let ride = sample_ride();
        RideRepository::insert(&store, ride.clone()).await.unwrap();

        let mut first = RideRepository::find_by_id(&store, ride.id)
            .await
            .unwrap()
            .unwrap();
        let second = first.clone();

        first.cancel().unwrap();
        assert!(RideRepository::update(&store, &first).await.unwrap());
        // Stale snapshot loses.
        assert!(!RideRepository::update(&store, &second).await.unwrap());

        let stored = RideRepository::find_by_id(&store, ride.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.status, RideStatus::Cancelled);
    }

    #[tokio::test]
    async fn history_insert_unique_dedupes_on_event_key() {
        let store = MemoryProvider::new();
        let (user, ride) = (Uuid::new_v4(), Uuid::new_v4());
        let record = HistoryRecord::new(
            user,
            ride,
            "Dana Driver".into(),
            crate::domain::HistoryEvent::Booked,
            crate::domain::history::MSG_RIDE_BOOKED,
        );
        assert!(store.insert_unique(record.clone()).await.unwrap());

        let duplicate = HistoryRecord::new(
            user,
            ride,
            "Dana Driver".into(),
            crate::domain::HistoryEvent::Booked,
            crate::domain::history::MSG_RIDE_BOOKED,
        );
        assert!(!store.insert_unique(duplicate).await.unwrap());
        assert_eq!(store.find_for_user(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn notification_sweep_removes_only_that_ride() {
        let store = MemoryProvider::new();
        let user = Uuid::new_v4();
        let (ride_a, ride_b) = (Uuid::new_v4(), Uuid::new_v4());
        let group = Uuid::new_v4();
        store
            .insert_many(vec![
                Notification::new(user, group, ride_a),
                Notification::new(user, group, ride_b),
            ])
            .await
            .unwrap();

        assert_eq!(store.delete_for_ride(ride_a).await.unwrap(), 1);
        let left = store.find_unread_for_user(user).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].ride_id, ride_b);
    }
}
