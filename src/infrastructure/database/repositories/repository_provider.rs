//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::driver::DriverRepository;
use crate::domain::group::GroupRepository;
use crate::domain::history::HistoryRepository;
use crate::domain::notification::NotificationRepository;
use crate::domain::repositories::RepositoryProvider;
use crate::domain::ride::RideRepository;
use crate::domain::user::UserRepository;

use super::driver_repository::SeaOrmDriverRepository;
use super::group_repository::SeaOrmGroupRepository;
use super::history_repository::SeaOrmHistoryRepository;
use super::notification_repository::SeaOrmNotificationRepository;
use super::ride_repository::SeaOrmRideRepository;
use super::user_repository::SeaOrmUserRepository;

/// Unified repository provider backed by SeaORM. Holds one connection
/// pool and exposes per-aggregate repository accessors.
pub struct SeaOrmRepositoryProvider {
    users: SeaOrmUserRepository,
    drivers: SeaOrmDriverRepository,
    groups: SeaOrmGroupRepository,
    rides: SeaOrmRideRepository,
    history: SeaOrmHistoryRepository,
    notifications: SeaOrmNotificationRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: SeaOrmUserRepository::new(db.clone()),
            drivers: SeaOrmDriverRepository::new(db.clone()),
            groups: SeaOrmGroupRepository::new(db.clone()),
            rides: SeaOrmRideRepository::new(db.clone()),
            history: SeaOrmHistoryRepository::new(db.clone()),
            notifications: SeaOrmNotificationRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn users(&self) -> &dyn UserRepository {
        &self.users
    }

    fn drivers(&self) -> &dyn DriverRepository {
        &self.drivers
    }

    fn groups(&self) -> &dyn GroupRepository {
        &self.groups
    }

    fn rides(&self) -> &dyn RideRepository {
        &self.rides
    }

    fn history(&self) -> &dyn HistoryRepository {
        &self.history
    }

    fn notifications(&self) -> &dyn NotificationRepository {
        &self.notifications
    }
}
