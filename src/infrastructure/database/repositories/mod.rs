//! SeaORM repository implementations

mod driver_repository;
mod group_repository;
mod history_repository;
mod notification_repository;
mod repository_provider;
mod ride_repository;
mod user_repository;

pub use driver_repository::SeaOrmDriverRepository;
pub use group_repository::SeaOrmGroupRepository;
pub use history_repository::SeaOrmHistoryRepository;
pub use notification_repository::SeaOrmNotificationRepository;
pub use repository_provider::SeaOrmRepositoryProvider;
pub use ride_repository::SeaOrmRideRepository;
pub use user_repository::SeaOrmUserRepository;

use crate::shared::DomainError;

pub(crate) fn db_err(e: sea_orm::DbErr) -> DomainError {
    DomainError::Storage(format!("Database error: {}", e))
}
