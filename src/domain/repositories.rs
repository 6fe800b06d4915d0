//! Storage facade: one object granting access to every repository.

use crate::domain::driver::DriverRepository;
use crate::domain::group::GroupRepository;
use crate::domain::history::HistoryRepository;
use crate::domain::notification::NotificationRepository;
use crate::domain::ride::RideRepository;
use crate::domain::user::UserRepository;

/// Implemented by each storage backend (SeaORM, in-memory). Services hold
/// an `Arc<dyn RepositoryProvider>` and never see a concrete backend.
pub trait RepositoryProvider: Send + Sync {
    fn users(&self) -> &dyn UserRepository;
    fn drivers(&self) -> &dyn DriverRepository;
    fn groups(&self) -> &dyn GroupRepository;
    fn rides(&self) -> &dyn RideRepository;
    fn history(&self) -> &dyn HistoryRepository;
    fn notifications(&self) -> &dyn NotificationRepository;
}
