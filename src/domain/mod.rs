pub mod driver;
pub mod group;
pub mod history;
pub mod notification;
pub mod repositories;
pub mod ride;
pub mod user;

// Re-export commonly used types
pub use driver::Driver;
pub use group::Group;
pub use history::{HistoryEvent, HistoryRecord};
pub use notification::Notification;
pub use repositories::RepositoryProvider;
pub use ride::{BoardingCode, Booking, Ride, RideStatus};
pub use user::User;
