pub mod model;
pub mod repository;

pub use model::{BoardingCode, Booking, Ride, RideStatus};
pub use repository::RideRepository;
