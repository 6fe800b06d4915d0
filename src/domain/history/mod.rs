pub mod model;
pub mod repository;

pub use model::{
    HistoryEvent, HistoryRecord, MSG_CANCELLED_BY_DRIVER, MSG_CANCELLED_BY_USER,
    MSG_RIDE_BOOKED, MSG_RIDE_COMPLETED, MSG_RIDE_CREATED,
};
pub use repository::HistoryRepository;
