pub mod accounts;
pub mod booking;
pub mod drivers;
pub mod fanout;
pub mod groups;
pub mod history;

pub use accounts::AccountService;
pub use booking::BookingService;
pub use drivers::DriverService;
pub use groups::{GroupOverview, GroupService};
pub use history::HistoryService;
