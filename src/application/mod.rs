pub mod context;
pub mod services;

pub use context::CallerContext;
pub use services::{
    AccountService, BookingService, DriverService, GroupService, HistoryService,
};
