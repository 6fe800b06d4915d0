//! SeaORM entities

pub mod driver;
pub mod group;
pub mod group_member;
pub mod notification;
pub mod ride;
pub mod ride_history;
pub mod user;
