//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_users;
mod m20250101_000002_create_drivers;
mod m20250101_000003_create_groups;
mod m20250101_000004_create_rides;
mod m20250101_000005_create_ride_history;
mod m20250101_000006_create_notifications;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_users::Migration),
            Box::new(m20250101_000002_create_drivers::Migration),
            Box::new(m20250101_000003_create_groups::Migration),
            Box::new(m20250101_000004_create_rides::Migration),
            Box::new(m20250101_000005_create_ride_history::Migration),
            Box::new(m20250101_000006_create_notifications::Migration),
        ]
    }
}
