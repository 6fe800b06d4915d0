//! Create rides table
//!
//! The passenger and pending-credential lists live in JSON text columns so
//! a booking commits the whole aggregate with one version-guarded UPDATE.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Rides::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rides::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Rides::DriverId).uuid().not_null())
                    .col(
                        ColumnDef::new(Rides::ScheduledAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Rides::OfferedSeats).integer().not_null())
                    .col(ColumnDef::new(Rides::SeatsRemaining).integer().not_null())
                    .col(
                        ColumnDef::new(Rides::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Rides::Passengers)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Rides::PendingCredentials)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Rides::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Rides::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rides_driver")
                            .from(Rides::Table, Rides::DriverId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rides_driver")
                    .table(Rides::Table)
                    .col(Rides::DriverId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rides_status")
                    .table(Rides::Table)
                    .col(Rides::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rides::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Rides {
    Table,
    Id,
    DriverId,
    ScheduledAt,
    OfferedSeats,
    SeatsRemaining,
    Status,
    Passengers,
    PendingCredentials,
    CreatedAt,
    Version,
}
