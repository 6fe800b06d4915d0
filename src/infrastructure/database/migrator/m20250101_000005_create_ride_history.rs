//! Create ride_history table

use sea_orm_migration::prelude::*;

use super::m20250101_000004_create_rides::Rides;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RideHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RideHistory::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RideHistory::UserId).uuid().not_null())
                    .col(ColumnDef::new(RideHistory::RideId).uuid().not_null())
                    .col(ColumnDef::new(RideHistory::DriverName).string().not_null())
                    .col(ColumnDef::new(RideHistory::Event).string().not_null())
                    .col(ColumnDef::new(RideHistory::Message).string().not_null())
                    .col(
                        ColumnDef::new(RideHistory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ride_history_ride")
                            .from(RideHistory::Table, RideHistory::RideId)
                            .to(Rides::Table, Rides::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // The audit idempotency key.
        manager
            .create_index(
                Index::create()
                    .name("idx_ride_history_event_key")
                    .table(RideHistory::Table)
                    .col(RideHistory::RideId)
                    .col(RideHistory::UserId)
                    .col(RideHistory::Event)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ride_history_user")
                    .table(RideHistory::Table)
                    .col(RideHistory::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RideHistory::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum RideHistory {
    Table,
    Id,
    UserId,
    RideId,
    DriverName,
    Event,
    Message,
    CreatedAt,
}
