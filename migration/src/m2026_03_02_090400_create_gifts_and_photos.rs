//! Migration to create the gift_items and guest_photos tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GiftItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GiftItems::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(GiftItems::WeddingId).uuid().not_null())
                    .col(ColumnDef::new(GiftItems::Name).text().not_null())
                    .col(ColumnDef::new(GiftItems::Description).text().null())
                    .col(
                        ColumnDef::new(GiftItems::TargetAmountCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GiftItems::Claimed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(GiftItems::ClaimedBy).text().null())
                    .col(
                        ColumnDef::new(GiftItems::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GiftItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_gift_items_wedding_id")
                            .from(GiftItems::Table, GiftItems::WeddingId)
                            .to(Weddings::Table, Weddings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GuestPhotos::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GuestPhotos::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GuestPhotos::WeddingId).uuid().not_null())
                    .col(ColumnDef::new(GuestPhotos::Url).text().not_null())
                    .col(ColumnDef::new(GuestPhotos::UploaderName).text().not_null())
                    .col(
                        ColumnDef::new(GuestPhotos::Status)
                            .text()
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(
                        ColumnDef::new(GuestPhotos::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_guest_photos_wedding_id")
                            .from(GuestPhotos::Table, GuestPhotos::WeddingId)
                            .to(Weddings::Table, Weddings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GuestPhotos::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(GiftItems::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum GiftItems {
    Table,
    Id,
    WeddingId,
    Name,
    Description,
    TargetAmountCents,
    Claimed,
    ClaimedBy,
    Position,
    CreatedAt,
}

#[derive(DeriveIden)]
enum GuestPhotos {
    Table,
    Id,
    WeddingId,
    Url,
    UploaderName,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Weddings {
    Table,
    Id,
}
