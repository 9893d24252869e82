//! Migration to create the seating_tables and guests tables.
//!
//! Guest names are unique per wedding regardless of case: `name_key` holds the
//! trimmed, lowercased name and carries the unique index, so bulk imports can
//! skip rows already present with `ON CONFLICT DO NOTHING`.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SeatingTables::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SeatingTables::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SeatingTables::WeddingId).uuid().not_null())
                    .col(ColumnDef::new(SeatingTables::Name).text().not_null())
                    .col(
                        ColumnDef::new(SeatingTables::Capacity)
                            .integer()
                            .not_null()
                            .default(8),
                    )
                    .col(
                        ColumnDef::new(SeatingTables::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_seating_tables_wedding_id")
                            .from(SeatingTables::Table, SeatingTables::WeddingId)
                            .to(Weddings::Table, Weddings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Guests::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Guests::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Guests::WeddingId).uuid().not_null())
                    .col(ColumnDef::new(Guests::Name).text().not_null())
                    .col(ColumnDef::new(Guests::NameKey).text().not_null())
                    .col(ColumnDef::new(Guests::Email).text().null())
                    .col(ColumnDef::new(Guests::Phone).text().null())
                    .col(ColumnDef::new(Guests::Party).text().null())
                    .col(
                        ColumnDef::new(Guests::PartySize)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Guests::TableId).uuid().null())
                    .col(
                        ColumnDef::new(Guests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_guests_wedding_id")
                            .from(Guests::Table, Guests::WeddingId)
                            .to(Weddings::Table, Weddings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_guests_table_id")
                            .from(Guests::Table, Guests::TableId)
                            .to(SeatingTables::Table, SeatingTables::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_guests_wedding_name_key")
                    .table(Guests::Table)
                    .col(Guests::WeddingId)
                    .col(Guests::NameKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_guests_wedding_name_key").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Guests::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(SeatingTables::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SeatingTables {
    Table,
    Id,
    WeddingId,
    Name,
    Capacity,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Guests {
    Table,
    Id,
    WeddingId,
    Name,
    NameKey,
    Email,
    Phone,
    Party,
    PartySize,
    TableId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Weddings {
    Table,
    Id,
}
