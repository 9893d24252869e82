//! Migration to create the events and event_guests tables.
//!
//! `event_guests` carries the invitation and RSVP answer for one guest at one
//! event. The unique (guest_id, event_id) index is the authority for "at most
//! one row per pair"; the RSVP write path upserts against it.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Events::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Events::WeddingId).uuid().not_null())
                    .col(ColumnDef::new(Events::Name).text().not_null())
                    .col(ColumnDef::new(Events::Description).text().null())
                    .col(ColumnDef::new(Events::Location).text().null())
                    .col(
                        ColumnDef::new(Events::StartsAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Events::EndsAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Events::IsPublic)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Events::MealOptions).json_binary().not_null())
                    .col(
                        ColumnDef::new(Events::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Events::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_wedding_id")
                            .from(Events::Table, Events::WeddingId)
                            .to(Weddings::Table, Weddings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EventGuests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventGuests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EventGuests::EventId).uuid().not_null())
                    .col(ColumnDef::new(EventGuests::GuestId).uuid().not_null())
                    .col(ColumnDef::new(EventGuests::RsvpStatus).text().null())
                    .col(
                        ColumnDef::new(EventGuests::PlusOneCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(EventGuests::PlusOneName).text().null())
                    .col(ColumnDef::new(EventGuests::MealChoice).text().null())
                    .col(ColumnDef::new(EventGuests::DietaryNotes).text().null())
                    .col(
                        ColumnDef::new(EventGuests::RespondedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(EventGuests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(EventGuests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_guests_event_id")
                            .from(EventGuests::Table, EventGuests::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_guests_guest_id")
                            .from(EventGuests::Table, EventGuests::GuestId)
                            .to(Guests::Table, Guests::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_guests_guest_event")
                    .table(EventGuests::Table)
                    .col(EventGuests::GuestId)
                    .col(EventGuests::EventId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_guests_event_id")
                    .table(EventGuests::Table)
                    .col(EventGuests::EventId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_event_guests_guest_event")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(Index::drop().name("idx_event_guests_event_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(EventGuests::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    WeddingId,
    Name,
    Description,
    Location,
    StartsAt,
    EndsAt,
    IsPublic,
    MealOptions,
    Position,
    CreatedAt,
}

#[derive(DeriveIden)]
enum EventGuests {
    Table,
    Id,
    EventId,
    GuestId,
    RsvpStatus,
    PlusOneCount,
    PlusOneName,
    MealChoice,
    DietaryNotes,
    RespondedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Weddings {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Guests {
    Table,
    Id,
}
