//! # Invitation Repository
//!
//! Data access for `event_guests` rows. Scoping happens through the owning
//! event: every wedding-wide query joins `events` and filters on its
//! `wedding_id`.

use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, JoinType, QueryFilter, QuerySelect, RelationTrait,
    Set,
    prelude::DateTimeWithTimeZone,
    sea_query::OnConflict,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::event;
use crate::models::event_guest::{self, Entity as EventGuest, Model as EventGuestModel, RsvpStatus};

use super::TenantScope;

/// A validated answer ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseWrite {
    pub guest_id: Uuid,
    pub event_id: Uuid,
    pub status: RsvpStatus,
    pub plus_one_count: i32,
    pub plus_one_name: Option<String>,
    pub meal_choice: Option<String>,
    pub dietary_notes: Option<String>,
    pub responded_at: DateTimeWithTimeZone,
}

pub struct InvitationRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> InvitationRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Create pending invitations, leaving existing (guest, event) rows untouched.
    ///
    /// Callers must have checked that the event and guests share a wedding.
    /// Returns the number of new rows.
    pub async fn invite(&self, event_id: Uuid, guest_ids: &[Uuid]) -> Result<u64, RepositoryError> {
        if guest_ids.is_empty() {
            return Ok(0);
        }

        let now: DateTimeWithTimeZone = Utc::now().into();
        let rows = guest_ids.iter().map(|guest_id| event_guest::ActiveModel {
            id: Set(Uuid::new_v4()),
            event_id: Set(event_id),
            guest_id: Set(*guest_id),
            rsvp_status: Set(None),
            plus_one_count: Set(0),
            plus_one_name: Set(None),
            meal_choice: Set(None),
            dietary_notes: Set(None),
            responded_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        });

        let inserted = EventGuest::insert_many(rows)
            .on_conflict(
                OnConflict::columns([event_guest::Column::GuestId, event_guest::Column::EventId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db)
            .await?;
        Ok(inserted)
    }

    /// Write an answer with a single `INSERT .. ON CONFLICT DO UPDATE`.
    ///
    /// The unique (guest_id, event_id) index decides between insert and
    /// overwrite, so concurrent submissions can never produce two rows.
    pub async fn upsert_response(&self, write: ResponseWrite) -> Result<(), RepositoryError> {
        let row = event_guest::ActiveModel {
            id: Set(Uuid::new_v4()),
            event_id: Set(write.event_id),
            guest_id: Set(write.guest_id),
            rsvp_status: Set(Some(write.status)),
            plus_one_count: Set(write.plus_one_count),
            plus_one_name: Set(write.plus_one_name),
            meal_choice: Set(write.meal_choice),
            dietary_notes: Set(write.dietary_notes),
            responded_at: Set(Some(write.responded_at)),
            created_at: Set(write.responded_at),
            updated_at: Set(write.responded_at),
        };

        EventGuest::insert(row)
            .on_conflict(
                OnConflict::columns([event_guest::Column::GuestId, event_guest::Column::EventId])
                    .update_columns([
                        event_guest::Column::RsvpStatus,
                        event_guest::Column::PlusOneCount,
                        event_guest::Column::PlusOneName,
                        event_guest::Column::MealChoice,
                        event_guest::Column::DietaryNotes,
                        event_guest::Column::RespondedAt,
                        event_guest::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db)
            .await?;
        Ok(())
    }

    pub async fn for_guest(&self, guest_id: Uuid) -> Result<Vec<EventGuestModel>, RepositoryError> {
        Ok(EventGuest::find()
            .filter(event_guest::Column::GuestId.eq(guest_id))
            .all(self.db)
            .await?)
    }

    /// Invitations to one event of this wedding.
    pub async fn for_event(
        &self,
        scope: TenantScope,
        event_id: Uuid,
    ) -> Result<Vec<EventGuestModel>, RepositoryError> {
        Ok(EventGuest::find()
            .join(JoinType::InnerJoin, event_guest::Relation::Event.def())
            .filter(event::Column::WeddingId.eq(scope.wedding_id))
            .filter(event_guest::Column::EventId.eq(event_id))
            .all(self.db)
            .await?)
    }

    /// Every invitation across the wedding's events.
    pub async fn for_wedding(
        &self,
        scope: TenantScope,
    ) -> Result<Vec<EventGuestModel>, RepositoryError> {
        Ok(EventGuest::find()
            .join(JoinType::InnerJoin, event_guest::Relation::Event.def())
            .filter(event::Column::WeddingId.eq(scope.wedding_id))
            .all(self.db)
            .await?)
    }
}
