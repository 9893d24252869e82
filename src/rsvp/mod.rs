//! # RSVP tracking
//!
//! Invitations, guest responses and their aggregation. Every operation takes
//! the [`TenantScope`] it acts within; the (guest, event) pair is unique at the
//! storage layer and responses are written with a single upsert per pair.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use metrics::counter;
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{FieldError, RepositoryError};
use crate::models::event::Model as EventModel;
use crate::models::event_guest::{Model as EventGuestModel, RsvpStatus};
use crate::repositories::invitation::ResponseWrite;
use crate::repositories::{
    EventRepository, GuestRepository, InvitationRepository, TenantScope, clean_optional,
};

pub mod export;
pub mod import;
pub mod state;
pub mod stats;

pub use state::RsvpState;
pub use stats::{EventRsvpStats, RsvpStats};

/// One answer within a guest's submission
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RsvpResponse {
    pub event_id: Uuid,
    pub attending: bool,
    #[serde(default)]
    pub plus_one_count: i32,
    #[serde(default)]
    pub plus_one_name: Option<String>,
    #[serde(default)]
    pub meal_choice: Option<String>,
    #[serde(default)]
    pub dietary_notes: Option<String>,
}

/// Result of an invitation request
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InviteOutcome {
    /// Newly created invitations
    pub invited: u64,
    /// Guests that already had an invitation to the event
    pub already_invited: u64,
}

/// A guest's view of one event they can answer for
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GuestEventStatus {
    pub event_id: Uuid,
    pub event_name: String,
    #[schema(value_type = String, format = DateTime)]
    pub starts_at: sea_orm::prelude::DateTimeWithTimeZone,
    pub location: Option<String>,
    pub meal_options: Vec<String>,
    pub state: RsvpState,
    /// False for a public event the guest has not answered yet
    pub invited: bool,
    pub plus_one_count: i32,
    pub plus_one_name: Option<String>,
    pub meal_choice: Option<String>,
    pub dietary_notes: Option<String>,
}

/// Invite guests to an event, keeping any existing invitations as they are.
pub async fn invite_guests<C: ConnectionTrait>(
    db: &C,
    scope: TenantScope,
    event_id: Uuid,
    guest_ids: &[Uuid],
) -> Result<InviteOutcome, RepositoryError> {
    EventRepository::new(db)
        .find(scope, event_id)
        .await?
        .ok_or(RepositoryError::NotFound("Event"))?;

    let unique: Vec<Uuid> = {
        let mut seen = HashSet::new();
        guest_ids.iter().copied().filter(|id| seen.insert(*id)).collect()
    };
    let known = GuestRepository::new(db).ids_in_wedding(scope, &unique).await?;
    if known.len() != unique.len() {
        let known: HashSet<Uuid> = known.into_iter().collect();
        let errors = unique
            .iter()
            .enumerate()
            .filter(|(_, id)| !known.contains(id))
            .map(|(i, _)| FieldError::new(format!("guest_ids[{i}]"), "Unknown guest"))
            .collect();
        return Err(RepositoryError::Validation(errors));
    }

    let invited = InvitationRepository::new(db).invite(event_id, &unique).await?;
    tracing::info!(
        wedding_id = %scope.wedding_id,
        event_id = %event_id,
        invited,
        "Guests invited"
    );

    Ok(InviteOutcome {
        invited,
        already_invited: unique.len() as u64 - invited,
    })
}

/// Record a guest's answers for one or more events.
///
/// Every response is validated before anything is written: the events must
/// belong to the wedding, private events need an existing invitation, the
/// plus-one count cannot be negative and a meal choice must be one of the
/// event's options. The writes then run in one transaction, so a submission is
/// applied entirely or not at all. Resubmitting overwrites the earlier answer.
pub async fn submit_rsvp(
    db: &DatabaseConnection,
    scope: TenantScope,
    guest_id: Uuid,
    responses: Vec<RsvpResponse>,
) -> Result<Vec<GuestEventStatus>, RepositoryError> {
    if responses.is_empty() {
        return Err(RepositoryError::invalid(
            "responses",
            "At least one response is required",
        ));
    }

    GuestRepository::new(db)
        .find(scope, guest_id)
        .await?
        .ok_or(RepositoryError::NotFound("Guest"))?;

    let event_ids: Vec<Uuid> = responses.iter().map(|r| r.event_id).collect();
    let events: HashMap<Uuid, EventModel> = EventRepository::new(db)
        .find_many(scope, &event_ids)
        .await?
        .into_iter()
        .map(|e| (e.id, e))
        .collect();
    let invited_to: HashSet<Uuid> = InvitationRepository::new(db)
        .for_guest(guest_id)
        .await?
        .into_iter()
        .map(|row| row.event_id)
        .collect();

    let writes = validate_responses(guest_id, responses, &events, &invited_to)?;

    let txn = db.begin().await?;
    {
        let invitations = InvitationRepository::new(&txn);
        for write in &writes {
            invitations.upsert_response(write.clone()).await?;
        }
    }
    txn.commit().await?;

    for write in &writes {
        let status = match write.status {
            RsvpStatus::Attending => "attending",
            RsvpStatus::Declined => "declined",
        };
        counter!("rsvp_submissions_total", "status" => status).increment(1);
    }
    tracing::info!(
        wedding_id = %scope.wedding_id,
        guest_id = %guest_id,
        responses = writes.len(),
        "RSVP recorded"
    );

    guest_event_statuses(db, scope, guest_id).await
}

fn validate_responses(
    guest_id: Uuid,
    responses: Vec<RsvpResponse>,
    events: &HashMap<Uuid, EventModel>,
    invited_to: &HashSet<Uuid>,
) -> Result<Vec<ResponseWrite>, RepositoryError> {
    let responded_at = Utc::now().into();
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let mut writes = Vec::with_capacity(responses.len());

    for (i, response) in responses.into_iter().enumerate() {
        let prefix = format!("responses[{i}]");

        if !seen.insert(response.event_id) {
            errors.push(FieldError::new(
                format!("{prefix}.event_id"),
                "Each event may only be answered once per submission",
            ));
            continue;
        }

        let Some(event) = events.get(&response.event_id) else {
            errors.push(FieldError::new(format!("{prefix}.event_id"), "Unknown event"));
            continue;
        };

        if !event.is_public && !invited_to.contains(&event.id) {
            errors.push(FieldError::new(
                format!("{prefix}.event_id"),
                "Guest is not invited to this event",
            ));
        }
        if response.plus_one_count < 0 {
            errors.push(FieldError::new(
                format!("{prefix}.plus_one_count"),
                "Plus-one count cannot be negative",
            ));
        }

        let meal_choice = clean_optional(response.meal_choice);
        if let Some(choice) = meal_choice.as_deref()
            && !event.offers_meal(choice)
        {
            errors.push(FieldError::new(
                format!("{prefix}.meal_choice"),
                format!("'{choice}' is not a meal option for {}", event.name),
            ));
        }

        writes.push(ResponseWrite {
            guest_id,
            event_id: response.event_id,
            status: if response.attending {
                RsvpStatus::Attending
            } else {
                RsvpStatus::Declined
            },
            plus_one_count: response.plus_one_count,
            plus_one_name: clean_optional(response.plus_one_name),
            meal_choice,
            dietary_notes: clean_optional(response.dietary_notes),
            responded_at,
        });
    }

    if errors.is_empty() {
        Ok(writes)
    } else {
        Err(RepositoryError::Validation(errors))
    }
}

/// The events a guest can answer for: public events and private ones they are
/// invited to, each with the guest's current state.
pub async fn guest_event_statuses<C: ConnectionTrait>(
    db: &C,
    scope: TenantScope,
    guest_id: Uuid,
) -> Result<Vec<GuestEventStatus>, RepositoryError> {
    let rows: HashMap<Uuid, EventGuestModel> = InvitationRepository::new(db)
        .for_guest(guest_id)
        .await?
        .into_iter()
        .map(|row| (row.event_id, row))
        .collect();

    let statuses = EventRepository::new(db)
        .list(scope)
        .await?
        .into_iter()
        .filter(|event| event.is_public || rows.contains_key(&event.id))
        .map(|event| {
            let row = rows.get(&event.id);
            GuestEventStatus {
                event_id: event.id,
                meal_options: event.meal_option_list(),
                event_name: event.name,
                starts_at: event.starts_at,
                location: event.location,
                state: row.map(RsvpState::from).unwrap_or(RsvpState::Pending),
                invited: row.is_some(),
                plus_one_count: row.map(|r| r.plus_one_count).unwrap_or(0),
                plus_one_name: row.and_then(|r| r.plus_one_name.clone()),
                meal_choice: row.and_then(|r| r.meal_choice.clone()),
                dietary_notes: row.and_then(|r| r.dietary_notes.clone()),
            }
        })
        .collect();
    Ok(statuses)
}

/// Wedding-wide RSVP statistics.
pub async fn get_rsvp_stats<C: ConnectionTrait>(
    db: &C,
    scope: TenantScope,
) -> Result<RsvpStats, RepositoryError> {
    let rows = InvitationRepository::new(db).for_wedding(scope).await?;
    Ok(RsvpStats::from_rows(&rows))
}

/// Statistics and meal tallies for one event.
pub async fn get_event_rsvp_stats<C: ConnectionTrait>(
    db: &C,
    scope: TenantScope,
    event_id: Uuid,
) -> Result<EventRsvpStats, RepositoryError> {
    EventRepository::new(db)
        .find(scope, event_id)
        .await?
        .ok_or(RepositoryError::NotFound("Event"))?;
    let rows = InvitationRepository::new(db).for_event(scope, event_id).await?;
    Ok(EventRsvpStats::from_rows(event_id, &rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(is_public: bool, meals: &[&str]) -> EventModel {
        let now = Utc.with_ymd_and_hms(2026, 6, 20, 15, 0, 0).unwrap().into();
        EventModel {
            id: Uuid::new_v4(),
            wedding_id: Uuid::new_v4(),
            name: "Reception".to_string(),
            description: None,
            location: None,
            starts_at: now,
            ends_at: None,
            is_public,
            meal_options: serde_json::json!(meals),
            position: 0,
            created_at: now,
        }
    }

    fn response(event_id: Uuid, attending: bool) -> RsvpResponse {
        RsvpResponse {
            event_id,
            attending,
            plus_one_count: 0,
            plus_one_name: None,
            meal_choice: None,
            dietary_notes: None,
        }
    }

    fn field_names(err: RepositoryError) -> Vec<String> {
        match err {
            RepositoryError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_responses_become_writes() {
        let public = event(true, &["Fish", "Vegetarian"]);
        let events = HashMap::from([(public.id, public.clone())]);
        let mut answer = response(public.id, true);
        answer.plus_one_count = 1;
        answer.meal_choice = Some(" Fish ".to_string());

        let writes = validate_responses(Uuid::new_v4(), vec![answer], &events, &HashSet::new())
            .unwrap();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].status, RsvpStatus::Attending);
        assert_eq!(writes[0].meal_choice.as_deref(), Some("Fish"));
    }

    #[test]
    fn one_bad_response_rejects_the_whole_submission() {
        let public = event(true, &["Fish"]);
        let private = event(false, &[]);
        let events = HashMap::from([(public.id, public.clone()), (private.id, private.clone())]);

        let mut bad_meal = response(public.id, true);
        bad_meal.meal_choice = Some("Lobster".to_string());
        let mut negative = response(Uuid::new_v4(), false);
        negative.plus_one_count = -1;

        let err = validate_responses(
            Uuid::new_v4(),
            vec![bad_meal, response(private.id, true), negative],
            &events,
            &HashSet::new(),
        )
        .unwrap_err();

        assert_eq!(
            field_names(err),
            vec![
                "responses[0].meal_choice",
                "responses[1].event_id",
                "responses[2].event_id",
            ]
        );
    }

    #[test]
    fn invited_guests_may_answer_private_events() {
        let private = event(false, &[]);
        let events = HashMap::from([(private.id, private.clone())]);
        let invited = HashSet::from([private.id]);

        let writes =
            validate_responses(Uuid::new_v4(), vec![response(private.id, false)], &events, &invited)
                .unwrap();
        assert_eq!(writes[0].status, RsvpStatus::Declined);
    }

    #[test]
    fn duplicate_event_in_one_submission_is_rejected() {
        let public = event(true, &[]);
        let events = HashMap::from([(public.id, public.clone())]);

        let err = validate_responses(
            Uuid::new_v4(),
            vec![response(public.id, true), response(public.id, false)],
            &events,
            &HashSet::new(),
        )
        .unwrap_err();
        assert_eq!(field_names(err), vec!["responses[1].event_id"]);
    }
}
