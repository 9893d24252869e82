//! # Event and RSVP Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::types::{EventDto, ListResponse};
use crate::auth::CurrentWedding;
use crate::error::{ApiError, ValidatedJson};
use crate::repositories::{EventRepository, event::NewEvent};
use crate::rsvp::{self, EventRsvpStats, InviteOutcome, RsvpStats};
use crate::server::AppState;

/// List events in display order
#[utoipa::path(
    get,
    path = "/api/dashboard/events",
    security(("session" = [])),
    responses((status = 200, description = "Events", body = ListResponse<EventDto>)),
    tag = "events"
)]
pub async fn list_events(
    State(state): State<AppState>,
    current: CurrentWedding,
) -> Result<Json<ListResponse<EventDto>>, ApiError> {
    let events = EventRepository::new(&state.db).list(current.scope).await?;
    Ok(Json(ListResponse::new(events)))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    #[schema(example = "Reception")]
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    /// RFC 3339 timestamp
    #[schema(value_type = String, format = DateTime)]
    pub starts_at: DateTime<FixedOffset>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub ends_at: Option<DateTime<FixedOffset>>,
    /// Public events accept answers without an invitation
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    #[schema(example = json!(["Beef", "Fish", "Vegetarian"]))]
    pub meal_options: Vec<String>,
}

/// Create an event
#[utoipa::path(
    post,
    path = "/api/dashboard/events",
    security(("session" = [])),
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventDto),
        (status = 400, description = "Validation failed", body = ApiError)
    ),
    tag = "events"
)]
pub async fn create_event(
    State(state): State<AppState>,
    current: CurrentWedding,
    ValidatedJson(request): ValidatedJson<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventDto>), ApiError> {
    let event = EventRepository::new(&state.db)
        .create(
            current.scope,
            NewEvent {
                name: request.name,
                description: request.description,
                location: request.location,
                starts_at: request.starts_at,
                ends_at: request.ends_at,
                is_public: request.is_public,
                meal_options: request.meal_options,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(event.into())))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct InviteGuestsRequest {
    pub guest_ids: Vec<Uuid>,
}

/// Invite guests to an event
///
/// Existing invitations, and any answers on them, are left untouched.
#[utoipa::path(
    post,
    path = "/api/dashboard/events/{event_id}/invitations",
    security(("session" = [])),
    params(("event_id" = Uuid, Path, description = "Event to invite to")),
    request_body = InviteGuestsRequest,
    responses(
        (status = 200, description = "Invitation counts", body = InviteOutcome),
        (status = 400, description = "Unknown guest ids", body = ApiError),
        (status = 404, description = "Unknown event", body = ApiError)
    ),
    tag = "events"
)]
pub async fn invite_guests(
    State(state): State<AppState>,
    current: CurrentWedding,
    Path(event_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<InviteGuestsRequest>,
) -> Result<Json<InviteOutcome>, ApiError> {
    let outcome =
        rsvp::invite_guests(&state.db, current.scope, event_id, &request.guest_ids).await?;
    Ok(Json(outcome))
}

/// Totals and meal tallies for one event
#[utoipa::path(
    get,
    path = "/api/dashboard/events/{event_id}/stats",
    security(("session" = [])),
    params(("event_id" = Uuid, Path, description = "Event")),
    responses(
        (status = 200, description = "Event statistics", body = EventRsvpStats),
        (status = 404, description = "Unknown event", body = ApiError)
    ),
    tag = "events"
)]
pub async fn event_stats(
    State(state): State<AppState>,
    current: CurrentWedding,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventRsvpStats>, ApiError> {
    Ok(Json(
        rsvp::get_event_rsvp_stats(&state.db, current.scope, event_id).await?,
    ))
}

/// Totals across every event of the wedding
#[utoipa::path(
    get,
    path = "/api/dashboard/rsvp/stats",
    security(("session" = [])),
    responses((status = 200, description = "RSVP statistics", body = RsvpStats)),
    tag = "events"
)]
pub async fn rsvp_stats(
    State(state): State<AppState>,
    current: CurrentWedding,
) -> Result<Json<RsvpStats>, ApiError> {
    Ok(Json(rsvp::get_rsvp_stats(&state.db, current.scope).await?))
}
