//! # Guest List Handlers
//!
//! Guest CRUD, seating assignment, bulk import and the RSVP CSV export.

use axum::{
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::types::{GuestDto, ListResponse};
use crate::auth::CurrentWedding;
use crate::error::{ApiError, RepositoryError, ValidatedJson, payload_too_large};
use crate::repositories::{GuestRepository, guest::NewGuest};
use crate::rsvp::{export, import::{self, ImportSummary}};
use crate::server::AppState;

/// List the guest list, ordered by name
#[utoipa::path(
    get,
    path = "/api/dashboard/guests",
    security(("session" = [])),
    responses(
        (status = 200, description = "Guests", body = ListResponse<GuestDto>),
        (status = 401, description = "No session", body = ApiError)
    ),
    tag = "guests"
)]
pub async fn list_guests(
    State(state): State<AppState>,
    current: CurrentWedding,
) -> Result<Json<ListResponse<GuestDto>>, ApiError> {
    let guests = GuestRepository::new(&state.db).list(current.scope).await?;
    Ok(Json(ListResponse::new(guests)))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGuestRequest {
    #[schema(example = "Ana Silva")]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub party: Option<String>,
    /// Display hint only; never counted in headcount
    pub party_size: Option<i32>,
}

/// Add a guest
#[utoipa::path(
    post,
    path = "/api/dashboard/guests",
    security(("session" = [])),
    request_body = CreateGuestRequest,
    responses(
        (status = 201, description = "Guest created", body = GuestDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 409, description = "A guest with this name exists", body = ApiError)
    ),
    tag = "guests"
)]
pub async fn create_guest(
    State(state): State<AppState>,
    current: CurrentWedding,
    ValidatedJson(request): ValidatedJson<CreateGuestRequest>,
) -> Result<(StatusCode, Json<GuestDto>), ApiError> {
    let guest = GuestRepository::new(&state.db)
        .create(
            current.scope,
            NewGuest {
                name: request.name,
                email: request.email,
                phone: request.phone,
                party: request.party,
                party_size: request.party_size.unwrap_or(1),
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(guest.into())))
}

/// Remove a guest and their invitations
#[utoipa::path(
    delete,
    path = "/api/dashboard/guests/{guest_id}",
    security(("session" = [])),
    params(("guest_id" = Uuid, Path, description = "Guest to delete")),
    responses(
        (status = 204, description = "Guest deleted"),
        (status = 404, description = "Unknown guest", body = ApiError)
    ),
    tag = "guests"
)]
pub async fn delete_guest(
    State(state): State<AppState>,
    current: CurrentWedding,
    Path(guest_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    GuestRepository::new(&state.db)
        .delete(current.scope, guest_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignTableRequest {
    /// `null` unseats the guest
    pub table_id: Option<Uuid>,
}

/// Seat or unseat a guest
#[utoipa::path(
    put,
    path = "/api/dashboard/guests/{guest_id}/table",
    security(("session" = [])),
    params(("guest_id" = Uuid, Path, description = "Guest to seat")),
    request_body = AssignTableRequest,
    responses(
        (status = 200, description = "Updated guest", body = GuestDto),
        (status = 404, description = "Unknown guest or table", body = ApiError)
    ),
    tag = "guests"
)]
pub async fn assign_table(
    State(state): State<AppState>,
    current: CurrentWedding,
    Path(guest_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<AssignTableRequest>,
) -> Result<Json<GuestDto>, ApiError> {
    let guest = GuestRepository::new(&state.db)
        .assign_table(current.scope, guest_id, request.table_id)
        .await?;
    Ok(Json(guest.into()))
}

/// Bulk import guests from a spreadsheet or delimited file
///
/// The upload goes in the multipart field `file`. Rows that fail validation
/// are reported and skipped; names already on the list are skipped silently.
#[utoipa::path(
    post,
    path = "/api/dashboard/guests/import",
    security(("session" = [])),
    request_body(content_type = "multipart/form-data", description = "Field `file`: .csv, .tsv, .txt, .xlsx, .xls or .ods"),
    responses(
        (status = 200, description = "Import summary", body = ImportSummary),
        (status = 400, description = "Missing or unreadable file", body = ApiError),
        (status = 413, description = "File exceeds the upload limit", body = ApiError)
    ),
    tag = "guests"
)]
pub async fn import_guests(
    State(state): State<AppState>,
    current: CurrentWedding,
    mut multipart: Multipart,
) -> Result<Json<ImportSummary>, ApiError> {
    let limit = state.config.import_max_bytes;

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            if bytes.len() + chunk.len() > limit {
                return Err(payload_too_large(limit));
            }
            bytes.extend_from_slice(&chunk);
        }

        let summary = import::import_guests(&state.db, current.scope, &filename, &bytes).await?;
        return Ok(Json(summary));
    }

    Err(RepositoryError::invalid("file", "A file upload in field 'file' is required").into())
}

pub(crate) fn csv_attachment(filename: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

/// Download every invitation and answer as CSV
#[utoipa::path(
    get,
    path = "/api/dashboard/guests/export",
    security(("session" = [])),
    responses(
        (status = 200, description = "RSVP export", content_type = "text/csv", body = String)
    ),
    tag = "guests"
)]
pub async fn export_guests(
    State(state): State<AppState>,
    current: CurrentWedding,
) -> Result<Response, ApiError> {
    let body = export::export_rsvps(&state.db, current.scope).await?;
    Ok(csv_attachment("rsvps.csv", body))
}
