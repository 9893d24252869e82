//! # Seating Handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Json, Response},
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::guests::csv_attachment;
use super::types::{ListResponse, SeatingTableDto};
use crate::auth::CurrentWedding;
use crate::error::{ApiError, ValidatedJson};
use crate::repositories::SeatingRepository;
use crate::rsvp::export;
use crate::server::AppState;

/// List seating tables
#[utoipa::path(
    get,
    path = "/api/dashboard/seating/tables",
    security(("session" = [])),
    responses((status = 200, description = "Tables", body = ListResponse<SeatingTableDto>)),
    tag = "seating"
)]
pub async fn list_tables(
    State(state): State<AppState>,
    current: CurrentWedding,
) -> Result<Json<ListResponse<SeatingTableDto>>, ApiError> {
    let tables = SeatingRepository::new(&state.db)
        .list_tables(current.scope)
        .await?;
    Ok(Json(ListResponse::new(tables)))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTableRequest {
    #[schema(example = "Table 1")]
    pub name: String,
    #[schema(example = 8)]
    pub capacity: i32,
}

/// Create a seating table
#[utoipa::path(
    post,
    path = "/api/dashboard/seating/tables",
    security(("session" = [])),
    request_body = CreateTableRequest,
    responses(
        (status = 201, description = "Table created", body = SeatingTableDto),
        (status = 400, description = "Validation failed", body = ApiError)
    ),
    tag = "seating"
)]
pub async fn create_table(
    State(state): State<AppState>,
    current: CurrentWedding,
    ValidatedJson(request): ValidatedJson<CreateTableRequest>,
) -> Result<(StatusCode, Json<SeatingTableDto>), ApiError> {
    let table = SeatingRepository::new(&state.db)
        .create_table(current.scope, &request.name, request.capacity)
        .await?;
    Ok((StatusCode::CREATED, Json(table.into())))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct SeatingExportQuery {
    /// Event whose attending guests are exported
    pub event_id: Uuid,
}

/// Download the seating chart for one event as CSV
#[utoipa::path(
    get,
    path = "/api/dashboard/seating/export",
    security(("session" = [])),
    params(SeatingExportQuery),
    responses(
        (status = 200, description = "Seating chart", content_type = "text/csv", body = String),
        (status = 404, description = "Unknown event", body = ApiError)
    ),
    tag = "seating"
)]
pub async fn export_seating(
    State(state): State<AppState>,
    current: CurrentWedding,
    Query(query): Query<SeatingExportQuery>,
) -> Result<Response, ApiError> {
    let body = export::export_seating(&state.db, current.scope, query.event_id).await?;
    Ok(csv_attachment("seating.csv", body))
}
