//! # Gift Registry and Photo Moderation Handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::types::{GiftDto, ListResponse, PhotoDto};
use crate::auth::CurrentWedding;
use crate::error::{ApiError, ValidatedJson};
use crate::models::guest_photo::PhotoStatus;
use crate::repositories::{GiftRepository, PhotoRepository, gift::NewGift};
use crate::server::AppState;

/// List registry items, including who claimed them
#[utoipa::path(
    get,
    path = "/api/dashboard/gifts",
    security(("session" = [])),
    responses((status = 200, description = "Registry items", body = ListResponse<GiftDto>)),
    tag = "registry"
)]
pub async fn list_gifts(
    State(state): State<AppState>,
    current: CurrentWedding,
) -> Result<Json<ListResponse<GiftDto>>, ApiError> {
    let gifts = GiftRepository::new(&state.db).list(current.scope).await?;
    Ok(Json(ListResponse::new(gifts)))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGiftRequest {
    #[schema(example = "Espresso machine")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = 45000)]
    pub target_amount_cents: i64,
}

/// Add a registry item
#[utoipa::path(
    post,
    path = "/api/dashboard/gifts",
    security(("session" = [])),
    request_body = CreateGiftRequest,
    responses(
        (status = 201, description = "Item created", body = GiftDto),
        (status = 400, description = "Validation failed", body = ApiError)
    ),
    tag = "registry"
)]
pub async fn create_gift(
    State(state): State<AppState>,
    current: CurrentWedding,
    ValidatedJson(request): ValidatedJson<CreateGiftRequest>,
) -> Result<(StatusCode, Json<GiftDto>), ApiError> {
    let gift = GiftRepository::new(&state.db)
        .create(
            current.scope,
            NewGift {
                name: request.name,
                description: request.description,
                target_amount_cents: request.target_amount_cents,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(gift.into())))
}

/// Remove a registry item
#[utoipa::path(
    delete,
    path = "/api/dashboard/gifts/{gift_id}",
    security(("session" = [])),
    params(("gift_id" = Uuid, Path, description = "Item to delete")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "Unknown item", body = ApiError)
    ),
    tag = "registry"
)]
pub async fn delete_gift(
    State(state): State<AppState>,
    current: CurrentWedding,
    Path(gift_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    GiftRepository::new(&state.db)
        .delete(current.scope, gift_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PhotoFilter {
    /// Only photos in this moderation state
    pub status: Option<PhotoStatus>,
}

/// List guest photos for moderation
#[utoipa::path(
    get,
    path = "/api/dashboard/photos",
    security(("session" = [])),
    params(PhotoFilter),
    responses((status = 200, description = "Photos", body = ListResponse<PhotoDto>)),
    tag = "photos"
)]
pub async fn list_photos(
    State(state): State<AppState>,
    current: CurrentWedding,
    Query(filter): Query<PhotoFilter>,
) -> Result<Json<ListResponse<PhotoDto>>, ApiError> {
    let photos = PhotoRepository::new(&state.db)
        .list(current.scope, filter.status)
        .await?;
    Ok(Json(ListResponse::new(photos)))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ModeratePhotoRequest {
    pub status: PhotoStatus,
}

/// Approve or reject a photo
#[utoipa::path(
    put,
    path = "/api/dashboard/photos/{photo_id}",
    security(("session" = [])),
    params(("photo_id" = Uuid, Path, description = "Photo to moderate")),
    request_body = ModeratePhotoRequest,
    responses(
        (status = 200, description = "Updated photo", body = PhotoDto),
        (status = 404, description = "Unknown photo", body = ApiError)
    ),
    tag = "photos"
)]
pub async fn moderate_photo(
    State(state): State<AppState>,
    current: CurrentWedding,
    Path(photo_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<ModeratePhotoRequest>,
) -> Result<Json<PhotoDto>, ApiError> {
    let photo = PhotoRepository::new(&state.db)
        .set_status(current.scope, photo_id, request.status)
        .await?;
    Ok(Json(photo.into()))
}
