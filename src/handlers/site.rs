//! # Public Site Handlers
//!
//! Routes under `/{subdomain}`. Tenant hosts reach them through the resolver's
//! path rewrite; the subdomain in the path is the only tenant context.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::types::{EventDto, GiftDto, ListResponse, PhotoDto, WeddingDto};
use crate::error::{ApiError, ValidatedJson, not_found, site_not_found};
use crate::models::guest_photo::PhotoStatus;
use crate::models::tenant::Model as TenantModel;
use crate::models::wedding::Model as WeddingModel;
use crate::repositories::{
    EventRepository, GiftRepository, GuestRepository, PhotoRepository, TenantRepository,
    TenantScope, WeddingRepository,
};
use crate::rsvp::{self, GuestEventStatus, RsvpResponse};
use crate::server::AppState;

struct Site {
    tenant: TenantModel,
    wedding: WeddingModel,
    scope: TenantScope,
}

async fn load_site(state: &AppState, subdomain: &str) -> Result<Site, ApiError> {
    let tenant = TenantRepository::new(&state.db)
        .find_by_subdomain(&subdomain.to_ascii_lowercase())
        .await?
        .ok_or_else(site_not_found)?;
    let wedding = WeddingRepository::new(&state.db)
        .find_by_tenant(tenant.id)
        .await?
        .ok_or_else(site_not_found)?;
    let scope = TenantScope {
        tenant_id: tenant.id,
        wedding_id: wedding.id,
    };
    Ok(Site {
        tenant,
        wedding,
        scope,
    })
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PublicSite {
    pub subdomain: String,
    pub custom_domain: Option<String>,
    pub wedding: WeddingDto,
    /// Public events only
    pub events: Vec<EventDto>,
}

/// Published wedding site content
#[utoipa::path(
    get,
    path = "/{subdomain}",
    params(("subdomain" = String, Path, description = "Tenant subdomain")),
    responses(
        (status = 200, description = "Site content", body = PublicSite),
        (status = 404, description = "No such site", body = ApiError)
    ),
    tag = "site"
)]
pub async fn get_site(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
) -> Result<Json<PublicSite>, ApiError> {
    let site = load_site(&state, &subdomain).await?;
    let events = EventRepository::new(&state.db).list_public(site.scope).await?;

    Ok(Json(PublicSite {
        custom_domain: site.tenant.verified_domain().map(str::to_string),
        subdomain: site.tenant.subdomain,
        wedding: site.wedding.into(),
        events: events.into_iter().map(EventDto::from).collect(),
    }))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct GuestLookupQuery {
    /// Guest name exactly as on the invitation (case-insensitive)
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GuestInvitations {
    pub guest_id: Uuid,
    pub name: String,
    pub party: Option<String>,
    pub events: Vec<GuestEventStatus>,
}

/// Find a guest's invitations by name
#[utoipa::path(
    get,
    path = "/{subdomain}/rsvp/lookup",
    params(("subdomain" = String, Path, description = "Tenant subdomain"), GuestLookupQuery),
    responses(
        (status = 200, description = "Events the guest can answer", body = GuestInvitations),
        (status = 404, description = "Unknown site or guest", body = ApiError)
    ),
    tag = "site"
)]
pub async fn lookup_guest(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
    Query(query): Query<GuestLookupQuery>,
) -> Result<Json<GuestInvitations>, ApiError> {
    let site = load_site(&state, &subdomain).await?;
    let guest = GuestRepository::new(&state.db)
        .find_by_name(site.scope, query.name.trim())
        .await?
        .ok_or_else(|| not_found("Guest"))?;
    let events = rsvp::guest_event_statuses(&state.db, site.scope, guest.id).await?;

    Ok(Json(GuestInvitations {
        guest_id: guest.id,
        name: guest.name,
        party: guest.party,
        events,
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RsvpSubmission {
    pub guest_id: Uuid,
    pub responses: Vec<RsvpResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RsvpConfirmation {
    pub guest_id: Uuid,
    pub events: Vec<GuestEventStatus>,
}

/// Submit RSVP answers for one guest
#[utoipa::path(
    post,
    path = "/{subdomain}/rsvp",
    params(("subdomain" = String, Path, description = "Tenant subdomain")),
    request_body = RsvpSubmission,
    responses(
        (status = 200, description = "Answers recorded; latest submission wins", body = RsvpConfirmation),
        (status = 400, description = "A response was invalid; nothing was recorded", body = ApiError),
        (status = 404, description = "Unknown site or guest", body = ApiError)
    ),
    tag = "site"
)]
pub async fn submit_rsvp(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
    ValidatedJson(submission): ValidatedJson<RsvpSubmission>,
) -> Result<Json<RsvpConfirmation>, ApiError> {
    let site = load_site(&state, &subdomain).await?;
    let events = rsvp::submit_rsvp(
        &state.db,
        site.scope,
        submission.guest_id,
        submission.responses,
    )
    .await?;

    Ok(Json(RsvpConfirmation {
        guest_id: submission.guest_id,
        events,
    }))
}

/// Gift registry
#[utoipa::path(
    get,
    path = "/{subdomain}/registry",
    params(("subdomain" = String, Path, description = "Tenant subdomain")),
    responses(
        (status = 200, description = "Registry items", body = ListResponse<GiftDto>),
        (status = 404, description = "No such site", body = ApiError)
    ),
    tag = "site"
)]
pub async fn list_registry(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
) -> Result<Json<ListResponse<GiftDto>>, ApiError> {
    let site = load_site(&state, &subdomain).await?;
    let gifts = GiftRepository::new(&state.db).list(site.scope).await?;
    Ok(Json(ListResponse {
        data: gifts.into_iter().map(GiftDto::public).collect(),
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ClaimGiftRequest {
    /// Name shown to the couple
    pub name: String,
}

/// Claim a registry item
#[utoipa::path(
    post,
    path = "/{subdomain}/registry/{gift_id}/claim",
    params(
        ("subdomain" = String, Path, description = "Tenant subdomain"),
        ("gift_id" = Uuid, Path, description = "Gift to claim")
    ),
    request_body = ClaimGiftRequest,
    responses(
        (status = 200, description = "Gift claimed", body = GiftDto),
        (status = 404, description = "Unknown site or gift", body = ApiError),
        (status = 409, description = "Already claimed", body = ApiError)
    ),
    tag = "site"
)]
pub async fn claim_gift(
    State(state): State<AppState>,
    Path((subdomain, gift_id)): Path<(String, Uuid)>,
    ValidatedJson(request): ValidatedJson<ClaimGiftRequest>,
) -> Result<Json<GiftDto>, ApiError> {
    let site = load_site(&state, &subdomain).await?;
    let gift = GiftRepository::new(&state.db)
        .claim(site.scope, gift_id, &request.name)
        .await?;
    Ok(Json(GiftDto::public(gift)))
}

fn require_photo_sharing(site: &Site) -> Result<(), ApiError> {
    if site.wedding.photo_sharing_enabled {
        Ok(())
    } else {
        Err(not_found("Photo sharing"))
    }
}

/// Approved guest photos
#[utoipa::path(
    get,
    path = "/{subdomain}/photos",
    params(("subdomain" = String, Path, description = "Tenant subdomain")),
    responses(
        (status = 200, description = "Approved photos", body = ListResponse<PhotoDto>),
        (status = 404, description = "No such site or photo sharing disabled", body = ApiError)
    ),
    tag = "site"
)]
pub async fn list_photos(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
) -> Result<Json<ListResponse<PhotoDto>>, ApiError> {
    let site = load_site(&state, &subdomain).await?;
    require_photo_sharing(&site)?;
    let photos = PhotoRepository::new(&state.db)
        .list(site.scope, Some(PhotoStatus::Approved))
        .await?;
    Ok(Json(ListResponse::new(photos)))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitPhotoRequest {
    /// URL of the already-uploaded image
    pub url: String,
    pub uploader_name: String,
}

/// Submit a photo for moderation
#[utoipa::path(
    post,
    path = "/{subdomain}/photos",
    params(("subdomain" = String, Path, description = "Tenant subdomain")),
    request_body = SubmitPhotoRequest,
    responses(
        (status = 201, description = "Photo queued for moderation", body = PhotoDto),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 404, description = "No such site or photo sharing disabled", body = ApiError)
    ),
    tag = "site"
)]
pub async fn submit_photo(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
    ValidatedJson(request): ValidatedJson<SubmitPhotoRequest>,
) -> Result<(StatusCode, Json<PhotoDto>), ApiError> {
    let site = load_site(&state, &subdomain).await?;
    require_photo_sharing(&site)?;
    let photo = PhotoRepository::new(&state.db)
        .submit(site.scope, &request.url, &request.uploader_name)
        .await?;
    Ok((StatusCode::CREATED, Json(photo.into())))
}
