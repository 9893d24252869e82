//! # Custom Domain Handlers

use axum::{extract::State, response::Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::CoupleSession;
use crate::domains::{self, DomainView};
use crate::error::{ApiError, ValidatedJson};
use crate::server::AppState;

/// Current custom domain, status and DNS records to publish
#[utoipa::path(
    get,
    path = "/api/dashboard/domain",
    security(("session" = [])),
    responses(
        (status = 200, description = "Domain state", body = DomainView),
        (status = 502, description = "Provider error", body = ApiError)
    ),
    tag = "domains"
)]
pub async fn get_domain(
    State(state): State<AppState>,
    couple: CoupleSession,
) -> Result<Json<DomainView>, ApiError> {
    let view = domains::domain_status(
        &state.db,
        &state.config,
        state.domain_provider.as_deref(),
        couple.tenant_id,
    )
    .await?;
    Ok(Json(view))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddDomainRequest {
    #[schema(example = "anaandben.com")]
    pub domain: String,
}

/// Attach a custom domain
#[utoipa::path(
    post,
    path = "/api/dashboard/domain",
    security(("session" = [])),
    request_body = AddDomainRequest,
    responses(
        (status = 200, description = "Domain attached, pending verification", body = DomainView),
        (status = 400, description = "Invalid domain", body = ApiError),
        (status = 409, description = "Domain used by another site", body = ApiError),
        (status = 502, description = "Provider error", body = ApiError),
        (status = 503, description = "Custom domains not configured", body = ApiError)
    ),
    tag = "domains"
)]
pub async fn add_domain(
    State(state): State<AppState>,
    couple: CoupleSession,
    ValidatedJson(request): ValidatedJson<AddDomainRequest>,
) -> Result<Json<DomainView>, ApiError> {
    let view = domains::add_custom_domain(
        &state.db,
        &state.config,
        state.domain_provider.as_deref(),
        couple.tenant_id,
        &request.domain,
    )
    .await?;
    Ok(Json(view))
}

/// Detach the custom domain
#[utoipa::path(
    delete,
    path = "/api/dashboard/domain",
    security(("session" = [])),
    responses(
        (status = 200, description = "Domain removed", body = DomainView),
        (status = 503, description = "Custom domains not configured", body = ApiError)
    ),
    tag = "domains"
)]
pub async fn remove_domain(
    State(state): State<AppState>,
    couple: CoupleSession,
) -> Result<Json<DomainView>, ApiError> {
    let view = domains::remove_custom_domain(
        &state.db,
        state.domain_provider.as_deref(),
        couple.tenant_id,
    )
    .await?;
    Ok(Json(view))
}

/// Ask the provider to verify ownership now
#[utoipa::path(
    post,
    path = "/api/dashboard/domain/verify",
    security(("session" = [])),
    responses(
        (status = 200, description = "Verification result", body = DomainView),
        (status = 404, description = "No custom domain attached", body = ApiError),
        (status = 503, description = "Custom domains not configured", body = ApiError)
    ),
    tag = "domains"
)]
pub async fn verify_domain(
    State(state): State<AppState>,
    couple: CoupleSession,
) -> Result<Json<DomainView>, ApiError> {
    let view = domains::verify_custom_domain(
        &state.db,
        &state.config,
        state.domain_provider.as_deref(),
        couple.tenant_id,
    )
    .await?;
    Ok(Json(view))
}
