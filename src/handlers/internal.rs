//! # Internal API Handlers
//!
//! Endpoints for trusted infrastructure. Callers must present the shared
//! secret in `x-internal-secret`.

use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::InternalCaller;
use crate::error::ApiError;
use crate::repositories::TenantRepository;
use crate::routing::{ResolvedTenant, TenantLookupResponse, host::normalize_host};
use crate::server::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct LookupQuery {
    /// Custom domain to resolve
    pub domain: String,
}

/// Resolve a verified custom domain to its tenant
#[utoipa::path(
    get,
    path = "/api/internal/tenants/lookup",
    params(LookupQuery),
    security(("internal_secret" = [])),
    responses(
        (status = 200, description = "Lookup result; `tenant` is null unless a verified mapping exists", body = TenantLookupResponse),
        (status = 401, description = "Missing or wrong internal secret", body = ApiError)
    ),
    tag = "internal"
)]
pub async fn lookup_tenant(
    State(state): State<AppState>,
    _caller: InternalCaller,
    Query(query): Query<LookupQuery>,
) -> Result<Json<TenantLookupResponse>, ApiError> {
    let domain = normalize_host(&query.domain);
    let tenant = if domain.is_empty() {
        None
    } else {
        TenantRepository::new(&state.db)
            .find_by_verified_domain(&domain)
            .await?
            .and_then(ResolvedTenant::from_verified)
    };
    Ok(Json(TenantLookupResponse { tenant }))
}
