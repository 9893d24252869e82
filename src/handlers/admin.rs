//! # Admin Back-office Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::types::{ListResponse, TenantDto};
use crate::auth::AdminSession;
use crate::error::ApiError;
use crate::models::user::Role;
use crate::repositories::{TenantRepository, UserRepository};
use crate::server::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminHome {
    pub tenants: u64,
    pub verified_domains: u64,
    pub couples: u64,
}

/// Platform totals
#[utoipa::path(
    get,
    path = "/admin",
    security(("session" = [])),
    responses(
        (status = 200, description = "Platform summary", body = AdminHome),
        (status = 307, description = "Redirect to login or to the couple dashboard")
    ),
    tag = "admin"
)]
pub async fn home(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Result<Json<AdminHome>, ApiError> {
    let tenants = TenantRepository::new(&state.db);
    Ok(Json(AdminHome {
        tenants: tenants.count().await?,
        verified_domains: tenants.count_verified_domains().await?,
        couples: UserRepository::new(&state.db)
            .count_by_role(Role::Couple)
            .await?,
    }))
}

/// List every tenant
#[utoipa::path(
    get,
    path = "/api/admin/tenants",
    security(("session" = [])),
    responses(
        (status = 200, description = "Tenants", body = ListResponse<TenantDto>),
        (status = 403, description = "Not an admin", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn list_tenants(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Result<Json<ListResponse<TenantDto>>, ApiError> {
    let tenants = TenantRepository::new(&state.db).list().await?;
    Ok(Json(ListResponse::new(tenants)))
}

/// Delete a tenant and everything it owns
#[utoipa::path(
    delete,
    path = "/api/admin/tenants/{tenant_id}",
    security(("session" = [])),
    params(("tenant_id" = Uuid, Path, description = "Tenant to delete")),
    responses(
        (status = 204, description = "Tenant deleted"),
        (status = 403, description = "Not an admin", body = ApiError),
        (status = 404, description = "Unknown tenant", body = ApiError)
    ),
    tag = "admin"
)]
pub async fn delete_tenant(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    Path(tenant_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    TenantRepository::new(&state.db).delete(tenant_id).await?;
    tracing::info!(tenant_id = %tenant_id, admin_id = %admin.user_id, "Tenant deleted");
    Ok(StatusCode::NO_CONTENT)
}
