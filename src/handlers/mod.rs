//! # API Handlers
//!
//! HTTP endpoint handlers for the wedding platform: public tenant sites, the
//! couple dashboard, the admin back-office and the internal lookup API.

use axum::{
    extract::{Query, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::db;
use crate::error::{ApiError, service_unavailable};
use crate::models::ServiceInfo;
use crate::server::AppState;

pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod domains;
pub mod events;
pub mod guests;
pub mod internal;
pub mod registry;
pub mod seating;
pub mod site;
pub mod types;

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    #[schema(example = "ok")]
    pub status: String,
}

/// Liveness plus a database round trip
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthStatus),
        (status = 503, description = "Database unreachable", body = ApiError)
    ),
    tag = "root"
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthStatus>, ApiError> {
    if let Err(err) = db::health_check(&state.db).await {
        tracing::warn!(error = %err, "Health check failed");
        return Err(service_unavailable("Database unavailable"));
    }
    Ok(Json(HealthStatus {
        status: "ok".to_string(),
    }))
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LoginPageQuery {
    /// Path to return to after signing in
    pub next: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginPage {
    /// Endpoint accepting credentials
    #[schema(example = "/api/auth/login")]
    pub login_endpoint: String,
    #[schema(example = "/dashboard")]
    pub next: String,
}

/// Redirect target for gated pages
#[utoipa::path(
    get,
    path = "/login",
    params(LoginPageQuery),
    responses((status = 200, description = "Login landing", body = LoginPage)),
    tag = "auth"
)]
pub async fn login_page(Query(query): Query<LoginPageQuery>) -> Json<LoginPage> {
    // Only same-site relative paths are honored.
    let next = query
        .next
        .filter(|next| next.starts_with('/') && !next.starts_with("//"))
        .unwrap_or_else(|| "/dashboard".to_string());
    Json(LoginPage {
        login_endpoint: "/api/auth/login".to_string(),
        next,
    })
}

#[cfg(test)]
mod tests;
