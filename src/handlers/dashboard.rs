//! # Couple Dashboard Handlers
//!
//! The dashboard landing page and the wedding settings API. The tenant comes
//! from the session, never from the request.

use axum::{extract::State, response::Json};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use super::types::{TenantDto, WeddingDto};
use crate::auth::CurrentWedding;
use crate::error::{ApiError, ValidatedJson, not_found};
use crate::models::sections::{ContentSection, ThemeSettings};
use crate::repositories::{TenantRepository, WeddingRepository, wedding::WeddingChanges};
use crate::rsvp::{self, RsvpStats};
use crate::server::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardHome {
    pub tenant: TenantDto,
    pub wedding: WeddingDto,
    pub rsvp: RsvpStats,
}

/// Couple home: site, wedding and RSVP totals
#[utoipa::path(
    get,
    path = "/dashboard",
    security(("session" = [])),
    responses(
        (status = 200, description = "Dashboard summary", body = DashboardHome),
        (status = 307, description = "Redirect to login or to the admin home")
    ),
    tag = "dashboard"
)]
pub async fn home(
    State(state): State<AppState>,
    current: CurrentWedding,
) -> Result<Json<DashboardHome>, ApiError> {
    let tenant = TenantRepository::new(&state.db)
        .find_by_id(current.scope.tenant_id)
        .await?
        .ok_or_else(|| not_found("Tenant"))?;
    let rsvp = rsvp::get_rsvp_stats(&state.db, current.scope).await?;

    Ok(Json(DashboardHome {
        tenant: tenant.into(),
        wedding: current.wedding.into(),
        rsvp,
    }))
}

/// Get the couple's wedding
#[utoipa::path(
    get,
    path = "/api/dashboard/wedding",
    security(("session" = [])),
    responses(
        (status = 200, description = "Wedding settings and content", body = WeddingDto),
        (status = 401, description = "No session", body = ApiError),
        (status = 403, description = "Not a couple account", body = ApiError)
    ),
    tag = "dashboard"
)]
pub async fn get_wedding(current: CurrentWedding) -> Json<WeddingDto> {
    Json(current.wedding.into())
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial update; omitted fields are left as they are
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateWeddingRequest {
    pub partner_one: Option<String>,
    pub partner_two: Option<String>,
    /// `null` clears the date
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>, format = Date)]
    pub wedding_date: Option<Option<NaiveDate>>,
    pub theme: Option<ThemeSettings>,
    pub sections: Option<Vec<ContentSection>>,
    pub photo_sharing_enabled: Option<bool>,
}

/// Update wedding details, theme or content sections
#[utoipa::path(
    put,
    path = "/api/dashboard/wedding",
    security(("session" = [])),
    request_body = UpdateWeddingRequest,
    responses(
        (status = 200, description = "Updated wedding", body = WeddingDto),
        (status = 400, description = "Validation failed", body = ApiError)
    ),
    tag = "dashboard"
)]
pub async fn update_wedding(
    State(state): State<AppState>,
    current: CurrentWedding,
    ValidatedJson(request): ValidatedJson<UpdateWeddingRequest>,
) -> Result<Json<WeddingDto>, ApiError> {
    let changes = WeddingChanges {
        partner_one: request.partner_one,
        partner_two: request.partner_two,
        wedding_date: request.wedding_date,
        theme: request.theme,
        sections: request.sections,
        photo_sharing_enabled: request.photo_sharing_enabled,
    };
    let wedding = WeddingRepository::new(&state.db)
        .update(current.scope, changes)
        .await?;
    Ok(Json(wedding.into()))
}
