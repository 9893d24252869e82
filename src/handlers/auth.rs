//! # Account API Handlers
//!
//! Couple signup and password login. Both return a session token in the body
//! and as the `session` cookie.

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use chrono::NaiveDate;
use sea_orm::TransactionTrait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::auth::session::{Session, issue_token, session_cookie};
use crate::error::{ApiError, FieldError, RepositoryError, ValidatedJson, unauthorized};
use crate::models::user::Role;
use crate::repositories::{TenantRepository, UserRepository, WeddingRepository};
use crate::server::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    #[schema(example = "ana@example.com")]
    pub email: String,
    pub password: String,
    /// Requested site label under the root domain
    #[schema(example = "ana-and-ben")]
    pub subdomain: String,
    pub partner_one: String,
    pub partner_two: String,
    #[schema(value_type = Option<String>, format = Date)]
    pub wedding_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub token: String,
    pub user_id: Uuid,
    pub role: Role,
    pub tenant_id: Option<Uuid>,
    /// Seconds until the token expires
    pub expires_in: u64,
}

fn session_response(
    state: &AppState,
    status: StatusCode,
    session: Session,
) -> Result<Response, ApiError> {
    let token = issue_token(&state.config, &session)
        .map_err(|e| anyhow::anyhow!("failed to sign session token: {e}"))?;
    let cookie = session_cookie(&state.config, &token);
    let body = SessionResponse {
        token,
        user_id: session.user_id,
        role: session.role,
        tenant_id: session.tenant_id,
        expires_in: state.config.session_ttl_seconds,
    };
    Ok((status, [(header::SET_COOKIE, cookie)], Json(body)).into_response())
}

/// Create a couple account with its tenant and wedding
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created; session cookie set", body = SessionResponse),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 409, description = "E-mail or subdomain already taken", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SignupRequest>,
) -> Result<Response, ApiError> {
    if let Err(message) = validate_password_strength(&request.password) {
        return Err(RepositoryError::Validation(vec![FieldError::new("password", message)]).into());
    }
    let password_hash = hash_password(&request.password)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;

    let txn = state.db.begin().await?;
    let tenant = TenantRepository::new(&txn).create(&request.subdomain).await?;
    let user = UserRepository::new(&txn)
        .create(&request.email, password_hash, Role::Couple, Some(tenant.id))
        .await?;
    WeddingRepository::new(&txn)
        .create(
            tenant.id,
            &request.partner_one,
            &request.partner_two,
            request.wedding_date,
        )
        .await?;
    txn.commit().await?;

    tracing::info!(tenant_id = %tenant.id, subdomain = %tenant.subdomain, "Couple signed up");

    session_response(
        &state,
        StatusCode::CREATED,
        Session {
            user_id: user.id,
            role: user.role,
            tenant_id: user.tenant_id,
        },
    )
}

/// Sign in with e-mail and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in; session cookie set", body = SessionResponse),
        (status = 401, description = "Invalid credentials", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Response, ApiError> {
    let invalid = || unauthorized(Some("Invalid e-mail or password"));

    let Some(user) = UserRepository::new(&state.db)
        .find_by_email(&request.email)
        .await?
    else {
        return Err(invalid());
    };

    let matches = verify_password(&request.password, &user.password_hash).unwrap_or_else(|e| {
        tracing::error!(user_id = %user.id, error = %e, "Stored password hash is unreadable");
        false
    });
    if !matches {
        return Err(invalid());
    }

    session_response(
        &state,
        StatusCode::OK,
        Session {
            user_id: user.id,
            role: user.role,
            tenant_id: user.tenant_id,
        },
    )
}
