//! Signed session tokens.
//!
//! Sessions are HS256 JWTs carried in the `session` cookie (browser surfaces)
//! or an `Authorization: Bearer` header (API clients).

use axum::http::{HeaderMap, header};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::models::user::Role;

/// Name of the cookie holding the session token.
pub const SESSION_COOKIE: &str = "session";

/// Claims embedded in every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: Uuid,
    pub role: Role,
    /// Tenant owned by the user; absent for admins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<Uuid>,
    pub exp: i64,
    pub iat: i64,
    pub jti: Uuid,
}

/// An authenticated principal, decoded from a valid session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub role: Role,
    pub tenant_id: Option<Uuid>,
}

impl From<SessionClaims> for Session {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            tenant_id: claims.tenant_id,
        }
    }
}

/// Issue a signed session token for the given principal.
pub fn issue_token(
    config: &AppConfig,
    session: &Session,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let ttl = i64::try_from(config.session_ttl_seconds).unwrap_or(i64::MAX);
    let claims = SessionClaims {
        sub: session.user_id,
        role: session.role,
        tenant_id: session.tenant_id,
        exp: now.saturating_add(ttl),
        iat: now,
        jti: Uuid::new_v4(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.session_signing_key()),
    )
}

/// Validate a token's signature and expiry.
pub fn decode_token(
    config: &AppConfig,
    token: &str,
) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.session_signing_key()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

/// `Set-Cookie` value carrying a freshly issued token.
pub fn session_cookie(config: &AppConfig, token: &str) -> String {
    let secure = if matches!(config.profile.as_str(), "local" | "test") {
        ""
    } else {
        "; Secure"
    };
    format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{secure}",
        config.session_ttl_seconds
    )
}

/// Pull the raw session token from the cookie or bearer header.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    let from_cookie = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|value| !value.is_empty())
    })
}

/// Resolve the request's session, if it carries a valid one.
pub fn session_from_headers(config: &AppConfig, headers: &HeaderMap) -> Option<Session> {
    let token = token_from_headers(headers)?;
    match decode_token(config, token) {
        Ok(claims) => Some(claims.into()),
        Err(err) => {
            tracing::debug!(error = %err, "Rejected session token");
            None
        }
    }
}
