//! # Authentication and Authorization
//!
//! Session extractors for the couple dashboard and admin APIs, and the shared
//! secret check guarding internal endpoints.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, HeaderName, request::Parts},
};
use subtle::ConstantTimeEq;

use crate::config::AppConfig;
use crate::error::{ApiError, forbidden, not_found, unauthorized};
use crate::models::{user::Role, wedding};
use crate::repositories::{TenantScope, WeddingRepository};
use crate::server::AppState;

pub mod password;
pub mod session;

pub use session::Session;

/// Header carrying the shared secret on internal calls.
pub const INTERNAL_SECRET_HEADER: HeaderName = HeaderName::from_static("x-internal-secret");

impl FromRef<AppState> for Arc<AppConfig> {
    fn from_ref(app_state: &AppState) -> Self {
        Arc::clone(&app_state.config)
    }
}

impl<S> FromRequestParts<S> for Session
where
    Arc<AppConfig>: FromRef<S>,
    S: Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>() {
            return Ok(*session);
        }
        let config = Arc::<AppConfig>::from_ref(state);
        session::session_from_headers(&config, &parts.headers)
            .ok_or_else(|| unauthorized(Some("A valid session is required")))
    }
}

/// Session of a couple that owns a tenant
#[derive(Debug, Clone, Copy)]
pub struct CoupleSession {
    pub session: Session,
    pub tenant_id: uuid::Uuid,
}

impl<S> FromRequestParts<S> for CoupleSession
where
    Arc<AppConfig>: FromRef<S>,
    S: Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        match (session.role, session.tenant_id) {
            (Role::Couple, Some(tenant_id)) => Ok(Self { session, tenant_id }),
            _ => Err(forbidden(Some("Couple access required"))),
        }
    }
}

/// Session of a platform administrator
#[derive(Debug, Clone, Copy)]
pub struct AdminSession(pub Session);

impl<S> FromRequestParts<S> for AdminSession
where
    Arc<AppConfig>: FromRef<S>,
    S: Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state).await?;
        if session.role == Role::Admin {
            Ok(Self(session))
        } else {
            Err(forbidden(Some("Admin access required")))
        }
    }
}

/// The signed-in couple's wedding, with the scope every data call must carry.
#[derive(Debug, Clone)]
pub struct CurrentWedding {
    pub scope: TenantScope,
    pub wedding: wedding::Model,
}

impl FromRequestParts<AppState> for CurrentWedding {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let couple = CoupleSession::from_request_parts(parts, state).await?;
        let wedding = WeddingRepository::new(&state.db)
            .find_by_tenant(couple.tenant_id)
            .await?
            .ok_or_else(|| not_found("Wedding"))?;

        Ok(Self {
            scope: TenantScope {
                tenant_id: couple.tenant_id,
                wedding_id: wedding.id,
            },
            wedding,
        })
    }
}

/// Marker for requests that presented the internal shared secret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InternalCaller;

impl<S> FromRequestParts<S> for InternalCaller
where
    Arc<AppConfig>: FromRef<S>,
    S: Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<AppConfig>::from_ref(state);
        if internal_secret_matches(&config, &parts.headers) {
            Ok(InternalCaller)
        } else {
            Err(unauthorized(Some("Invalid internal credentials")))
        }
    }
}

/// Constant-time comparison of the presented secret against the configured one.
///
/// With no secret configured every caller is rejected.
pub fn internal_secret_matches(config: &AppConfig, headers: &HeaderMap) -> bool {
    let Some(expected) = config.internal_api_secret.as_deref() else {
        return false;
    };
    let Some(presented) = headers
        .get(&INTERNAL_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        response::Response,
        routing::get,
    };
    use tower::ServiceExt;
    use uuid::Uuid;

    fn config() -> Arc<AppConfig> {
        Arc::new(AppConfig {
            internal_api_secret: Some("s3cret".to_string()),
            ..AppConfig::default()
        })
    }

    async fn call(path: &str, headers: &[(&str, String)]) -> Response {
        async fn any_session(_session: Session) -> &'static str {
            "OK"
        }
        async fn couple_only(_session: CoupleSession) -> &'static str {
            "OK"
        }
        async fn admin_only(_session: AdminSession) -> &'static str {
            "OK"
        }
        async fn internal(_caller: InternalCaller) -> &'static str {
            "OK"
        }

        let app = Router::new()
            .route("/session", get(any_session))
            .route("/couple", get(couple_only))
            .route("/admin", get(admin_only))
            .route("/internal", get(internal))
            .with_state(config());

        let mut request = Request::builder().uri(path);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }
        app.oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    fn bearer(role: Role, tenant_id: Option<Uuid>) -> (&'static str, String) {
        let token = session::issue_token(
            &config(),
            &Session {
                user_id: Uuid::new_v4(),
                role,
                tenant_id,
            },
        )
        .unwrap();
        ("authorization", format!("Bearer {token}"))
    }

    #[tokio::test]
    async fn missing_session_is_401() {
        let response = call("/session", &[]).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn couple_routes_reject_admins_with_403() {
        let response = call("/couple", &[bearer(Role::Admin, None)]).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = call("/couple", &[bearer(Role::Couple, Some(Uuid::new_v4()))]).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_routes_reject_couples_with_403() {
        let response = call("/admin", &[bearer(Role::Couple, Some(Uuid::new_v4()))]).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = call("/admin", &[bearer(Role::Admin, None)]).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn internal_secret_must_match() {
        let response = call("/internal", &[("x-internal-secret", "wrong".to_string())]).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = call("/internal", &[]).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = call("/internal", &[("x-internal-secret", "s3cret".to_string())]).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn unconfigured_secret_rejects_everyone() {
        let mut headers = HeaderMap::new();
        headers.insert(INTERNAL_SECRET_HEADER, "anything".parse().unwrap());
        assert!(!internal_secret_matches(&AppConfig::default(), &headers));
    }
}
