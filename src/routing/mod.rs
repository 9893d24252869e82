//! # Tenant Resolver
//!
//! Request-interception layer that wraps the whole router. For every request it
//!
//! 1. gates `/admin` and `/dashboard` pages on the session role,
//! 2. classifies the `Host` header against the root domain, and
//! 3. rewrites tenant requests to `/{subdomain}{path}` before routing.
//!
//! Custom domains resolve through a [`TenantLookup`]. Anything short of a
//! verified mapping fails closed with `404 SITE_NOT_FOUND`.

use std::sync::Arc;

use axum::{
    extract::{FromRef, Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::counter;

use crate::auth::session::session_from_headers;
use crate::config::AppConfig;
use crate::error::site_not_found;

pub mod gate;
pub mod host;
pub mod lookup;

pub use gate::{GateDecision, gate_request, temporary_redirect};
pub use host::{HostKind, classify_host, is_excluded_path, rewrite_path};
pub use lookup::{
    DatabaseTenantLookup, HttpTenantLookup, LookupError, ResolvedTenant, TenantLookup,
    TenantLookupResponse,
};

/// State consumed by [`resolve_tenant`]
#[derive(Clone)]
pub struct TenantResolver {
    pub config: Arc<AppConfig>,
    pub lookup: Arc<dyn TenantLookup>,
}

impl FromRef<TenantResolver> for Arc<AppConfig> {
    fn from_ref(resolver: &TenantResolver) -> Self {
        Arc::clone(&resolver.config)
    }
}

fn request_host(request: &Request) -> Option<String> {
    request
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.as_str().to_string()))
}

pub async fn resolve_tenant(
    State(resolver): State<TenantResolver>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let session = session_from_headers(&resolver.config, request.headers());

    if let GateDecision::Redirect(location) = gate_request(&path, session.as_ref()) {
        tracing::debug!(path = %path, location = %location, "Gated page redirect");
        return temporary_redirect(&location);
    }
    if let Some(session) = session {
        request.extensions_mut().insert(session);
    }

    if is_excluded_path(&path) {
        return next.run(request).await;
    }

    let kind = classify_host(request_host(&request).as_deref(), &resolver.config.root_domain);
    counter!("tenant_resolution_total", "kind" => kind.label()).increment(1);

    let subdomain = match kind {
        HostKind::Platform => return next.run(request).await,
        HostKind::Subdomain(label) => label,
        HostKind::CustomDomain(domain) => match resolver.lookup.find_verified(&domain).await {
            Ok(Some(tenant)) => tenant.subdomain,
            Ok(None) => {
                tracing::debug!(domain = %domain, "No verified tenant for custom domain");
                return site_not_found().into_response();
            }
            Err(err) => {
                counter!("tenant_lookup_failures_total").increment(1);
                tracing::warn!(domain = %domain, error = %err, "Tenant lookup failed");
                return site_not_found().into_response();
            }
        },
    };

    let rewritten = rewrite_path(&subdomain, request.uri());
    tracing::debug!(from = %request.uri(), to = %rewritten, "Rewrote tenant request");
    *request.uri_mut() = rewritten;
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        Router,
        body::{Body, to_bytes},
        extract::Path,
        http::StatusCode,
        routing::get,
    };
    use tower::{Layer, ServiceExt};
    use uuid::Uuid;

    use crate::auth::session::{Session, issue_token};
    use crate::models::user::Role;

    struct StubLookup(Result<Option<ResolvedTenant>, u16>);

    #[async_trait]
    impl TenantLookup for StubLookup {
        async fn find_verified(&self, _: &str) -> Result<Option<ResolvedTenant>, LookupError> {
            self.0.clone().map_err(LookupError::Status)
        }
    }

    fn config() -> Arc<AppConfig> {
        Arc::new(AppConfig {
            root_domain: "wedsite.app".to_string(),
            ..AppConfig::default()
        })
    }

    async fn send(lookup: StubLookup, host: &str, uri: &str, token: Option<String>) -> Response {
        async fn site(Path(sub): Path<String>) -> String {
            format!("site:{sub}")
        }
        async fn site_page(Path((sub, page)): Path<(String, String)>) -> String {
            format!("page:{sub}:{page}")
        }

        let router = Router::new()
            .route("/", get(|| async { "platform" }))
            .route("/health", get(|| async { "healthy" }))
            .route("/dashboard", get(|| async { "dashboard" }))
            .route("/{sub}", get(site))
            .route("/{sub}/{page}", get(site_page));
        let resolver = TenantResolver {
            config: config(),
            lookup: Arc::new(lookup),
        };
        let app = axum::middleware::from_fn_with_state(resolver, resolve_tenant).layer(router);

        let mut request = axum::http::Request::builder()
            .uri(uri)
            .header("host", host);
        if let Some(token) = token {
            request = request.header("authorization", format!("Bearer {token}"));
        }
        app.oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn verified(subdomain: &str) -> StubLookup {
        StubLookup(Ok(Some(ResolvedTenant {
            id: Uuid::new_v4(),
            subdomain: subdomain.to_string(),
            custom_domain: Some("anaandben.com".to_string()),
        })))
    }

    #[tokio::test]
    async fn platform_hosts_are_not_rewritten() {
        let response = send(verified("x"), "wedsite.app", "/", None).await;
        assert_eq!(body(response).await, "platform");

        let response = send(verified("x"), "www.wedsite.app", "/", None).await;
        assert_eq!(body(response).await, "platform");
    }

    #[tokio::test]
    async fn subdomain_requests_are_rewritten() {
        let response = send(verified("x"), "ana.wedsite.app", "/", None).await;
        assert_eq!(body(response).await, "site:ana");

        let response = send(verified("x"), "ana.wedsite.app", "/registry", None).await;
        assert_eq!(body(response).await, "page:ana:registry");
    }

    #[tokio::test]
    async fn excluded_paths_skip_rewriting() {
        let response = send(verified("x"), "ana.wedsite.app", "/health", None).await;
        assert_eq!(body(response).await, "healthy");
    }

    #[tokio::test]
    async fn verified_custom_domain_rewrites_to_its_subdomain() {
        let response = send(verified("ana"), "AnaAndBen.com", "/rsvp", None).await;
        assert_eq!(body(response).await, "page:ana:rsvp");
    }

    #[tokio::test]
    async fn unknown_or_failing_custom_domains_fail_closed() {
        let response = send(StubLookup(Ok(None)), "anaandben.com", "/", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body(response).await.contains("SITE_NOT_FOUND"));

        let response = send(StubLookup(Err(500)), "anaandben.com", "/", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn dashboard_is_gated_before_routing() {
        let response = send(verified("x"), "wedsite.app", "/dashboard", None).await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/login?next=%2Fdashboard"
        );

        let token = issue_token(
            &config(),
            &Session {
                user_id: Uuid::new_v4(),
                role: Role::Couple,
                tenant_id: Some(Uuid::new_v4()),
            },
        )
        .unwrap();
        let response = send(verified("x"), "wedsite.app", "/dashboard", Some(token)).await;
        assert_eq!(body(response).await, "dashboard");
    }
}
