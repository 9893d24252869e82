//! Role gating for the couple dashboard and admin back-office pages.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use url::form_urlencoded;

use crate::auth::Session;
use crate::models::user::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    /// Temporary redirect to the given location
    Redirect(String),
}

impl GateDecision {
    fn login(path: &str) -> Self {
        let next: String = form_urlencoded::byte_serialize(path.as_bytes()).collect();
        GateDecision::Redirect(format!("/login?next={next}"))
    }
}

fn under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

pub fn gate_request(path: &str, session: Option<&Session>) -> GateDecision {
    if under(path, "/admin") {
        return match session.map(|s| s.role) {
            None => GateDecision::login(path),
            Some(Role::Couple) => GateDecision::Redirect("/dashboard".to_string()),
            Some(Role::Admin) => GateDecision::Allow,
        };
    }
    if under(path, "/dashboard") {
        return match session.map(|s| s.role) {
            None => GateDecision::login(path),
            Some(Role::Admin) => GateDecision::Redirect("/admin".to_string()),
            Some(Role::Couple) => GateDecision::Allow,
        };
    }
    GateDecision::Allow
}

/// 307 response pointing at `location`.
pub fn temporary_redirect(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, value)]).into_response(),
        Err(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn session(role: Role) -> Session {
        Session {
            user_id: Uuid::new_v4(),
            role,
            tenant_id: (role == Role::Couple).then(Uuid::new_v4),
        }
    }

    #[test]
    fn anonymous_users_go_to_login_with_next() {
        assert_eq!(
            gate_request("/admin/tenants", None),
            GateDecision::Redirect("/login?next=%2Fadmin%2Ftenants".to_string())
        );
        assert_eq!(
            gate_request("/dashboard", None),
            GateDecision::Redirect("/login?next=%2Fdashboard".to_string())
        );
    }

    #[test]
    fn wrong_role_is_sent_to_its_own_home() {
        assert_eq!(
            gate_request("/admin", Some(&session(Role::Couple))),
            GateDecision::Redirect("/dashboard".to_string())
        );
        assert_eq!(
            gate_request("/dashboard/guests", Some(&session(Role::Admin))),
            GateDecision::Redirect("/admin".to_string())
        );
    }

    #[test]
    fn matching_role_and_other_paths_pass() {
        assert_eq!(gate_request("/admin", Some(&session(Role::Admin))), GateDecision::Allow);
        assert_eq!(
            gate_request("/dashboard", Some(&session(Role::Couple))),
            GateDecision::Allow
        );
        assert_eq!(gate_request("/administer", None), GateDecision::Allow);
        assert_eq!(gate_request("/api/dashboard/guests", None), GateDecision::Allow);
    }

    #[test]
    fn redirect_is_307() {
        let response = temporary_redirect("/login?next=%2Fadmin");
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/login?next=%2Fadmin"
        );
    }
}
