//! # Tests for Handlers
//!
//! Unit tests for the handlers that need no database rows.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::handlers::{LoginPageQuery, health, login_page, root};
use crate::models::ServiceInfo;
use crate::server::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use sea_orm::DatabaseConnection;
use serde_json::Value;

fn disconnected_state() -> AppState {
    AppState::new(Arc::new(AppConfig::default()), DatabaseConnection::default())
}

#[tokio::test]
async fn test_root_handler_returns_expected_service_info() {
    let Json(service_info) = root().await;

    assert_eq!(service_info.service, "wedsite");
    assert_eq!(service_info.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_root_handler_returns_valid_json() {
    let Json(service_info) = root().await;

    let json_value: Value =
        serde_json::to_value(&service_info).expect("Failed to serialize ServiceInfo");
    assert_eq!(json_value["service"], "wedsite");
    assert!(json_value.get("version").is_some());
}

#[test]
fn test_service_info_default() {
    let service_info = ServiceInfo::default();
    assert_eq!(service_info.service, "wedsite");
}

#[tokio::test]
async fn test_health_reports_unavailable_database() {
    let error = health(State(disconnected_state()))
        .await
        .expect_err("disconnected database must fail the health check");

    assert_eq!(error.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_login_page_keeps_relative_next() {
    let Json(page) = login_page(Query(LoginPageQuery {
        next: Some("/admin/tenants".to_string()),
    }))
    .await;

    assert_eq!(page.next, "/admin/tenants");
    assert_eq!(page.login_endpoint, "/api/auth/login");
}

#[tokio::test]
async fn test_login_page_rejects_offsite_next() {
    for next in ["https://evil.example/", "//evil.example/path"] {
        let Json(page) = login_page(Query(LoginPageQuery {
            next: Some(next.to_string()),
        }))
        .await;
        assert_eq!(page.next, "/dashboard", "next={next}");
    }

    let Json(page) = login_page(Query(LoginPageQuery { next: None })).await;
    assert_eq!(page.next, "/dashboard");
}
