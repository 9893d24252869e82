//! Test utilities for database and router testing.
//!
//! Sets up in-memory SQLite databases with migrations applied, creates tenant
//! fixtures through the repositories and drives the full router.

#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;
use wedsite::{
    auth::{Session, session::issue_token},
    config::AppConfig,
    models::{
        event, guest,
        tenant::{self, DomainStatus},
        user::Role,
        wedding,
    },
    repositories::{
        EventRepository, GuestRepository, TenantRepository, TenantScope, UserRepository,
        WeddingRepository, event::NewEvent, guest::NewGuest,
    },
    server::{AppState, create_app},
};

pub const ROOT_DOMAIN: &str = "wedsite.test";
pub const INTERNAL_SECRET: &str = "internal-test-secret";

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

pub fn test_config() -> AppConfig {
    AppConfig {
        profile: "test".to_string(),
        root_domain: ROOT_DOMAIN.to_string(),
        internal_api_secret: Some(INTERNAL_SECRET.to_string()),
        ..AppConfig::default()
    }
}

/// A tenant with its wedding and couple account.
#[derive(Debug, Clone)]
pub struct TestSite {
    pub tenant: tenant::Model,
    pub wedding: wedding::Model,
    pub couple_id: Uuid,
}

impl TestSite {
    pub fn scope(&self) -> TenantScope {
        TenantScope {
            tenant_id: self.tenant.id,
            wedding_id: self.wedding.id,
        }
    }

    pub fn session(&self) -> Session {
        Session {
            user_id: self.couple_id,
            role: Role::Couple,
            tenant_id: Some(self.tenant.id),
        }
    }
}

/// Creates a tenant, its wedding and a couple user.
pub async fn create_site(db: &DatabaseConnection, subdomain: &str) -> Result<TestSite> {
    let tenant = TenantRepository::new(db).create(subdomain).await?;
    let wedding = WeddingRepository::new(db)
        .create(tenant.id, "Ana", "Ben", None)
        .await?;
    let couple = UserRepository::new(db)
        .create(
            &format!("couple@{subdomain}.example"),
            "unused-hash".to_string(),
            Role::Couple,
            Some(tenant.id),
        )
        .await?;
    Ok(TestSite {
        tenant,
        wedding,
        couple_id: couple.id,
    })
}

/// Attaches a custom domain in the given state.
pub async fn attach_domain(
    db: &DatabaseConnection,
    site: &mut TestSite,
    domain: &str,
    status: DomainStatus,
) -> Result<()> {
    site.tenant = TenantRepository::new(db)
        .set_custom_domain(site.tenant.id, Some(domain.to_string()), status)
        .await?;
    Ok(())
}

pub async fn create_guest(
    db: &DatabaseConnection,
    site: &TestSite,
    name: &str,
) -> Result<guest::Model> {
    Ok(GuestRepository::new(db)
        .create(site.scope(), NewGuest::named(name))
        .await?)
}

pub fn event_fixture(name: &str, is_public: bool, meal_options: &[&str]) -> NewEvent {
    NewEvent {
        name: name.to_string(),
        description: None,
        location: Some("Lisbon".to_string()),
        starts_at: (Utc::now() + Duration::days(30)).fixed_offset(),
        ends_at: None,
        is_public,
        meal_options: meal_options.iter().map(|o| o.to_string()).collect(),
    }
}

pub async fn create_event(
    db: &DatabaseConnection,
    site: &TestSite,
    name: &str,
    is_public: bool,
    meal_options: &[&str],
) -> Result<event::Model> {
    Ok(EventRepository::new(db)
        .create(site.scope(), event_fixture(name, is_public, meal_options))
        .await?)
}

/// Full application router over the given database.
pub fn test_app(db: DatabaseConnection, config: AppConfig) -> Router {
    create_app(AppState::new(Arc::new(config), db))
}

pub fn bearer(config: &AppConfig, session: &Session) -> String {
    let token = issue_token(config, session).expect("token issues");
    format!("Bearer {token}")
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, ROOT_DOMAIN)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Sends a request and returns the status with the body parsed as JSON
/// (`Value::Null` for empty or non-JSON bodies).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}
