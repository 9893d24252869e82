//! Custom-domain to tenant resolution.

use std::time::Duration;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::INTERNAL_SECRET_HEADER;
use crate::config::AppConfig;
use crate::error::RepositoryError;
use crate::models::tenant::Model as TenantModel;
use crate::repositories::TenantRepository;

/// The public face of a tenant with a verified custom domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResolvedTenant {
    pub id: Uuid,
    pub subdomain: String,
    pub custom_domain: Option<String>,
}

impl ResolvedTenant {
    /// `None` unless the tenant's custom domain is verified.
    pub fn from_verified(tenant: TenantModel) -> Option<Self> {
        let domain = tenant.verified_domain()?.to_string();
        Some(Self {
            id: tenant.id,
            subdomain: tenant.subdomain,
            custom_domain: Some(domain),
        })
    }
}

/// Body of the internal lookup endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TenantLookupResponse {
    pub tenant: Option<ResolvedTenant>,
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("tenant lookup request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("tenant lookup returned HTTP {0}")]
    Status(u16),
    #[error("tenant lookup returned a malformed body: {0}")]
    Malformed(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[async_trait]
pub trait TenantLookup: Send + Sync {
    /// Tenant whose verified custom domain equals `domain`.
    async fn find_verified(&self, domain: &str) -> Result<Option<ResolvedTenant>, LookupError>;
}

/// Resolves through the repository in-process
pub struct DatabaseTenantLookup {
    db: DatabaseConnection,
}

impl DatabaseTenantLookup {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TenantLookup for DatabaseTenantLookup {
    async fn find_verified(&self, domain: &str) -> Result<Option<ResolvedTenant>, LookupError> {
        let tenant = TenantRepository::new(&self.db)
            .find_by_verified_domain(domain)
            .await?;
        Ok(tenant.and_then(ResolvedTenant::from_verified))
    }
}

/// Resolves by calling the internal lookup endpoint with the shared secret
pub struct HttpTenantLookup {
    client: reqwest::Client,
    endpoint: String,
    secret: String,
}

impl HttpTenantLookup {
    pub const PATH: &'static str = "/api/internal/tenants/lookup";

    pub fn new(base_url: &str, secret: String, timeout: Duration) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), Self::PATH),
            secret,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, LookupError> {
        Self::new(
            &config.internal_api_base,
            config.internal_api_secret.clone().unwrap_or_default(),
            Duration::from_millis(config.tenant_lookup_timeout_ms),
        )
    }
}

#[async_trait]
impl TenantLookup for HttpTenantLookup {
    async fn find_verified(&self, domain: &str) -> Result<Option<ResolvedTenant>, LookupError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("domain", domain)])
            .header(INTERNAL_SECRET_HEADER, &self.secret)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LookupError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        let parsed: TenantLookupResponse =
            serde_json::from_str(&body).map_err(|e| LookupError::Malformed(e.to_string()))?;

        // Only a mapping for the requested host counts.
        Ok(parsed.tenant.filter(|tenant| {
            tenant
                .custom_domain
                .as_deref()
                .is_some_and(|d| d.eq_ignore_ascii_case(domain))
        }))
    }
}
