//! # Tenant Repository
//!
//! Tenant lifecycle, subdomain allocation and custom domain bookkeeping.

use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::tenant::{self, DomainStatus, Entity as Tenant, Model as TenantModel};

/// Subdomains that collide with platform surfaces.
pub const RESERVED_SUBDOMAINS: &[&str] = &[
    "www",
    "api",
    "admin",
    "dashboard",
    "docs",
    "login",
    "internal",
    "health",
];

/// Normalise and validate a requested subdomain label.
pub fn normalize_subdomain(raw: &str) -> Result<String, RepositoryError> {
    static LABEL: OnceLock<Regex> = OnceLock::new();
    let label = LABEL.get_or_init(|| {
        Regex::new(r"^[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?$").expect("valid subdomain regex")
    });

    let candidate = raw.trim().to_ascii_lowercase();
    if !label.is_match(&candidate) {
        return Err(RepositoryError::invalid(
            "subdomain",
            "Subdomain must be 1-63 lowercase letters, digits or hyphens, not starting or ending with a hyphen",
        ));
    }
    if RESERVED_SUBDOMAINS.contains(&candidate.as_str()) {
        return Err(RepositoryError::invalid(
            "subdomain",
            "Subdomain is reserved",
        ));
    }
    Ok(candidate)
}

/// Repository for Tenant database operations
pub struct TenantRepository<'a, C> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> TenantRepository<'a, C> {
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Create a tenant with a validated, unused subdomain.
    pub async fn create(&self, subdomain: &str) -> Result<TenantModel, RepositoryError> {
        let subdomain = normalize_subdomain(subdomain)?;
        if self.find_by_subdomain(&subdomain).await?.is_some() {
            return Err(RepositoryError::Conflict(format!(
                "Subdomain '{subdomain}' is already taken"
            )));
        }

        let now = Utc::now();
        let tenant = tenant::ActiveModel {
            id: Set(Uuid::new_v4()),
            subdomain: Set(subdomain),
            custom_domain: Set(None),
            domain_status: Set(DomainStatus::Unverified),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        Ok(tenant.insert(self.db).await?)
    }

    pub async fn find_by_id(&self, tenant_id: Uuid) -> Result<Option<TenantModel>, RepositoryError> {
        Ok(Tenant::find_by_id(tenant_id).one(self.db).await?)
    }

    pub async fn find_by_subdomain(
        &self,
        subdomain: &str,
    ) -> Result<Option<TenantModel>, RepositoryError> {
        Ok(Tenant::find()
            .filter(tenant::Column::Subdomain.eq(subdomain.to_ascii_lowercase()))
            .one(self.db)
            .await?)
    }

    /// Resolve a custom domain, but only when its verification succeeded.
    pub async fn find_by_verified_domain(
        &self,
        domain: &str,
    ) -> Result<Option<TenantModel>, RepositoryError> {
        Ok(Tenant::find()
            .filter(tenant::Column::CustomDomain.eq(domain.trim().to_ascii_lowercase()))
            .filter(tenant::Column::DomainStatus.eq(DomainStatus::Verified))
            .one(self.db)
            .await?)
    }

    pub async fn list(&self) -> Result<Vec<TenantModel>, RepositoryError> {
        Ok(Tenant::find()
            .order_by_asc(tenant::Column::CreatedAt)
            .all(self.db)
            .await?)
    }

    pub async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(Tenant::find().count(self.db).await?)
    }

    pub async fn count_verified_domains(&self) -> Result<u64, RepositoryError> {
        Ok(Tenant::find()
            .filter(tenant::Column::DomainStatus.eq(DomainStatus::Verified))
            .count(self.db)
            .await?)
    }

    /// Attach, replace or clear the tenant's custom domain.
    pub async fn set_custom_domain(
        &self,
        tenant_id: Uuid,
        domain: Option<String>,
        status: DomainStatus,
    ) -> Result<TenantModel, RepositoryError> {
        let mut active = self.require(tenant_id).await?.into_active_model();
        active.custom_domain = Set(domain);
        active.domain_status = Set(status);
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(self.db).await?)
    }

    pub async fn set_domain_status(
        &self,
        tenant_id: Uuid,
        status: DomainStatus,
    ) -> Result<TenantModel, RepositoryError> {
        let tenant = self.require(tenant_id).await?;
        if tenant.domain_status == status {
            return Ok(tenant);
        }
        let mut active = tenant.into_active_model();
        active.domain_status = Set(status);
        active.updated_at = Set(Utc::now().into());
        Ok(active.update(self.db).await?)
    }

    /// Delete a tenant and, through cascades, everything it owns.
    pub async fn delete(&self, tenant_id: Uuid) -> Result<(), RepositoryError> {
        let result = Tenant::delete_by_id(tenant_id).exec(self.db).await?;
        if result.rows_affected == 0 {
            return Err(RepositoryError::NotFound("Tenant"));
        }
        Ok(())
    }

    async fn require(&self, tenant_id: Uuid) -> Result<TenantModel, RepositoryError> {
        self.find_by_id(tenant_id)
            .await?
            .ok_or(RepositoryError::NotFound("Tenant"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subdomains_are_lowercased_and_checked() {
        assert_eq!(normalize_subdomain("  Ana-Ben ").unwrap(), "ana-ben");
        assert!(normalize_subdomain("-ana").is_err());
        assert!(normalize_subdomain("ana_ben").is_err());
        assert!(normalize_subdomain("").is_err());
        assert!(normalize_subdomain(&"a".repeat(64)).is_err());
    }

    #[test]
    fn reserved_subdomains_are_refused() {
        for reserved in RESERVED_SUBDOMAINS {
            assert!(normalize_subdomain(reserved).is_err(), "{reserved}");
        }
    }
}
