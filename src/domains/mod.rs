//! # Custom domains
//!
//! Couples attach their own domain to a tenant. The hosting provider performs
//! ownership verification; the tenant row mirrors its verdict in
//! `domain_status`, and only a `verified` domain is ever routed.

use std::sync::OnceLock;

use regex::Regex;
use sea_orm::ConnectionTrait;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{ApiError, RepositoryError, service_unavailable};
use crate::models::tenant::{DomainStatus, Model as TenantModel};
use crate::repositories::TenantRepository;

pub mod provider;

pub use provider::{
    DomainProvider, DomainProviderError, HttpDomainProvider, ProviderDomain,
    VerificationChallenge,
};

/// A DNS record the couple must publish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DnsRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Domain state reported to the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DomainView {
    pub domain: Option<String>,
    pub status: DomainStatus,
    pub dns_records: Vec<DnsRecord>,
}

impl DomainView {
    fn new(tenant: &TenantModel, dns_records: Vec<DnsRecord>) -> Self {
        Self {
            domain: tenant.custom_domain.clone(),
            status: tenant.domain_status,
            dns_records,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("domain provider is not configured")]
    NotConfigured,
    #[error(transparent)]
    Provider(#[from] DomainProviderError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotConfigured => {
                service_unavailable("Custom domains are not configured on this server")
            }
            DomainError::Provider(err) => err.into(),
            DomainError::Repository(err) => err.into(),
        }
    }
}

/// Records to publish: the routing record plus any ownership challenges.
pub fn dns_instructions(domain: &ProviderDomain, config: &AppConfig) -> Vec<DnsRecord> {
    let routing = if domain.is_apex() {
        DnsRecord {
            record_type: "A".to_string(),
            name: "@".to_string(),
            value: config.domain_apex_a_record.clone(),
            reason: None,
        }
    } else {
        let label = domain
            .name
            .strip_suffix(&format!(".{}", domain.apex_name))
            .unwrap_or(&domain.name);
        DnsRecord {
            record_type: "CNAME".to_string(),
            name: label.to_string(),
            value: config.domain_cname_target.clone(),
            reason: None,
        }
    };

    std::iter::once(routing)
        .chain(domain.verification.iter().map(|challenge| DnsRecord {
            record_type: challenge.record_type.clone(),
            name: challenge.domain.clone(),
            value: challenge.value.clone(),
            reason: challenge.reason.clone(),
        }))
        .collect()
}

/// Validate and lowercase a domain a couple wants to attach.
pub fn normalize_domain(raw: &str, root_domain: &str) -> Result<String, RepositoryError> {
    static HOSTNAME: OnceLock<Regex> = OnceLock::new();
    let hostname = HOSTNAME.get_or_init(|| {
        Regex::new(r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$")
            .expect("valid hostname regex")
    });

    let domain = raw.trim().trim_end_matches('.').to_ascii_lowercase();
    if domain.len() > 253 || !hostname.is_match(&domain) {
        return Err(RepositoryError::invalid("domain", "Must be a valid domain name"));
    }
    let root = root_domain.to_ascii_lowercase();
    if domain == root || domain.ends_with(&format!(".{root}")) {
        return Err(RepositoryError::invalid(
            "domain",
            "Platform subdomains cannot be attached as custom domains",
        ));
    }
    Ok(domain)
}

fn require_provider(
    provider: Option<&dyn DomainProvider>,
) -> Result<&dyn DomainProvider, DomainError> {
    provider.ok_or(DomainError::NotConfigured)
}

/// Current domain state, refreshed from the provider when one is attached.
///
/// The provider can promote a domain to verified; it never demotes one here.
pub async fn domain_status<C: ConnectionTrait>(
    db: &C,
    config: &AppConfig,
    provider: Option<&dyn DomainProvider>,
    tenant_id: Uuid,
) -> Result<DomainView, DomainError> {
    let repo = TenantRepository::new(db);
    let tenant = repo
        .find_by_id(tenant_id)
        .await?
        .ok_or(RepositoryError::NotFound("Tenant"))?;

    let (Some(domain), Some(provider)) = (tenant.custom_domain.clone(), provider) else {
        return Ok(DomainView::new(&tenant, Vec::new()));
    };

    let remote = provider.get_domain(&domain).await?;
    let tenant = if remote.verified {
        repo.set_domain_status(tenant_id, DomainStatus::Verified).await?
    } else {
        tenant
    };
    Ok(DomainView::new(&tenant, dns_instructions(&remote, config)))
}

/// Attach a domain at the provider and record it as pending (or verified when
/// the provider already trusts it).
pub async fn add_custom_domain<C: ConnectionTrait>(
    db: &C,
    config: &AppConfig,
    provider: Option<&dyn DomainProvider>,
    tenant_id: Uuid,
    raw_domain: &str,
) -> Result<DomainView, DomainError> {
    let provider = require_provider(provider)?;
    let domain = normalize_domain(raw_domain, &config.root_domain)?;
    let repo = TenantRepository::new(db);

    let tenant = repo
        .find_by_id(tenant_id)
        .await?
        .ok_or(RepositoryError::NotFound("Tenant"))?;
    if let Some(previous) = tenant.custom_domain.as_deref()
        && previous != domain
    {
        provider.remove_domain(previous).await?;
    }

    let remote = provider.add_domain(&domain).await?;
    let status = if remote.verified {
        DomainStatus::Verified
    } else {
        DomainStatus::Pending
    };
    let tenant = repo
        .set_custom_domain(tenant_id, Some(domain.clone()), status)
        .await?;
    tracing::info!(tenant_id = %tenant_id, domain = %domain, status = ?status, "Custom domain attached");

    Ok(DomainView::new(&tenant, dns_instructions(&remote, config)))
}

/// Ask the provider to re-check ownership. Anything short of verified is a
/// failed attempt.
pub async fn verify_custom_domain<C: ConnectionTrait>(
    db: &C,
    config: &AppConfig,
    provider: Option<&dyn DomainProvider>,
    tenant_id: Uuid,
) -> Result<DomainView, DomainError> {
    let provider = require_provider(provider)?;
    let repo = TenantRepository::new(db);
    let tenant = repo
        .find_by_id(tenant_id)
        .await?
        .ok_or(RepositoryError::NotFound("Tenant"))?;
    let domain = tenant
        .custom_domain
        .ok_or(RepositoryError::NotFound("Custom domain"))?;

    let remote = provider.verify_domain(&domain).await?;
    let status = if remote.verified {
        DomainStatus::Verified
    } else {
        DomainStatus::Failed
    };
    let tenant = repo.set_domain_status(tenant_id, status).await?;
    tracing::info!(tenant_id = %tenant_id, domain = %domain, status = ?status, "Custom domain verification");

    Ok(DomainView::new(&tenant, dns_instructions(&remote, config)))
}

/// Detach the domain at the provider and clear it from the tenant.
pub async fn remove_custom_domain<C: ConnectionTrait>(
    db: &C,
    provider: Option<&dyn DomainProvider>,
    tenant_id: Uuid,
) -> Result<DomainView, DomainError> {
    let provider = require_provider(provider)?;
    let repo = TenantRepository::new(db);
    let tenant = repo
        .find_by_id(tenant_id)
        .await?
        .ok_or(RepositoryError::NotFound("Tenant"))?;

    if let Some(domain) = tenant.custom_domain.as_deref() {
        provider.remove_domain(domain).await?;
    }
    let tenant = repo
        .set_custom_domain(tenant_id, None, DomainStatus::Unverified)
        .await?;
    Ok(DomainView::new(&tenant, Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            root_domain: "wedsite.app".to_string(),
            domain_apex_a_record: "76.76.21.21".to_string(),
            domain_cname_target: "cname.vercel-dns.com".to_string(),
            ..AppConfig::default()
        }
    }

    fn provider_domain(name: &str, apex: &str) -> ProviderDomain {
        ProviderDomain {
            name: name.to_string(),
            apex_name: apex.to_string(),
            verified: false,
            verification: Vec::new(),
        }
    }

    #[test]
    fn apex_domains_get_an_a_record() {
        let records = dns_instructions(&provider_domain("anaandben.com", "anaandben.com"), &config());
        assert_eq!(
            records,
            vec![DnsRecord {
                record_type: "A".to_string(),
                name: "@".to_string(),
                value: "76.76.21.21".to_string(),
                reason: None,
            }]
        );
    }

    #[test]
    fn subdomains_get_a_cname_plus_challenges() {
        let mut domain = provider_domain("www.anaandben.com", "anaandben.com");
        domain.verification.push(VerificationChallenge {
            record_type: "TXT".to_string(),
            domain: "_vercel.anaandben.com".to_string(),
            value: "vc-domain-verify=abc".to_string(),
            reason: Some("pending_domain_verification".to_string()),
        });

        let records = dns_instructions(&domain, &config());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].record_type, "CNAME");
        assert_eq!(records[0].name, "www");
        assert_eq!(records[0].value, "cname.vercel-dns.com");
        assert_eq!(records[1].record_type, "TXT");
        assert_eq!(records[1].name, "_vercel.anaandben.com");
    }

    #[test]
    fn domain_normalization() {
        assert_eq!(
            normalize_domain(" AnaAndBen.COM. ", "wedsite.app").unwrap(),
            "anaandben.com"
        );
        assert!(normalize_domain("ana.wedsite.app", "wedsite.app").is_err());
        assert!(normalize_domain("localhost", "wedsite.app").is_err());
        assert!(normalize_domain("bad_domain.com", "wedsite.app").is_err());
    }
}
