//! Hosting provider client for custom domains.
//!
//! The HTTP implementation speaks the Vercel project-domains API: bearer token
//! auth, domains attached to a single project.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::AppConfig;
use crate::error::{ApiError, provider_error};

pub const PROVIDER_NAME: &str = "domain_provider";

/// An ownership challenge the provider wants published
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VerificationChallenge {
    #[serde(rename = "type")]
    pub record_type: String,
    pub domain: String,
    pub value: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Provider view of an attached domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDomain {
    pub name: String,
    pub apex_name: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub verification: Vec<VerificationChallenge>,
}

impl ProviderDomain {
    pub fn is_apex(&self) -> bool {
        self.name.eq_ignore_ascii_case(&self.apex_name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DomainProviderError {
    #[error("domain provider request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("domain provider returned HTTP {status}")]
    Http { status: u16, body: Option<String> },
    #[error("domain provider returned a malformed body: {0}")]
    Malformed(String),
}

impl From<DomainProviderError> for ApiError {
    fn from(err: DomainProviderError) -> Self {
        tracing::warn!(error = %err, "Domain provider call failed");
        match err {
            DomainProviderError::Http { status, body } => {
                provider_error(PROVIDER_NAME.to_string(), status, body)
            }
            DomainProviderError::Network(e) => provider_error(
                PROVIDER_NAME.to_string(),
                e.status().map(|s| s.as_u16()).unwrap_or(0),
                Some(e.to_string()),
            ),
            DomainProviderError::Malformed(details) => {
                provider_error(PROVIDER_NAME.to_string(), 200, Some(details))
            }
        }
    }
}

#[async_trait]
pub trait DomainProvider: Send + Sync {
    async fn add_domain(&self, domain: &str) -> Result<ProviderDomain, DomainProviderError>;
    async fn remove_domain(&self, domain: &str) -> Result<(), DomainProviderError>;
    async fn get_domain(&self, domain: &str) -> Result<ProviderDomain, DomainProviderError>;
    async fn verify_domain(&self, domain: &str) -> Result<ProviderDomain, DomainProviderError>;
}

pub struct HttpDomainProvider {
    client: reqwest::Client,
    api_base: String,
    token: String,
    project_id: String,
}

impl HttpDomainProvider {
    pub fn new(api_base: &str, token: String, project_id: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
            project_id,
        }
    }

    /// `None` unless both the token and the project id are configured.
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        Some(Self::new(
            &config.domain_provider_api_base,
            config.domain_provider_token.clone()?,
            config.domain_provider_project_id.clone()?,
        ))
    }

    fn domain_url(&self, domain: &str, suffix: &str) -> String {
        format!(
            "{}/v9/projects/{}/domains/{}{}",
            self.api_base, self.project_id, domain, suffix
        )
    }

    async fn send(
        &self,
        method: Method,
        url: String,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, DomainProviderError> {
        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.ok();
            Err(DomainProviderError::Http {
                status: status.as_u16(),
                body,
            })
        }
    }

    async fn domain_from(
        response: reqwest::Response,
    ) -> Result<ProviderDomain, DomainProviderError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| DomainProviderError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl DomainProvider for HttpDomainProvider {
    async fn add_domain(&self, domain: &str) -> Result<ProviderDomain, DomainProviderError> {
        let url = format!("{}/v10/projects/{}/domains", self.api_base, self.project_id);
        let response = self
            .send(Method::POST, url, Some(serde_json::json!({ "name": domain })))
            .await?;
        Self::domain_from(response).await
    }

    async fn remove_domain(&self, domain: &str) -> Result<(), DomainProviderError> {
        match self
            .send(Method::DELETE, self.domain_url(domain, ""), None)
            .await
        {
            Ok(_) => Ok(()),
            Err(DomainProviderError::Http { status, .. })
                if status == StatusCode::NOT_FOUND.as_u16() =>
            {
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn get_domain(&self, domain: &str) -> Result<ProviderDomain, DomainProviderError> {
        let response = self
            .send(Method::GET, self.domain_url(domain, ""), None)
            .await?;
        Self::domain_from(response).await
    }

    async fn verify_domain(&self, domain: &str) -> Result<ProviderDomain, DomainProviderError> {
        let response = self
            .send(Method::POST, self.domain_url(domain, "/verify"), None)
            .await?;
        Self::domain_from(response).await
    }
}
