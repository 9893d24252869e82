//! Configuration loading for wedsite.
//!
//! Loads layered `.env` files and environment variables prefixed with
//! `WEDSITE_`, producing a typed [`AppConfig`].

use std::{collections::BTreeMap, env, net::SocketAddr, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const ENV_PREFIX: &str = "WEDSITE_";
const REDACTED: &str = "[REDACTED]";

/// Signing key used for sessions in `local` and `test` profiles when none is configured.
const LOCAL_SESSION_SECRET: &str = "wedsite-local-session-secret-not-for-production";

/// Minimum accepted length of the session signing secret outside local/test.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

/// How custom domains are resolved to tenants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenantLookupMode {
    /// Query the tenants table in-process
    Database,
    /// Call the internal lookup endpoint over HTTP
    Http,
}

impl TenantLookupMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "database" | "db" => Some(Self::Database),
            "http" => Some(Self::Http),
            _ => None,
        }
    }
}

/// Application configuration derived from `WEDSITE_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AppConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_api_bind_addr")]
    pub api_bind_addr: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_db_acquire_timeout_ms")]
    pub db_acquire_timeout_ms: u64,
    /// Platform root domain, e.g. `wedsite.app`
    #[serde(default = "default_root_domain")]
    pub root_domain: String,
    /// Shared secret guarding the internal tenant lookup endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_api_secret: Option<String>,
    /// Base URL the HTTP tenant lookup calls
    #[serde(default = "default_internal_api_base")]
    pub internal_api_base: String,
    #[serde(default = "default_tenant_lookup_mode")]
    pub tenant_lookup_mode: TenantLookupMode,
    #[serde(default = "default_tenant_lookup_timeout_ms")]
    pub tenant_lookup_timeout_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_secret: Option<String>,
    #[serde(default = "default_session_ttl_seconds")]
    pub session_ttl_seconds: u64,
    /// Upload ceiling for guest list imports
    #[serde(default = "default_import_max_bytes")]
    pub import_max_bytes: usize,
    #[serde(default = "default_domain_provider_api_base")]
    pub domain_provider_api_base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_provider_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_provider_project_id: Option<String>,
    #[serde(default = "default_domain_apex_a_record")]
    pub domain_apex_a_record: String,
    #[serde(default = "default_domain_cname_target")]
    pub domain_cname_target: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            api_bind_addr: default_api_bind_addr(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            database_url: default_database_url(),
            db_max_connections: default_db_max_connections(),
            db_acquire_timeout_ms: default_db_acquire_timeout_ms(),
            root_domain: default_root_domain(),
            internal_api_secret: None,
            internal_api_base: default_internal_api_base(),
            tenant_lookup_mode: default_tenant_lookup_mode(),
            tenant_lookup_timeout_ms: default_tenant_lookup_timeout_ms(),
            session_secret: None,
            session_ttl_seconds: default_session_ttl_seconds(),
            import_max_bytes: default_import_max_bytes(),
            domain_provider_api_base: default_domain_provider_api_base(),
            domain_provider_token: None,
            domain_provider_project_id: None,
            domain_apex_a_record: default_domain_apex_a_record(),
            domain_cname_target: default_domain_cname_target(),
        }
    }
}

impl AppConfig {
    /// Returns the configured bind address as a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.api_bind_addr.parse()
    }

    fn is_local_profile(&self) -> bool {
        matches!(self.profile.as_str(), "local" | "test")
    }

    /// Key used to sign and verify session tokens.
    pub fn session_signing_key(&self) -> &[u8] {
        self.session_secret
            .as_deref()
            .unwrap_or(LOCAL_SESSION_SECRET)
            .as_bytes()
    }

    /// Whether enough settings are present to talk to the domain provider.
    pub fn domain_provider_configured(&self) -> bool {
        self.domain_provider_token.is_some() && self.domain_provider_project_id.is_some()
    }

    /// Returns a redacted JSON representation (secrets are redacted).
    pub fn redacted_json(&self) -> serde_json::Result<String> {
        let mut config = self.clone();
        if config.internal_api_secret.is_some() {
            config.internal_api_secret = Some(REDACTED.to_string());
        }
        if config.session_secret.is_some() {
            config.session_secret = Some(REDACTED.to_string());
        }
        if config.domain_provider_token.is_some() {
            config.domain_provider_token = Some(REDACTED.to_string());
        }
        serde_json::to_string_pretty(&config)
    }

    /// Validates the configuration, returning an error if required settings are missing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let root = self.root_domain.trim();
        if root.is_empty() || !root.contains('.') || root.contains(':') {
            return Err(ConfigError::InvalidRootDomain {
                value: self.root_domain.clone(),
            });
        }

        if !self.is_local_profile() {
            match self.session_secret.as_deref() {
                None => return Err(ConfigError::MissingSessionSecret),
                Some(secret) if secret.len() < MIN_SESSION_SECRET_LEN => {
                    return Err(ConfigError::WeakSessionSecret {
                        length: secret.len(),
                    });
                }
                Some(_) => {}
            }
            if self.internal_api_secret.is_none() {
                return Err(ConfigError::MissingInternalApiSecret);
            }
        }

        // The HTTP lookup cannot authenticate without the shared secret
        if self.tenant_lookup_mode == TenantLookupMode::Http && self.internal_api_secret.is_none() {
            return Err(ConfigError::MissingInternalApiSecret);
        }

        if self.session_ttl_seconds == 0 {
            return Err(ConfigError::InvalidSessionTtl {
                value: self.session_ttl_seconds,
            });
        }

        if self.import_max_bytes == 0 {
            return Err(ConfigError::InvalidImportMaxBytes {
                value: self.import_max_bytes,
            });
        }

        Ok(())
    }
}

fn default_profile() -> String {
    "local".to_string()
}

fn default_api_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_database_url() -> String {
    "sqlite://wedsite.db?mode=rwc".to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_acquire_timeout_ms() -> u64 {
    5000
}

fn default_root_domain() -> String {
    "wedsite.localhost".to_string()
}

fn default_internal_api_base() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_tenant_lookup_mode() -> TenantLookupMode {
    TenantLookupMode::Database
}

fn default_tenant_lookup_timeout_ms() -> u64 {
    2000
}

fn default_session_ttl_seconds() -> u64 {
    60 * 60 * 24 * 7
}

fn default_import_max_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_domain_provider_api_base() -> String {
    "https://api.vercel.com".to_string()
}

fn default_domain_apex_a_record() -> String {
    "76.76.21.21".to_string()
}

fn default_domain_cname_target() -> String {
    "cname.vercel-dns.com".to_string()
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load environment file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        source: dotenvy::Error,
    },
    #[error("invalid api bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid root domain '{value}'; set WEDSITE_ROOT_DOMAIN to a bare host such as example.com")]
    InvalidRootDomain { value: String },
    #[error("session secret is missing; set WEDSITE_SESSION_SECRET")]
    MissingSessionSecret,
    #[error("session secret must be at least 32 bytes, got {length} bytes")]
    WeakSessionSecret { length: usize },
    #[error("internal API secret is missing; set WEDSITE_INTERNAL_API_SECRET")]
    MissingInternalApiSecret,
    #[error("invalid tenant lookup mode '{value}'; expected 'database' or 'http'")]
    InvalidTenantLookupMode { value: String },
    #[error("session TTL must be positive, got {value}")]
    InvalidSessionTtl { value: u64 },
    #[error("import size limit must be positive, got {value}")]
    InvalidImportMaxBytes { value: usize },
}

/// Loads configuration using layered `.env` files and `WEDSITE_*` env vars.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Creates a loader rooted at the provided directory (useful for tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Loads, validates and returns the configuration.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let (mut layered, profile_hint) = self.collect_layered_env()?;

        // Overlay process environment last so it wins.
        for (key, value) in env::vars() {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                layered.insert(stripped.to_string(), value);
            }
        }

        let profile = layered
            .remove("PROFILE")
            .filter(|v| !v.is_empty())
            .unwrap_or(profile_hint);
        let api_bind_addr = layered
            .remove("API_BIND_ADDR")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_api_bind_addr);
        let log_level = layered
            .remove("LOG_LEVEL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_log_level);
        let log_format = layered
            .remove("LOG_FORMAT")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_log_format);
        let database_url = layered
            .remove("DATABASE_URL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_database_url);
        let db_max_connections = layered
            .remove("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_db_max_connections);
        let db_acquire_timeout_ms = layered
            .remove("DB_ACQUIRE_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_db_acquire_timeout_ms);
        let root_domain = layered
            .remove("ROOT_DOMAIN")
            .map(|v| v.trim().trim_end_matches('.').to_ascii_lowercase())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_root_domain);

        let internal_api_secret = non_blank(layered.remove("INTERNAL_API_SECRET"));
        let internal_api_base = layered
            .remove("INTERNAL_API_BASE")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_internal_api_base);
        let tenant_lookup_mode = match layered.remove("TENANT_LOOKUP_MODE") {
            Some(value) if !value.trim().is_empty() => TenantLookupMode::parse(&value)
                .ok_or(ConfigError::InvalidTenantLookupMode { value })?,
            _ => default_tenant_lookup_mode(),
        };
        let tenant_lookup_timeout_ms = layered
            .remove("TENANT_LOOKUP_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_tenant_lookup_timeout_ms);

        let session_secret = non_blank(layered.remove("SESSION_SECRET"));
        let session_ttl_seconds = layered
            .remove("SESSION_TTL_SECONDS")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_session_ttl_seconds);
        let import_max_bytes = layered
            .remove("IMPORT_MAX_BYTES")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_import_max_bytes);

        let domain_provider_api_base = layered
            .remove("DOMAIN_PROVIDER_API_BASE")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_domain_provider_api_base);
        let domain_provider_token = non_blank(layered.remove("DOMAIN_PROVIDER_TOKEN"));
        let domain_provider_project_id = non_blank(layered.remove("DOMAIN_PROVIDER_PROJECT_ID"));
        let domain_apex_a_record = layered
            .remove("DOMAIN_APEX_A_RECORD")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_domain_apex_a_record);
        let domain_cname_target = layered
            .remove("DOMAIN_CNAME_TARGET")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(default_domain_cname_target);

        let config = AppConfig {
            profile,
            api_bind_addr,
            log_level,
            log_format,
            database_url,
            db_max_connections,
            db_acquire_timeout_ms,
            root_domain,
            internal_api_secret,
            internal_api_base,
            tenant_lookup_mode,
            tenant_lookup_timeout_ms,
            session_secret,
            session_ttl_seconds,
            import_max_bytes,
            domain_provider_api_base,
            domain_provider_token,
            domain_provider_project_id,
            domain_apex_a_record,
            domain_cname_target,
        };

        config.validate()?;

        match config.bind_addr() {
            Ok(_) => Ok(config),
            Err(source) => Err(ConfigError::InvalidBindAddr {
                value: config.api_bind_addr.clone(),
                source,
            }),
        }
    }

    fn collect_layered_env(&self) -> Result<(BTreeMap<String, String>, String), ConfigError> {
        let mut values = BTreeMap::new();

        self.merge_dotenv(self.base_dir.join(".env"), &mut values)?;
        self.merge_dotenv(self.base_dir.join(".env.local"), &mut values)?;

        let profile = env::var(format!("{ENV_PREFIX}PROFILE"))
            .ok()
            .or_else(|| values.get("PROFILE").cloned())
            .unwrap_or_else(default_profile);

        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}", &profile)),
            &mut values,
        )?;
        self.merge_dotenv(
            self.base_dir.join(format!(".env.{}.local", &profile)),
            &mut values,
        )?;

        Ok((values, profile))
    }

    fn merge_dotenv(
        &self,
        path: PathBuf,
        values: &mut BTreeMap<String, String>,
    ) -> Result<(), ConfigError> {
        match dotenvy::from_path_iter(&path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item.map_err(|source| ConfigError::EnvFile {
                        path: path.clone(),
                        source,
                    })?;
                    if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                        values.insert(stripped.to_string(), value);
                    }
                }
                Ok(())
            }
            Err(dotenvy::Error::Io(ref io_err))
                if io_err.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(())
            }
            Err(err) => Err(ConfigError::EnvFile { path, source: err }),
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|val| {
        let trimmed = val.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn production() -> AppConfig {
        AppConfig {
            profile: "production".to_string(),
            session_secret: Some("x".repeat(MIN_SESSION_SECRET_LEN)),
            internal_api_secret: Some("internal".to_string()),
            ..AppConfig::default()
        }
    }

    #[test]
    fn defaults_are_valid_for_local_profile() {
        let config = AppConfig::default();
        config.validate().expect("local defaults validate");
        assert_eq!(config.tenant_lookup_mode, TenantLookupMode::Database);
        assert_eq!(config.import_max_bytes, 5 * 1024 * 1024);
        assert!(!config.session_signing_key().is_empty());
    }

    #[test]
    fn production_requires_strong_session_secret() {
        let mut config = production();
        config.validate().expect("production config validates");

        config.session_secret = Some("short".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WeakSessionSecret { length: 5 })
        ));

        config.session_secret = None;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingSessionSecret)
        ));
    }

    #[test]
    fn production_requires_internal_secret() {
        let config = AppConfig {
            internal_api_secret: None,
            ..production()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingInternalApiSecret)
        ));
    }

    #[test]
    fn http_lookup_requires_internal_secret_even_locally() {
        let config = AppConfig {
            tenant_lookup_mode: TenantLookupMode::Http,
            ..AppConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingInternalApiSecret)
        ));
    }

    #[test]
    fn redacted_json_hides_secrets() {
        let config = AppConfig {
            domain_provider_token: Some("tok_live".to_string()),
            ..production()
        };
        let json = config.redacted_json().unwrap();
        assert!(!json.contains("tok_live"));
        assert!(!json.contains("internal\""));
        assert!(json.contains(REDACTED));
    }

    #[test]
    fn lookup_mode_parses_aliases() {
        assert_eq!(TenantLookupMode::parse("HTTP"), Some(TenantLookupMode::Http));
        assert_eq!(TenantLookupMode::parse("db"), Some(TenantLookupMode::Database));
        assert_eq!(TenantLookupMode::parse("dns"), None);
    }
}
