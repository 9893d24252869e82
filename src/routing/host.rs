//! Host classification and tenant path rewriting.

use axum::http::Uri;
use axum::http::uri::PathAndQuery;

/// How an inbound `Host` relates to the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostKind {
    /// The root domain itself, `www.{root}`, or no host at all
    Platform,
    /// `{label}.{root}`; existence of the tenant is not checked here
    Subdomain(String),
    /// Any other host, resolved through the tenant lookup
    CustomDomain(String),
}

impl HostKind {
    pub fn label(&self) -> &'static str {
        match self {
            HostKind::Platform => "platform",
            HostKind::Subdomain(_) => "subdomain",
            HostKind::CustomDomain(_) => "custom_domain",
        }
    }
}

/// Lowercase the host and strip any port, including on bracketed IPv6 hosts.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('.');
    let without_port = if let Some(rest) = host.strip_prefix('[') {
        rest.split(']').next().unwrap_or(rest)
    } else {
        host.split(':').next().unwrap_or(host)
    };
    without_port.trim_end_matches('.').to_ascii_lowercase()
}

pub fn classify_host(host: Option<&str>, root_domain: &str) -> HostKind {
    let Some(host) = host.map(normalize_host).filter(|h| !h.is_empty()) else {
        return HostKind::Platform;
    };
    let root = root_domain.trim().trim_end_matches('.').to_ascii_lowercase();

    if host == root || host == format!("www.{root}") {
        return HostKind::Platform;
    }

    if let Some(prefix) = host.strip_suffix(&format!(".{root}")) {
        let label = prefix.rsplit('.').next().unwrap_or(prefix);
        return if label == "www" || label.is_empty() {
            HostKind::Platform
        } else {
            HostKind::Subdomain(label.to_string())
        };
    }

    HostKind::CustomDomain(host)
}

/// Paths served by the platform router regardless of host.
pub fn is_excluded_path(path: &str) -> bool {
    path.starts_with("/api/")
        || path == "/api"
        || path.starts_with("/docs")
        || path == "/openapi.json"
        || path == "/health"
}

/// Prefix the request path with the tenant's subdomain, keeping the query.
pub fn rewrite_path(subdomain: &str, uri: &Uri) -> Uri {
    let path = uri.path();
    let mut rewritten = if path == "/" || path.is_empty() {
        format!("/{subdomain}")
    } else {
        format!("/{subdomain}{path}")
    };
    if let Some(query) = uri.query() {
        rewritten.push('?');
        rewritten.push_str(query);
    }

    let mut parts = uri.clone().into_parts();
    match PathAndQuery::try_from(rewritten) {
        Ok(path_and_query) => parts.path_and_query = Some(path_and_query),
        Err(_) => return uri.clone(),
    }
    Uri::from_parts(parts).unwrap_or_else(|_| uri.clone())
}
