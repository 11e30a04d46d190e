//! Service configuration.
//!
//! Loads the bank service location from environment variables, falling back
//! to defaults for anything missing.

use std::env;
use std::fmt;

use url::Url;

pub const SCHEME_ENV: &str = "BANK_SERVICE_SCHEME";
pub const HOST_ENV: &str = "BANK_SERVICE_HOST";

pub const DEFAULT_SCHEME: &str = "http";
pub const DEFAULT_HOST: &str = "localhost:5000";

/// Where the bank service lives and how to authenticate against it.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub scheme: String,
    pub host: String,
    /// Bearer token. Empty means requests go out unauthenticated.
    pub token: String,
}

impl ServiceConfig {
    pub fn new(scheme: &str, host: &str, token: &str) -> Self {
        Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            token: token.to_string(),
        }
    }

    /// Load scheme and host from `BANK_SERVICE_SCHEME` / `BANK_SERVICE_HOST`.
    pub fn from_env(token: &str) -> Self {
        Self::from_lookup(token, |key| env::var(key).ok())
    }

    /// Same as `from_env` with an injected variable source.
    pub fn from_lookup<F>(token: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str, default: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| {
                    tracing::debug!(variable = key, default, "using default bank service setting");
                    default.to_string()
                })
        };

        Self {
            scheme: read(SCHEME_ENV, DEFAULT_SCHEME),
            host: read(HOST_ENV, DEFAULT_HOST),
            token: token.to_string(),
        }
    }

    /// `scheme://host` as a parsed URL.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let raw = format!("{}://{}", self.scheme, self.host);
        let url = Url::parse(&raw).map_err(|e| ConfigError::InvalidBaseUrl {
            url: raw.clone(),
            message: e.to_string(),
        })?;
        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(ConfigError::InvalidBaseUrl {
                url: raw,
                message: "missing host".to_string(),
            });
        }
        Ok(url)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEME, DEFAULT_HOST, "")
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("token", &redact(&self.token))
            .finish()
    }
}

pub(crate) fn redact(token: &str) -> &'static str {
    if token.is_empty() {
        "<none>"
    } else {
        "<redacted>"
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid bank service URL {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },
}
