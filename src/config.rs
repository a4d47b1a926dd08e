//! Dashboard configuration parsed from environment variables.
//!
//! Every knob has a default tuned for a local backend; only
//! structurally invalid values (a bad URL, a zero interval) are errors.
//! Unparsable numbers fall back to their defaults.

use std::time::Duration;

use reqwest::Url;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8002";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_HEALTH_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_DOCUMENTS_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_COLLECTIONS_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;
pub const DEFAULT_COLLECTION_LIMIT: u32 = 20;
pub const DEFAULT_UPLOAD_PATH: &str = "/api/upload";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid backend URL {url:?}: {reason}")]
    InvalidBackendUrl { url: String, reason: String },
    #[error("{var} must be greater than zero")]
    ZeroInterval { var: &'static str },
    #[error("upload path must start with '/': {0:?}")]
    InvalidUploadPath(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// Refresh cadence for each polled resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    pub health: Duration,
    pub documents: Duration,
    pub collections: Duration,
}

/// Result-size limits passed to the search and collection-detail endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryLimits {
    pub search: u32,
    pub collection: u32,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self { search: DEFAULT_SEARCH_LIMIT, collection: DEFAULT_COLLECTION_LIMIT }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub backend_url: Url,
    pub timeouts: Timeouts,
    pub intervals: PollIntervals,
    pub limits: QueryLimits,
    pub upload_path: String,
    pub listen_addr: String,
}

impl DashboardConfig {
    /// Build typed config from process environment variables.
    ///
    /// Optional:
    /// - `RAGDASH_BACKEND_URL`: default `http://localhost:8002`
    /// - `RAGDASH_REQUEST_TIMEOUT_SECS` / `RAGDASH_CONNECT_TIMEOUT_SECS`: default 10 / 5
    /// - `RAGDASH_HEALTH_INTERVAL_SECS`: default 10
    /// - `RAGDASH_DOCUMENTS_INTERVAL_SECS` / `RAGDASH_COLLECTIONS_INTERVAL_SECS`: default 60
    /// - `RAGDASH_SEARCH_LIMIT` / `RAGDASH_COLLECTION_LIMIT`: default 10 / 20
    /// - `RAGDASH_UPLOAD_PATH`: default `/api/upload`
    /// - `RAGDASH_LISTEN_ADDR`: default `127.0.0.1:8080`
    ///
    /// # Errors
    ///
    /// Returns an error if the backend URL does not parse, an interval is
    /// zero, or the upload path is not absolute.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same conditions as [`DashboardConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = lookup("RAGDASH_BACKEND_URL").unwrap_or_else(|| DEFAULT_BACKEND_URL.to_owned());
        let backend_url = parse_backend_url(&raw_url)?;

        let timeouts = Timeouts {
            request_secs: parse_or(&lookup, "RAGDASH_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_or(&lookup, "RAGDASH_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        let intervals = PollIntervals {
            health: interval(&lookup, "RAGDASH_HEALTH_INTERVAL_SECS", DEFAULT_HEALTH_INTERVAL_SECS)?,
            documents: interval(&lookup, "RAGDASH_DOCUMENTS_INTERVAL_SECS", DEFAULT_DOCUMENTS_INTERVAL_SECS)?,
            collections: interval(&lookup, "RAGDASH_COLLECTIONS_INTERVAL_SECS", DEFAULT_COLLECTIONS_INTERVAL_SECS)?,
        };

        let limits = QueryLimits {
            search: parse_or(&lookup, "RAGDASH_SEARCH_LIMIT", DEFAULT_SEARCH_LIMIT),
            collection: parse_or(&lookup, "RAGDASH_COLLECTION_LIMIT", DEFAULT_COLLECTION_LIMIT),
        };

        let upload_path = lookup("RAGDASH_UPLOAD_PATH").unwrap_or_else(|| DEFAULT_UPLOAD_PATH.to_owned());
        if !upload_path.starts_with('/') {
            return Err(ConfigError::InvalidUploadPath(upload_path));
        }

        let listen_addr = lookup("RAGDASH_LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_owned());

        Ok(Self { backend_url, timeouts, intervals, limits, upload_path, listen_addr })
    }

    /// Replace the backend URL (used for CLI overrides).
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not an absolute http(s) URL.
    pub fn set_backend_url(&mut self, raw: &str) -> Result<(), ConfigError> {
        self.backend_url = parse_backend_url(raw)?;
        Ok(())
    }
}

/// Parse a backend base URL, dropping any trailing slash from its path.
///
/// # Errors
///
/// Returns an error if the URL does not parse or is not http(s).
pub fn parse_backend_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| ConfigError::InvalidBackendUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBackendUrl {
            url: raw.to_owned(),
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(url)
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn interval(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default_secs: u64,
) -> Result<Duration, ConfigError> {
    let secs = parse_or(lookup, key, default_secs);
    if secs == 0 {
        return Err(ConfigError::ZeroInterval { var: key });
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
