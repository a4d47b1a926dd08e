//! Classified failures for backend calls.
//!
//! DESIGN
//! ======
//! Every adapter call fails with exactly one `ApiError` variant. Callers
//! branch on [`ApiError::kind`], never on the rendered message. Payloads are
//! plain strings so errors can be cloned into the view state and shown as
//! "stale data" banners long after the originating request is gone.

use std::fmt;

/// Errors produced by backend adapter operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never reached the server (connect failure, timeout, reset).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("server returned {status}{}", detail_suffix(.detail))]
    Http { status: u16, detail: Option<String> },

    /// The response body was not the JSON shape we expected.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The request was rejected before any network call.
    #[error("{0}")]
    Validation(String),
}

/// Coarse classification used for branching and display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    Http,
    Decode,
    Validation,
}

impl ApiError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::Network,
            Self::Http { .. } => ErrorKind::Http,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Validation(_) => ErrorKind::Validation,
        }
    }

    /// HTTP status for `Http` errors.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the next poll tick has a reasonable chance of succeeding.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Http { status: 429 | 500..=599, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        if let Some(status) = err.status() {
            return Self::Http { status: status.as_u16(), detail: None };
        }
        Self::Network(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Network => "network",
            Self::Http => "http",
            Self::Decode => "decode",
            Self::Validation => "validation",
        };
        f.write_str(label)
    }
}

#[allow(clippy::ref_option)]
fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;
