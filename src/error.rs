//! Unified error types for the gateway.
//!
//! [`GatewayError`] covers process-level failures (configuration,
//! binding, the `health` probe). [`UpstreamError`] is the typed outcome
//! of a failed upstream call, and [`Violation`] is one field-level
//! validation failure. All of them are plain values until a handler
//! converts them into the HTTP envelope in [`crate::handlers::ApiError`].

use std::time::Duration;

use http::StatusCode;
use serde::Serialize;
use serde_json::Value;

/// A single field-level validation failure.
///
/// `path` locates the offending field inside the inbound request, e.g.
/// `["body", "amount"]` or `["params", "nationalId"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub message: String,
    pub path: Vec<String>,
}

impl Violation {
    pub fn new(message: impl Into<String>, path: &[&str]) -> Self {
        Self {
            message: message.into(),
            path: path.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.join("."), self.message)
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum UpstreamError {
    #[error("External request timed out after {} ms", after.as_millis())]
    Timeout { after: Duration },

    #[error("External request failed: {}", status.as_u16())]
    Status { status: StatusCode, payload: Value },

    #[error("External request failed: {source}")]
    Transport {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("External request could not be built: {message}")]
    Request { message: String },
}

impl UpstreamError {
    /// Status reported by the upstream, if it answered at all.
    #[must_use]
    pub const fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Decoded (or raw text) body the upstream answered with.
    #[must_use]
    pub const fn payload(&self) -> Option<&Value> {
        match self {
            Self::Status { payload, .. } => Some(payload),
            _ => None,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Status { .. } => "http_status",
            Self::Transport { .. } => "transport",
            Self::Request { .. } => "request",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("No upstream configured.\n\n  {hint}")]
    MissingUpstream { hint: String },

    #[error("Invalid {field}: {message}")]
    InvalidConfig { field: &'static str, message: String },

    #[error("Invalid address: {0}")]
    AddressParse(#[from] std::net::AddrParseError),

    #[error("Invalid URI: {source}")]
    UriParse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP request failed: {source}")]
    HttpRequest {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Health check failed with status {0}")]
    HealthCheckFailed(StatusCode),
}
