//! Validation of individual configuration values.
//!
//! Each validator returns the parsed value or a human-readable message;
//! [`GatewayConfig`](super::GatewayConfig) attaches the offending
//! environment variable name.

use std::time::Duration;

use url::Url;

/// Parse the upstream base address.
///
/// Operation paths are appended as extra segments, so the URL must be an
/// absolute `http`/`https` URL that can carry a path. Query strings and
/// fragments would be silently lost and are rejected.
pub fn validate_base_url(raw: &str) -> Result<Url, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("upstream base URL cannot be empty".into());
    }
    let parsed = Url::parse(trimmed).map_err(|_| format!("'{trimmed}' is not a valid URL"))?;

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(format!(
            "unsupported scheme '{scheme}' (expected http or https)"
        ));
    }
    if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
        return Err(format!("'{trimmed}' cannot be used as a base address"));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err("base URL must not carry a query string or fragment".into());
    }
    Ok(parsed)
}

pub fn validate_timeout(timeout_ms: u64) -> Result<Duration, String> {
    if timeout_ms == 0 {
        return Err("timeout must be greater than 0 ms".into());
    }
    Ok(Duration::from_millis(timeout_ms))
}
