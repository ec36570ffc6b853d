//! Optional Sentry error tracking.
//!
//! Upstream failures and validation rejections reach Sentry through the
//! `sentry-tracing` layer installed by [`crate::logging::init`]. This module
//! only builds the client options and tags every event with the upstream
//! host, so reports from several gateways can be told apart.

use sentry::types::ParseDsnError;

use crate::config::UpstreamConfig;

pub const RELEASE: &str = concat!("bank-gateway@", env!("CARGO_PKG_VERSION"));

pub fn client_options(
    dsn: &str,
    environment: Option<&str>,
) -> Result<sentry::ClientOptions, ParseDsnError> {
    Ok(sentry::ClientOptions {
        dsn: Some(dsn.trim().parse()?),
        environment: environment.map(|e| e.to_owned().into()),
        release: Some(RELEASE.into()),
        ..Default::default()
    })
}

/// Returns `None` (and logs) when the DSN is invalid; the gateway keeps
/// running without error tracking.
pub fn init(
    dsn: &str,
    environment: Option<&str>,
    upstream: &UpstreamConfig,
) -> Option<sentry::ClientInitGuard> {
    let options = match client_options(dsn, environment) {
        Ok(options) => options,
        Err(e) => {
            tracing::warn!(error = %e, "invalid Sentry DSN, error tracking disabled");
            return None;
        }
    };

    let guard = sentry::init(options);
    if let Some(host) = upstream.base_url.host_str() {
        sentry::configure_scope(|scope| scope.set_tag("upstream.host", host));
    }
    Some(guard)
}
