//! Gateway configuration, resolved once at startup.
//!
//! [`GatewayConfig`] is built from the parsed [`RunArgs`](crate::cli::RunArgs)
//! (flags or their environment variables) and validated before anything
//! is served. It is then handed explicitly to the upstream client and the
//! listener; request handling never reads the environment.

pub mod validation;

use std::net::SocketAddr;
use std::time::Duration;

use url::Url;

use crate::cli::RunArgs;
use crate::error::GatewayError;

pub const DEFAULT_TIMEOUT_MS: u64 = 8000;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub listen: SocketAddr,
    pub upstream: UpstreamConfig,
    pub max_body: usize,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl UpstreamConfig {
    pub fn new(base_url: &str, timeout_ms: u64) -> Result<Self, GatewayError> {
        let base_url = validation::validate_base_url(base_url).map_err(|message| {
            GatewayError::InvalidConfig {
                field: "EXTERNAL_BASE_URL",
                message,
            }
        })?;
        let timeout = validation::validate_timeout(timeout_ms).map_err(|message| {
            GatewayError::InvalidConfig {
                field: "REQUEST_TIMEOUT_MS",
                message,
            }
        })?;
        Ok(Self { base_url, timeout })
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

impl GatewayConfig {
    pub fn from_args(args: &RunArgs) -> Result<Self, GatewayError> {
        let Some(ref upstream_url) = args.upstream_url else {
            return Err(GatewayError::MissingUpstream {
                hint: "Set EXTERNAL_BASE_URL (or pass --upstream-url), e.g.\n  \
                       EXTERNAL_BASE_URL=http://core-banking:8080/api bank-gateway"
                    .into(),
            });
        };

        let upstream = UpstreamConfig::new(upstream_url, args.timeout)?;
        let listen: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

        Ok(Self {
            listen,
            upstream,
            max_body: args.max_body,
        })
    }
}
