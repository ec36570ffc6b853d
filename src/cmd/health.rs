//! `bank-gateway health` — check the health of a running instance.
//!
//! [`probe`] fetches `GET /health` once; [`render`] turns the answer into
//! the text (or raw JSON) printed by [`execute`].

use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::cli::HealthArgs;
use crate::error::GatewayError;
use crate::health::HealthResponse;
use crate::middleware::correlation::CORRELATION_HEADER;

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// A successful `/health` answer.
#[derive(Debug)]
pub struct Probe {
    pub url: String,
    /// Correlation id the gateway assigned to the probe request.
    pub trace_id: Option<String>,
    pub body: Bytes,
}

pub async fn execute(args: HealthArgs) -> Result<(), GatewayError> {
    let probe = probe(&args.url).await?;
    println!("{}", render(&probe, args.json));
    Ok(())
}

pub async fn probe(base_url: &str) -> Result<Probe, GatewayError> {
    let url = format!("{}/health", base_url.trim_end_matches('/'));
    let uri: hyper::Uri = url
        .parse()
        .map_err(|e: hyper::http::uri::InvalidUri| GatewayError::UriParse {
            source: Box::new(e),
        })?;

    let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
    let req = hyper::Request::get(uri)
        .body(Full::new(Bytes::new()))
        .map_err(|e| GatewayError::HttpRequest {
            source: Box::new(e),
        })?;

    let response = tokio::time::timeout(PROBE_TIMEOUT, client.request(req))
        .await
        .map_err(|_| GatewayError::HttpRequest {
            source: format!("health check timed out after {}s", PROBE_TIMEOUT.as_secs()).into(),
        })?
        .map_err(|e| GatewayError::HttpRequest {
            source: Box::new(e),
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(GatewayError::HealthCheckFailed(status));
    }

    let trace_id = response
        .headers()
        .get(&CORRELATION_HEADER)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
    let body = response
        .into_body()
        .collect()
        .await
        .map_err(|e| GatewayError::HttpRequest {
            source: Box::new(e),
        })?
        .to_bytes();

    Ok(Probe {
        url: base_url.to_string(),
        trace_id,
        body,
    })
}

#[must_use]
pub fn render(probe: &Probe, json: bool) -> String {
    let raw = String::from_utf8_lossy(&probe.body);
    if json {
        return raw.into_owned();
    }

    let Ok(health) = serde_json::from_slice::<HealthResponse>(&probe.body) else {
        return format!("unrecognised health response from {}:\n{raw}", probe.url);
    };

    let mut out = format!(
        "\u{2713} bank-gateway is {} ({})\n  \
         version:   {}\n  \
         uptime:    {}\n  \
         upstream:  {}\n  \
         timeout:   {}ms",
        health.status,
        probe.url,
        health.version,
        format_uptime(health.uptime_seconds),
        health.upstream.base_url,
        health.upstream.timeout_ms,
    );
    if let Some(id) = &probe.trace_id {
        out.push_str(&format!("\n  trace id:  {id}"));
    }
    out
}

fn format_uptime(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
