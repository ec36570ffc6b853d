//! Client for the upstream banking system.
//!
//! [`UpstreamClient`] issues exactly one bounded-timeout HTTP call per
//! operation. The correlation identifier travels as `X-Correlation-Id`,
//! bodies are JSON-encoded, and every response is read in full and
//! decoded leniently (see [`decode_payload`]). Non-2xx answers, transport
//! failures and timeouts all come back as an [`UpstreamError`]; nothing
//! is retried.

use std::time::{Duration, Instant};

use axum::http::{HeaderValue, Method};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::CONTENT_TYPE;
use serde_json::Value;
use url::Url;

use crate::config::UpstreamConfig;
use crate::error::UpstreamError;
use crate::middleware::correlation::{CorrelationId, CORRELATION_HEADER};
use crate::server::HttpClient;
use crate::validation::{CashMovement, NationalId};

#[derive(Clone)]
pub struct UpstreamClient {
    http: HttpClient,
    base_url: Url,
    timeout: Duration,
}

impl UpstreamClient {
    #[must_use]
    pub fn new(http: HttpClient, config: &UpstreamConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            timeout: config.timeout,
        }
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `GET {base}/cuentas/{nationalId}`
    pub async fn lookup_accounts(
        &self,
        national_id: &NationalId,
        correlation_id: &CorrelationId,
    ) -> Result<Value, UpstreamError> {
        let url = self.endpoint(&["cuentas", national_id.as_str()])?;
        self.call(Method::GET, url, None, correlation_id).await
    }

    /// `POST {base}/abonarefectivo`
    pub async fn deposit_cash(
        &self,
        movement: &CashMovement,
        correlation_id: &CorrelationId,
    ) -> Result<Value, UpstreamError> {
        let url = self.endpoint(&["abonarefectivo"])?;
        self.call(Method::POST, url, Some(encode(movement)?), correlation_id)
            .await
    }

    /// `POST {base}/retirarefectivo`
    pub async fn withdraw_cash(
        &self,
        movement: &CashMovement,
        correlation_id: &CorrelationId,
    ) -> Result<Value, UpstreamError> {
        let url = self.endpoint(&["retirarefectivo"])?;
        self.call(Method::POST, url, Some(encode(movement)?), correlation_id)
            .await
    }

    /// Append path segments to the base address, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| UpstreamError::Request {
                    message: format!("'{}' cannot be used as a base address", self.base_url),
                })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    #[allow(clippy::cast_possible_truncation)]
    async fn call(
        &self,
        method: Method,
        url: Url,
        body: Option<Bytes>,
        correlation_id: &CorrelationId,
    ) -> Result<Value, UpstreamError> {
        let mut builder = hyper::Request::builder()
            .method(method.clone())
            .uri(url.as_str())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(value) = correlation_id.header_value() {
            builder = builder.header(CORRELATION_HEADER, value);
        }
        let request = builder
            .body(Full::new(body.unwrap_or_default()))
            .map_err(|e| UpstreamError::Request {
                message: e.to_string(),
            })?;

        let start = Instant::now();
        // Dropping the timed-out future aborts the connection and frees the timer.
        let result = match tokio::time::timeout(self.timeout, self.exchange(request)).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout {
                after: self.timeout,
            }),
        };
        let latency_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => tracing::info!(
                correlation_id = %correlation_id,
                method = %method,
                upstream = %url,
                latency_ms,
                "upstream responded"
            ),
            Err(e) => tracing::warn!(
                correlation_id = %correlation_id,
                method = %method,
                upstream = %url,
                kind = e.kind(),
                status = e.status_code().map_or(0, |s| s.as_u16()),
                latency_ms,
                error = %e,
                "upstream failed"
            ),
        }
        result
    }

    async fn exchange(&self, request: hyper::Request<Full<Bytes>>) -> Result<Value, UpstreamError> {
        let response = self
            .http
            .request(request)
            .await
            .map_err(|e| UpstreamError::Transport {
                source: Box::new(e),
            })?;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| UpstreamError::Transport {
                source: Box::new(e),
            })?
            .to_bytes();

        let payload = decode_payload(&body);
        if !status.is_success() {
            return Err(UpstreamError::Status { status, payload });
        }
        Ok(payload)
    }
}

fn encode(movement: &CashMovement) -> Result<Bytes, UpstreamError> {
    serde_json::to_vec(movement)
        .map(Bytes::from)
        .map_err(|e| UpstreamError::Request {
            message: format!("failed to encode body: {e}"),
        })
}

/// Decode an upstream body: empty is `null`, valid JSON is kept as is,
/// anything else is kept verbatim as a JSON string.
#[must_use]
pub fn decode_payload(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(body).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "upstream body is not JSON, keeping raw text");
        Value::String(String::from_utf8_lossy(body).into_owned())
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::server::build_http_client;

    fn client(base: &str) -> UpstreamClient {
        let config = UpstreamConfig::new(base, 1000).unwrap();
        UpstreamClient::new(build_http_client(), &config)
    }

    #[test]
    fn decodes_json_payload() {
        assert_eq!(decode_payload(br#"{"accepted":true}"#), json!({"accepted": true}));
    }

    #[test]
    fn empty_body_is_null() {
        assert_eq!(decode_payload(b""), Value::Null);
    }

    #[test]
    fn keeps_raw_text_when_not_json() {
        assert_eq!(
            decode_payload(b"Service Unavailable"),
            Value::String("Service Unavailable".into())
        );
    }

    #[tokio::test]
    async fn endpoint_appends_segments() {
        let upstream = client("http://core:9000/api");
        assert_eq!(
            upstream.endpoint(&["cuentas", "04567891-3"]).unwrap().as_str(),
            "http://core:9000/api/cuentas/04567891-3"
        );
    }

    #[tokio::test]
    async fn endpoint_handles_trailing_slash_and_bare_host() {
        assert_eq!(
            client("http://core:9000/api/")
                .endpoint(&["abonarefectivo"])
                .unwrap()
                .as_str(),
            "http://core:9000/api/abonarefectivo"
        );
        assert_eq!(
            client("http://core:9000")
                .endpoint(&["retirarefectivo"])
                .unwrap()
                .as_str(),
            "http://core:9000/retirarefectivo"
        );
    }

    #[tokio::test]
    async fn endpoint_percent_encodes_segments() {
        let url = client("http://core:9000")
            .endpoint(&["cuentas", "a/b c"])
            .unwrap();
        assert_eq!(url.as_str(), "http://core:9000/cuentas/a%2Fb%20c");
    }
}
