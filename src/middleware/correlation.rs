//! Correlation identifier propagation.
//!
//! Every inbound request gets exactly one [`CorrelationId`]: the trimmed
//! `X-Correlation-Id` header when the caller sent a non-blank one, or a
//! fresh UUID v4 otherwise. Caller values are kept as raw header bytes,
//! so identifiers that are not UTF-8 survive the round trip. [`propagate`] stores it in the request
//! extensions (handlers pull it out with the [`CorrelationId`] extractor)
//! and writes it back onto the response, including responses produced by
//! the router's fallback or by inner layers.

use std::convert::Infallible;

use axum::body::Bytes;
use axum::extract::{FromRequestParts, Request};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;

pub const CORRELATION_HEADER: HeaderName = HeaderName::from_static("x-correlation-id");

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationId(Bytes);

impl CorrelationId {
    /// Reuse the caller's identifier if it is non-blank, otherwise generate one.
    ///
    /// No format validation is applied to caller-supplied values.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(&CORRELATION_HEADER)
            .map(|v| v.as_bytes().trim_ascii())
            .filter(|v| !v.is_empty())
            .map_or_else(Self::generate, |v| Self(Bytes::copy_from_slice(v)))
    }

    #[must_use]
    pub fn generate() -> Self {
        Self(Bytes::from(uuid::Uuid::new_v4().to_string()))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Header value for outbound requests and responses.
    ///
    /// `from_bytes` keeps non-ASCII identifiers intact.
    #[must_use]
    pub fn header_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_bytes(&self.0).ok()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Without the middleware in front, fall back to deriving it here.
        Ok(parts
            .extensions
            .get::<Self>()
            .cloned()
            .unwrap_or_else(|| Self::from_headers(&parts.headers)))
    }
}

pub async fn propagate(mut req: Request, next: Next) -> Response {
    let correlation_id = CorrelationId::from_headers(req.headers());
    req.extensions_mut().insert(correlation_id.clone());

    let mut response = next.run(req).await;

    match correlation_id.header_value() {
        Some(value) => {
            response.headers_mut().insert(CORRELATION_HEADER, value);
        }
        None => {
            tracing::warn!(
                correlation_id = %correlation_id,
                "correlation id is not a valid header value, not echoed"
            );
        }
    }
    response
}
