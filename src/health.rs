//! `GET /health` endpoint handler.
//!
//! Returns a [`HealthResponse`] JSON payload containing the gateway
//! version, uptime, and the upstream it relays to. The upstream itself is
//! never contacted.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::server::AppState;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub upstream: UpstreamHealth,
}

#[derive(Serialize, Deserialize)]
pub struct UpstreamHealth {
    pub base_url: String,
    pub timeout_ms: u64,
}

#[allow(clippy::cast_possible_truncation)]
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        upstream: UpstreamHealth {
            base_url: state.upstream.base_url().to_string(),
            timeout_ms: state.upstream.timeout().as_millis() as u64,
        },
    })
}
