//! Shared helpers: a running gateway and a scriptable upstream double.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;

use bank_gateway::config::{GatewayConfig, UpstreamConfig};
use bank_gateway::server::{self, AppState};

pub const MAX_BODY: usize = 102_400;

/// What the upstream double answers with.
#[derive(Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: &'static str,
    pub delay: Duration,
}

impl Reply {
    pub fn json(status: u16, body: &'static str) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            body,
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: Method,
    pub path: String,
    pub correlation_id: Option<String>,
    pub correlation_raw: Option<Bytes>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

pub struct Upstream {
    reply: Reply,
    hits: AtomicUsize,
    seen: Mutex<Vec<SeenRequest>>,
}

impl Upstream {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last(&self) -> SeenRequest {
        self.seen.lock().unwrap().last().cloned().expect("upstream was never called")
    }
}

async fn record(
    State(upstream): State<Arc<Upstream>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    upstream.hits.fetch_add(1, Ordering::SeqCst);
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    upstream.seen.lock().unwrap().push(SeenRequest {
        method,
        path: uri.path().to_string(),
        correlation_id: header_str("x-correlation-id"),
        correlation_raw: headers
            .get("x-correlation-id")
            .map(|v| Bytes::copy_from_slice(v.as_bytes())),
        content_type: header_str("content-type"),
        body,
    });

    if !upstream.reply.delay.is_zero() {
        tokio::time::sleep(upstream.reply.delay).await;
    }
    (
        upstream.reply.status,
        [(header::CONTENT_TYPE, "application/json")],
        upstream.reply.body,
    )
        .into_response()
}

/// Start an upstream double; returns its base URL (with an `/api` prefix).
pub async fn start_upstream(reply: Reply) -> (String, Arc<Upstream>) {
    let upstream = Arc::new(Upstream {
        reply,
        hits: AtomicUsize::new(0),
        seen: Mutex::new(Vec::new()),
    });
    let router = Router::new()
        .fallback(record)
        .with_state(Arc::clone(&upstream));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{addr}/api"), upstream)
}

/// A base URL nothing listens on.
pub async fn unreachable_upstream() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

pub async fn start_gateway(
    upstream_base: &str,
    timeout_ms: u64,
) -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
    let config = GatewayConfig {
        listen: "127.0.0.1:0".parse().unwrap(),
        upstream: UpstreamConfig::new(upstream_base, timeout_ms).unwrap(),
        max_body: MAX_BODY,
    };
    let state = Arc::new(AppState::new(&config));
    let router = server::build_router(state, config.max_body);

    let listener = tokio::net::TcpListener::bind(config.listen).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    (addr, shutdown_tx)
}

pub fn correlation_header(resp: &reqwest::Response) -> String {
    resp.headers()
        .get("x-correlation-id")
        .expect("response carries x-correlation-id")
        .to_str()
        .unwrap()
        .to_string()
}
