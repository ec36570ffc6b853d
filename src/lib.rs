//! A request-forwarding gateway for three banking operations.
//!
//! It exposes account lookup, cash deposit and cash withdrawal over a
//! local HTTP interface and relays each call to a single upstream banking
//! system. Every request is validated before anything leaves the process,
//! carries a correlation identifier end to end, and is bounded by a
//! configurable upstream timeout. Upstream failures come back to the
//! caller as a uniform error envelope. The gateway holds no state.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line / environment parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, health).
//! - [`config`] -- [`GatewayConfig`](config::GatewayConfig), resolved and
//!   validated once at startup.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`handlers`] -- The three operation handlers and the error envelope.
//! - [`health`] -- `GET /health` endpoint handler.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`middleware`] -- Correlation identifier propagation.
//! - [`server`] -- Axum router, shared state, HTTP client, graceful shutdown.
//! - [`upstream`] -- Bounded-timeout client for the upstream banking system.
//! - [`validation`] -- Per-operation input validation.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `sentry-integration` | Sentry error tracking |

// Binary crate — public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod logging;
pub mod middleware;
pub mod server;
pub mod upstream;
pub mod validation;

#[cfg(feature = "sentry-integration")]
pub mod sentry_integration;
