//! `bank-gateway run` — start the gateway.
//!
//! Resolves the [`GatewayConfig`] once, builds the shared state and
//! router, and serves until Ctrl+C / SIGTERM with graceful shutdown.

use std::sync::Arc;

use crate::cli::RunArgs;
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::logging;
use crate::server::{self, AppState};

pub async fn execute(args: RunArgs) -> Result<(), GatewayError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    let config = GatewayConfig::from_args(&args)?;

    #[cfg(feature = "sentry-integration")]
    let _sentry_guard = args.sentry_dsn.as_deref().and_then(|dsn| {
        crate::sentry_integration::init(dsn, args.sentry_environment.as_deref(), &config.upstream)
    });

    let state = Arc::new(AppState::new(&config));
    let router = server::build_router(state, config.max_body);

    let listener = tokio::net::TcpListener::bind(config.listen).await?;

    tracing::info!(
        addr = %config.listen,
        upstream = %config.upstream.base_url,
        timeout_ms = config.upstream.timeout_ms(),
        "bank-gateway started"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    tracing::info!("bank-gateway stopped");
    Ok(())
}
