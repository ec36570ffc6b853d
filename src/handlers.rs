//! Operation handlers: account lookup, cash deposit, cash withdrawal.
//!
//! Each handler validates its input, forwards it through the
//! [`UpstreamClient`] and wraps the upstream payload (`accounts` or
//! `result`). Failures of either step become an [`ApiError`], which is
//! the only place the error envelope is produced.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::error::{UpstreamError, Violation};
use crate::middleware::correlation::CorrelationId;
use crate::server::AppState;
use crate::validation::{self, CashMovement};

pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const EXTERNAL_ERROR: &str = "EXTERNAL_ERROR";

#[derive(Debug, Serialize)]
pub struct AccountsResponse {
    pub accounts: Value,
}

#[derive(Debug, Serialize)]
pub struct MovementResponse {
    pub result: Value,
}

#[derive(Debug, Serialize)]
pub struct ValidationEnvelope {
    pub error: &'static str,
    pub details: Vec<Violation>,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: &'static str,
    pub message: String,
    pub external: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed with {} violation(s)", .0.len())]
    Validation(Vec<Violation>),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(details) => (
                StatusCode::BAD_REQUEST,
                Json(ValidationEnvelope {
                    error: VALIDATION_ERROR,
                    details,
                }),
            )
                .into_response(),
            Self::Upstream(err) => {
                let status = err.status_code().unwrap_or(StatusCode::BAD_GATEWAY);
                let envelope = ErrorEnvelope {
                    error: EXTERNAL_ERROR,
                    message: err.to_string(),
                    external: err.payload().cloned().unwrap_or(Value::Null),
                };
                (status, Json(envelope)).into_response()
            }
        }
    }
}

/// `GET /api/cuentas/{national_id}`
pub async fn lookup_accounts(
    State(state): State<Arc<AppState>>,
    correlation_id: CorrelationId,
    raw_id: Result<Path<String>, PathRejection>,
) -> Result<Json<AccountsResponse>, ApiError> {
    tracing::info!(correlation_id = %correlation_id, operation = "lookup_accounts", "request received");

    let national_id = raw_id
        .map_err(|e| vec![path_violation(&e)])
        .and_then(|Path(raw)| validation::national_id(&raw))
        .map_err(|v| rejected(&correlation_id, v))?;
    let accounts = state
        .upstream
        .lookup_accounts(&national_id, &correlation_id)
        .await?;

    Ok(Json(AccountsResponse { accounts }))
}

/// `POST /api/abonarefectivo`
pub async fn deposit_cash(
    State(state): State<Arc<AppState>>,
    correlation_id: CorrelationId,
    body: Bytes,
) -> Result<(StatusCode, Json<MovementResponse>), ApiError> {
    tracing::info!(correlation_id = %correlation_id, operation = "deposit_cash", "request received");

    let movement = parse_movement(&body).map_err(|v| rejected(&correlation_id, v))?;
    let result = state
        .upstream
        .deposit_cash(&movement, &correlation_id)
        .await?;

    Ok((StatusCode::CREATED, Json(MovementResponse { result })))
}

/// `POST /api/retirarefectivo`
pub async fn withdraw_cash(
    State(state): State<Arc<AppState>>,
    correlation_id: CorrelationId,
    body: Bytes,
) -> Result<(StatusCode, Json<MovementResponse>), ApiError> {
    tracing::info!(correlation_id = %correlation_id, operation = "withdraw_cash", "request received");

    let movement = parse_movement(&body).map_err(|v| rejected(&correlation_id, v))?;
    let result = state
        .upstream
        .withdraw_cash(&movement, &correlation_id)
        .await?;

    Ok((StatusCode::CREATED, Json(MovementResponse { result })))
}

/// Decode the raw body and validate it as a cash movement.
///
/// An empty body counts as missing; unparseable JSON is reported as a
/// violation on `body` instead of the framework's plain-text rejection.
fn parse_movement(body: &[u8]) -> Result<CashMovement, Vec<Violation>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return validation::cash_movement(None);
    }
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        vec![Violation::new(
            format!("\"body\" must be valid JSON ({e})"),
            &["body"],
        )]
    })?;
    validation::cash_movement(Some(&value))
}

/// A segment axum could not decode (e.g. percent-encoded bytes that are
/// not UTF-8) is reported like any other malformed national id.
fn path_violation(rejection: &PathRejection) -> Violation {
    Violation::new(
        format!("\"nationalId\" must be a valid string ({})", rejection.body_text()),
        &["params", "nationalId"],
    )
}

fn rejected(correlation_id: &CorrelationId, violations: Vec<Violation>) -> ApiError {
    tracing::warn!(
        correlation_id = %correlation_id,
        violations = violations.len(),
        first = %violations.first().map(ToString::to_string).unwrap_or_default(),
        "request rejected by validation"
    );
    ApiError::Validation(violations)
}
