// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the request throttle service.
//!
//! The service is consulted by the application backend (or a proxy) before
//! a guarded operation runs. `/check` always answers 200 with a decision
//! body so the caller can read `allowed`, `requires_challenge` and the reset
//! time; translating that into a status code or UI message is the caller's job.

use crate::config::Config;
use crate::error::ThrottleError;
use crate::limiter::Decision;
use crate::metrics::Metrics;
use crate::registry::{LimiterKind, LimiterRegistry};
use crate::validator::{is_valid_ip, scan_input, InputRisk};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

/// Shared application state.
pub struct AppState {
    pub limiters: Arc<LimiterRegistry>,
    pub metrics: Arc<Metrics>,
    pub config: Config,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Attempt check request.
#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub kind: String,
    pub identifier: String,
    #[serde(default)]
    pub origin: Option<String>,
}

/// Attempt check response.
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    #[serde(flatten)]
    pub decision: Decision,
    pub retry_after_secs: u64,
    /// Set when a supplied origin is not an IP literal
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub origin_not_ip: bool,
}

/// Reset request, issued after a solved challenge.
#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub kind: String,
    pub identifier: String,
    #[serde(default)]
    pub origin: Option<String>,
}

/// Suspicious-origin listing.
#[derive(Debug, Serialize)]
pub struct SuspiciousResponse {
    pub kind: LimiterKind,
    pub origins: Vec<String>,
}

/// Free-text scan request.
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub input: String,
}

impl IntoResponse for ThrottleError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ThrottleError::EmptyIdentifier => (StatusCode::BAD_REQUEST, "EMPTY_IDENTIFIER"),
            ThrottleError::UnknownLimiter(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_LIMITER"),
            ThrottleError::InvalidConfig { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INVALID_CONFIG")
            }
            ThrottleError::RandomSourceUnavailable(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "RANDOM_SOURCE_UNAVAILABLE")
            }
        };
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
                code,
            }),
        )
            .into_response()
    }
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/check", post(check))
        .route("/reset", post(reset))
        .route("/suspicious/:kind", get(list_suspicious))
        .route("/suspicious/:kind/:origin", delete(clear_suspicious))
        .route("/scan", post(scan));

    if state.config.metrics.enabled {
        app = app.route(&state.config.metrics.path, get(metrics_handler));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "request-throttle",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Count an attempt and return the limiter's decision.
pub async fn check(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckRequest>,
) -> Result<Json<CheckResponse>, ThrottleError> {
    let kind: LimiterKind = req.kind.parse()?;
    let limiter = state.limiters.get(kind);
    let origin = req.origin.as_deref();

    let origin_not_ip = match origin {
        Some(o) if !o.trim().is_empty() && !is_valid_ip(o) => {
            debug!(%kind, origin = %o, "Origin is not an IP literal");
            true
        }
        _ => false,
    };

    let decision = limiter.check_limit(&req.identifier, origin)?;
    state.metrics.record_decision(kind, &decision);

    if !decision.allowed {
        debug!(
            %kind,
            origin = origin.unwrap_or("unknown"),
            reason = ?decision.block_reason.map(|r| r.to_string()),
            "Attempt rejected"
        );
    }

    let retry_after_secs = if decision.allowed {
        0
    } else {
        decision.retry_after(limiter.now_ms()).as_secs()
    };

    Ok(Json(CheckResponse {
        decision,
        retry_after_secs,
        origin_not_ip,
    }))
}

/// Clear the record for a key.
pub async fn reset(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetRequest>,
) -> Result<StatusCode, ThrottleError> {
    let kind: LimiterKind = req.kind.parse()?;
    state
        .limiters
        .get(kind)
        .reset(&req.identifier, req.origin.as_deref())?;
    Ok(StatusCode::NO_CONTENT)
}

/// List flagged origins for a limiter.
pub async fn list_suspicious(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
) -> Result<Json<SuspiciousResponse>, ThrottleError> {
    let kind: LimiterKind = kind.parse()?;
    Ok(Json(SuspiciousResponse {
        kind,
        origins: state.limiters.get(kind).suspicious_origins(),
    }))
}

/// Remove an origin from a limiter's suspicious list.
pub async fn clear_suspicious(
    State(state): State<Arc<AppState>>,
    Path((kind, origin)): Path<(String, String)>,
) -> Result<StatusCode, ThrottleError> {
    let kind: LimiterKind = kind.parse()?;
    if state.limiters.get(kind).clear_suspicious_origin(&origin) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Ok(StatusCode::NOT_FOUND)
    }
}

/// Run the advisory input scanner.
pub async fn scan(Json(req): Json<ScanRequest>) -> Json<InputRisk> {
    Json(scan_input(&req.input))
}

/// Prometheus exposition.
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    state.metrics.observe(&state.limiters);
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
