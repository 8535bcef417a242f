//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (ready to serve traffic)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Kubernetes liveness probe.
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Kubernetes readiness probe.
/// Returns 200 if the index answers queries.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.store.len().is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health
///
/// Full health status with index details.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let records = state.store.len();
    let index_ok = records.is_ok();

    if let Err(ref e) = records {
        tracing::warn!("Index health check failed: {}", e);
    }

    Json(HealthResponse {
        status: if index_ok { "healthy" } else { "unhealthy" }.to_string(),
        index: if index_ok { "ok" } else { "error" }.to_string(),
        backend: state.backend.to_string(),
        records: records.unwrap_or(0),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
