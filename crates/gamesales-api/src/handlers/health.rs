//! Health Check Handlers
//!
//! Endpoints for service health monitoring.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Timestamp (ms)
    pub timestamp: i64,
}

/// Readiness check response
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    /// Overall status
    pub status: String,
    /// Store backend name
    pub backend: String,
    /// Response time in ms
    pub latency_ms: u64,
    /// Error message if unhealthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health check endpoint
///
/// Returns 200 while the process is serving requests. Dependencies are not
/// checked here; see [`readiness_check`].
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().timestamp_millis(),
    })
}

/// Readiness check endpoint
///
/// Returns 503 when the store cannot be reached.
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let started = std::time::Instant::now();
    let result = state.store.health_check().await;
    let latency_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(health) if health.healthy => (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready".to_string(),
                backend: health.backend,
                latency_ms,
                error: None,
            }),
        ),
        Ok(health) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready".to_string(),
                backend: health.backend,
                latency_ms,
                error: None,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessResponse {
                    status: "not_ready".to_string(),
                    backend: "unknown".to_string(),
                    latency_ms,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}
