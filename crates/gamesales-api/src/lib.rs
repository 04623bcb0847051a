//! GameSales REST API
//!
//! JSON API serving the progression pages and the sale, goal and signup
//! write paths.
//!
//! # Architecture
//!
//! ```text
//! /health                        - Liveness
//! /ready                         - Store readiness
//! /api/v1/
//! ├── dashboard                  - Session user's summary
//! ├── rankings                   - Leaderboard
//! ├── race                       - Monthly race track
//! ├── achievements               - Catalog with unlocks
//! ├── missions                   - Active missions with progress
//! ├── goals                      - Goal boards / create (staff)
//! ├── sales                      - Record / list (staff)
//! │   ├── :id                    - Edit (staff)
//! │   └── :id/cancel             - Cancel (staff)
//! └── signups                    - Pending requests (master)
//!     ├── :id/approve
//!     └── :id/reject
//! ```
//!
//! Authentication is handled upstream. Every `/api/v1` request carries the
//! authenticated user id in the `X-User-Id` header; users whose profile has
//! not been approved get `403 AWAITING_APPROVAL`.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod views;

use axum::{extract::DefaultBodyLimit, http::HeaderName, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use extractors::USER_ID_HEADER;
pub use state::AppState;
pub use views::{spawn_refresher, ViewCache};

/// API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Enable CORS
    pub enable_cors: bool,
    /// Allowed CORS origins
    pub cors_origins: Vec<String>,
    /// Enable response compression
    pub enable_compression: bool,
    /// Enable request tracing
    pub enable_tracing: bool,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enable_cors: true,
            cors_origins: vec!["*".to_string()],
            enable_compression: true,
            enable_tracing: true,
            max_body_size: 1024 * 1024,
        }
    }
}

/// Create the main API router with all middleware
pub fn create_router(state: Arc<AppState>, config: ApiConfig) -> Router {
    let mut router = Router::new()
        .nest("/api/v1", routes::api_v1_routes())
        .route("/health", axum::routing::get(handlers::health::health_check))
        .route("/ready", axum::routing::get(handlers::health::readiness_check))
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .with_state(state);

    let x_request_id = HeaderName::from_static("x-request-id");
    router = router
        .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
        .layer(PropagateRequestIdLayer::new(x_request_id));

    if config.enable_tracing {
        router = router.layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");

                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        );
    }

    if config.enable_compression {
        router = router.layer(CompressionLayer::new());
    }

    if config.enable_cors {
        let cors = if config.cors_origins.iter().any(|o| o == "*") {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
                .allow_origin(
                    config
                        .cors_origins
                        .iter()
                        .filter_map(|o| o.parse().ok())
                        .collect::<Vec<_>>(),
                )
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers(Any)
        };
        router = router.layer(cors);
    }

    router
}

/// Create a minimal router for testing
pub fn create_test_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_v1_routes())
        .route("/health", axum::routing::get(handlers::health::health_check))
        .route("/ready", axum::routing::get(handlers::health::readiness_check))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert!(config.enable_cors);
        assert!(config.enable_compression);
        assert_eq!(config.max_body_size, 1024 * 1024);
    }

    #[test]
    fn test_partial_config() {
        let config: ApiConfig =
            serde_json::from_str(r#"{ "cors_origins": ["https://vendas.example.com"] }"#).unwrap();
        assert_eq!(config.cors_origins.len(), 1);
        assert!(config.enable_tracing);
    }
}
