//! API Routes
//!
//! Route definitions for all API endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::state::AppState;

/// Create API v1 routes
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Progression pages (approved users)
        .route("/dashboard", get(handlers::progress::get_dashboard))
        .route("/rankings", get(handlers::progress::get_rankings))
        .route("/race", get(handlers::progress::get_race))
        .route("/achievements", get(handlers::progress::get_achievements))
        .route("/missions", get(handlers::progress::get_missions))
        // Goals
        .route(
            "/goals",
            get(handlers::goals::list_goals).post(handlers::goals::create_goal),
        )
        // Sales
        .nest("/sales", sales_routes())
        // Signup review (master only)
        .nest("/signups", signup_routes())
}

/// Sale routes
fn sales_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            get(handlers::sales::list_sales).post(handlers::sales::record_sale),
        )
        .route("/:id", put(handlers::sales::update_sale))
        .route("/:id/cancel", post(handlers::sales::cancel_sale))
}

/// Signup review routes
fn signup_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::signups::list_pending))
        .route("/:id/approve", post(handlers::signups::approve))
        .route("/:id/reject", post(handlers::signups::reject))
}
