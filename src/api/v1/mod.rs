//! v1 API endpoints

pub mod audits;
pub mod cache;
pub mod feedback;
pub mod rules;

use axum::{
    Router,
    routing::{get, post},
};

use super::state::AppState;

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/audits", post(audits::create_audit))
        .route("/rules/normalize", post(rules::normalize_rules))
        .route("/cache/stats", get(cache::cache_stats))
        .route("/cache/clear", post(cache::clear_cache))
        .route("/feedback", post(feedback::submit_feedback))
}
