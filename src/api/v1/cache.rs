//! Cache administration endpoint handlers

use axum::extract::State;
use tracing::{debug, info};

use crate::api::state::AppState;
use crate::api::types::{ApiError, ClearCacheResponse, Json};
use crate::infrastructure::services::CacheStatsSnapshot;

/// GET /v1/cache/stats
pub async fn cache_stats(
    State(state): State<AppState>,
) -> Result<Json<CacheStatsSnapshot>, ApiError> {
    debug!("Fetching cache statistics");

    let stats = state
        .audit_service
        .cache_stats()
        .await
        .map_err(ApiError::from)?;

    Ok(Json(stats))
}

/// POST /v1/cache/clear
pub async fn clear_cache(State(state): State<AppState>) -> Result<Json<ClearCacheResponse>, ApiError> {
    info!("Clearing both cache tiers");

    state
        .audit_service
        .clear_cache()
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ClearCacheResponse { cleared: true }))
}
