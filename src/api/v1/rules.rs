//! Rule normalization endpoint handlers

use axum::extract::State;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, NormalizeRequest, NormalizeResponse};

use super::audits::parse_provider;

/// POST /v1/rules/normalize
///
/// Normalizes provider-native rules without triggering an audit. Useful for
/// previewing how a rule set will look to the analyzer.
pub async fn normalize_rules(
    State(state): State<AppState>,
    Json(request): Json<NormalizeRequest>,
) -> Result<Json<NormalizeResponse>, ApiError> {
    debug!(
        provider = %request.provider,
        rules = request.rules.len(),
        "Normalizing rules"
    );

    let provider = parse_provider(&request.provider)?;

    let output = state
        .audit_service
        .normalize_rules(&request.rules, provider)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(NormalizeResponse::from(output)))
}
