//! Reviewer feedback endpoint handlers

use axum::extract::State;
use axum::http::StatusCode;
use tracing::info;

use crate::api::state::AppState;
use crate::api::types::{ApiError, FeedbackRequest, FeedbackResponse, Json};

/// POST /v1/feedback
///
/// Records a human-approved remediation. This is the only write path into
/// the semantic cache.
pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(request): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackResponse>), ApiError> {
    info!("Recording approved fix");

    let id = state
        .audit_service
        .submit_feedback(&request.issue_text, &request.approved_fix)
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(FeedbackResponse { id })))
}
