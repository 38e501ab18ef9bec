//! Audit endpoint handlers

use axum::extract::State;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, AuditRequest, Json};
use crate::domain::audit::AuditResult;
use crate::domain::rule::CloudProvider;

/// POST /v1/audits
pub async fn create_audit(
    State(state): State<AppState>,
    Json(request): Json<AuditRequest>,
) -> Result<Json<AuditResult>, ApiError> {
    debug!(
        provider = %request.provider,
        rules = request.rules.len(),
        "Running audit"
    );

    let provider = parse_provider(&request.provider)?;

    let result = state
        .audit_service
        .audit(&request.rules, provider, &request.intent)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(result))
}

pub(super) fn parse_provider(value: &str) -> Result<CloudProvider, ApiError> {
    CloudProvider::parse(value).ok_or_else(|| {
        ApiError::bad_request(format!(
            "Unsupported provider '{}'. Expected one of: gcp, azure, aviatrix, cisco, palo_alto",
            value
        ))
        .with_param("provider")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_provider_known() {
        assert_eq!(parse_provider("gcp").unwrap(), CloudProvider::Gcp);
        assert_eq!(parse_provider("PaloAlto").unwrap(), CloudProvider::PaloAlto);
    }

    #[test]
    fn test_parse_provider_unknown() {
        let err = parse_provider("oracle").unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.param, Some("provider".to_string()));
    }
}
