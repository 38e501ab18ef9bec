//! Request and response bodies for the audit endpoints

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::rule::NormalizedRuleSet;
use crate::infrastructure::normalization::NormalizationOutput;

/// Body of `POST /v1/audits`
#[derive(Debug, Clone, Deserialize)]
pub struct AuditRequest {
    /// Provider identifier, e.g. "gcp" or "palo_alto"
    pub provider: String,
    /// Raw provider-native rule objects
    pub rules: Vec<Value>,
    /// Stated intent of the rule set, in plain language
    pub intent: String,
}

/// Body of `POST /v1/rules/normalize`
#[derive(Debug, Clone, Deserialize)]
pub struct NormalizeRequest {
    pub provider: String,
    pub rules: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NormalizeResponse {
    pub rule_set: NormalizedRuleSet,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub confidence: f32,
}

impl From<NormalizationOutput> for NormalizeResponse {
    fn from(output: NormalizationOutput) -> Self {
        Self {
            rule_set: output.rule_set,
            warnings: output.warnings,
            errors: output.errors,
            confidence: output.confidence,
        }
    }
}

/// Body of `POST /v1/feedback`
#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    /// Description of the audited issue, as shown to the reviewer
    pub issue_text: String,
    /// The remediation the reviewer approved
    pub approved_fix: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClearCacheResponse {
    pub cleared: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_request_deserialization() {
        let json = r#"{
            "provider": "gcp",
            "rules": [{"name": "allow-https", "direction": "INGRESS"}],
            "intent": "Allow HTTPS only"
        }"#;

        let request: AuditRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.provider, "gcp");
        assert_eq!(request.rules.len(), 1);
        assert_eq!(request.intent, "Allow HTTPS only");
    }

    #[test]
    fn test_feedback_request_deserialization() {
        let json = r#"{"issue_text": "SSH open to 0.0.0.0/0", "approved_fix": "Restrict to bastion CIDR"}"#;

        let request: FeedbackRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.issue_text, "SSH open to 0.0.0.0/0");
    }
}
