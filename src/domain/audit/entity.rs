//! Audit result model

use serde::{Deserialize, Serialize};

/// Severity of a detected policy violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// A single policy violation found in a rule set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Canonical id of the offending rule
    pub rule_id: String,
    pub severity: ViolationSeverity,
    /// Short classifier ("overly_permissive", "missing_logging", ...)
    pub category: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
    /// 0.0 (benign) to 10.0 (critical exposure)
    pub risk_score: f32,
}

/// Where a recommendation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    /// Produced by the generative model on this audit
    Model,
    /// Substituted from a human-approved fix in the semantic cache
    SemanticCache,
}

/// A remediation recommendation attached to an audit result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    pub title: String,
    pub description: String,
    pub source: RecommendationSource,
    /// Cosine similarity of the semantic-cache match, when `source` is
    /// `SemanticCache`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
}

impl Recommendation {
    pub fn from_model(
        id: impl Into<String>,
        rule_id: Option<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            rule_id,
            title: title.into(),
            description: description.into(),
            source: RecommendationSource::Model,
            similarity: None,
        }
    }

    pub fn from_semantic_cache(
        id: impl Into<String>,
        rule_id: Option<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        similarity: f32,
    ) -> Self {
        Self {
            id: id.into(),
            rule_id,
            title: title.into(),
            description: description.into(),
            source: RecommendationSource::SemanticCache,
            similarity: Some(similarity),
        }
    }
}

/// Complete outcome of one audit request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    pub violations: Vec<Violation>,
    pub recommendations: Vec<Recommendation>,
    /// Model confidence in its own analysis, 0.0 to 1.0
    pub confidence_score: f32,
    pub execution_time_ms: u64,
    /// True only when the whole result was served from the context cache
    pub cached: bool,
    pub total_rules_processed: usize,
    /// Non-fatal normalization warnings carried through to the caller
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(ViolationSeverity::Critical > ViolationSeverity::High);
        assert!(ViolationSeverity::Medium > ViolationSeverity::Low);
    }

    #[test]
    fn test_recommendation_sources() {
        let model = Recommendation::from_model("r-1", Some("fw-1".into()), "Restrict", "desc");
        assert_eq!(model.source, RecommendationSource::Model);
        assert!(model.similarity.is_none());

        let cached =
            Recommendation::from_semantic_cache("r-2", None, "Restrict", "approved", 0.92);
        assert_eq!(cached.source, RecommendationSource::SemanticCache);
        assert_eq!(cached.similarity, Some(0.92));
    }

    #[test]
    fn test_audit_result_serialization() {
        let result = AuditResult {
            violations: vec![Violation {
                rule_id: "fw-1".into(),
                severity: ViolationSeverity::High,
                category: "overly_permissive".into(),
                description: "SSH open to the world".into(),
                remediation: Some("Restrict source ranges".into()),
                risk_score: 8.5,
            }],
            recommendations: vec![],
            confidence_score: 0.9,
            execution_time_ms: 120,
            cached: false,
            total_rules_processed: 3,
            warnings: vec![],
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"severity\":\"high\""));

        let back: AuditResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
