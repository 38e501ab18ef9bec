//! Rule normalization engine
//!
//! Stateless, deterministic translation of provider-tagged raw rule payloads
//! into a `NormalizedRuleSet`. Malformed rules are excluded and reported per
//! rule; the batch fails only when nothing normalizes.

use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::domain::DomainError;
use crate::domain::rule::{CloudProvider, NormalizedRuleSet};

use super::providers;

/// Result of normalizing one batch
#[derive(Debug, Clone)]
pub struct NormalizationOutput {
    pub rule_set: NormalizedRuleSet,
    /// Non-fatal per-rule warnings (fallbacks, defaults)
    pub warnings: Vec<String>,
    /// Per-rule errors for rules excluded from the set
    pub errors: Vec<String>,
    /// Mean per-rule normalization confidence, 0.1 to 1.0
    pub confidence: f32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizationEngine;

impl NormalizationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a batch of raw rules for one provider.
    pub fn normalize(
        &self,
        raw_rules: &[Value],
        provider: CloudProvider,
    ) -> Result<NormalizationOutput, DomainError> {
        if raw_rules.is_empty() {
            return Err(DomainError::validation("No rules provided"));
        }

        let mut rules = Vec::with_capacity(raw_rules.len());
        let mut warnings = Vec::new();
        let mut errors = Vec::new();
        let mut confidence_sum = 0.0f32;

        for (index, raw) in raw_rules.iter().enumerate() {
            match providers::map_rule(raw, provider) {
                Ok(mapped) => {
                    let mut rule = mapped.rule;
                    if rule.id.is_empty() {
                        rule.id = synthetic_id(&rule.name, raw, index)?;
                    }
                    warnings.extend(mapped.warnings);
                    confidence_sum += mapped.confidence;
                    rules.push(rule);
                }
                Err(message) => {
                    warn!(provider = %provider, index, "Rule failed to normalize: {}", message);
                    errors.push(format!("rule {}: {}", index, message));
                }
            }
        }

        if rules.is_empty() {
            return Err(DomainError::validation(format!(
                "No rules normalized successfully: {}",
                errors.join("; ")
            )));
        }

        let confidence = (confidence_sum / rules.len() as f32).clamp(0.1, 1.0);

        debug!(
            provider = %provider,
            normalized = rules.len(),
            excluded = errors.len(),
            confidence,
            "Normalized rule batch"
        );

        Ok(NormalizationOutput {
            rule_set: NormalizedRuleSet::new(provider, rules),
            warnings,
            errors,
            confidence,
        })
    }
}

/// Deterministic synthetic id for a rule the source left anonymous.
///
/// Derived from the raw payload and batch position, never wall-clock or
/// random, so re-normalizing the same input yields the same ids.
fn synthetic_id(name: &str, raw: &Value, index: usize) -> Result<String, DomainError> {
    let payload = serde_json::to_vec(raw)
        .map_err(|e| DomainError::internal(format!("Failed to serialize raw rule: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(&payload);
    hasher.update(index.to_be_bytes());
    let digest = hex::encode(hasher.finalize());

    if name.is_empty() {
        Ok(format!("rule-{}", &digest[..12]))
    } else {
        Ok(format!("{}-{}", name, &digest[..12]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rule::{RuleAction, SCHEMA_VERSION};
    use serde_json::json;

    fn gcp_https() -> Value {
        json!({
            "name": "allow-https",
            "direction": "INGRESS",
            "priority": 1000,
            "sourceRanges": ["0.0.0.0/0"],
            "allowed": [{"IPProtocol": "tcp", "ports": ["443"]}]
        })
    }

    #[test]
    fn test_normalize_batch() {
        let engine = NormalizationEngine::new();

        let output = engine
            .normalize(&[gcp_https()], CloudProvider::Gcp)
            .unwrap();

        assert_eq!(output.rule_set.len(), 1);
        assert_eq!(output.rule_set.schema_version, SCHEMA_VERSION);
        assert!(output.errors.is_empty());
        assert!(output.confidence > 0.9);
    }

    #[test]
    fn test_synthetic_ids_are_deterministic() {
        let engine = NormalizationEngine::new();

        let first = engine
            .normalize(&[gcp_https()], CloudProvider::Gcp)
            .unwrap();
        let second = engine
            .normalize(&[gcp_https()], CloudProvider::Gcp)
            .unwrap();

        assert_eq!(first.rule_set.rules()[0].id, second.rule_set.rules()[0].id);
        assert!(first.rule_set.rules()[0].id.starts_with("allow-https-"));
    }

    #[test]
    fn test_identical_anonymous_rules_get_distinct_ids() {
        let engine = NormalizationEngine::new();
        let rule = json!({
            "direction": "INGRESS",
            "allowed": [{"IPProtocol": "tcp", "ports": ["22"]}]
        });

        let output = engine
            .normalize(&[rule.clone(), rule], CloudProvider::Gcp)
            .unwrap();

        assert_ne!(output.rule_set.rules()[0].id, output.rule_set.rules()[1].id);
    }

    #[test]
    fn test_malformed_rule_is_excluded_not_fatal() {
        let engine = NormalizationEngine::new();

        let output = engine
            .normalize(&[gcp_https(), json!("garbage")], CloudProvider::Gcp)
            .unwrap();

        assert_eq!(output.rule_set.len(), 1);
        assert_eq!(output.errors.len(), 1);
    }

    #[test]
    fn test_all_malformed_fails_batch() {
        let engine = NormalizationEngine::new();

        let result = engine.normalize(&[json!("garbage"), json!(42)], CloudProvider::Gcp);

        assert!(result.is_err());
    }

    #[test]
    fn test_empty_batch_fails() {
        let engine = NormalizationEngine::new();

        assert!(engine.normalize(&[], CloudProvider::Gcp).is_err());
    }

    // Same business intent from two vendors converges on the same canonical
    // core, differing only in provider-specific leftovers.
    #[test]
    fn test_cross_provider_equivalence() {
        let engine = NormalizationEngine::new();

        let gcp = engine
            .normalize(&[gcp_https()], CloudProvider::Gcp)
            .unwrap();
        let azure = engine
            .normalize(
                &[json!({
                    "name": "allow-https",
                    "direction": "Inbound",
                    "access": "Allow",
                    "protocol": "Tcp",
                    "priority": 100,
                    "sourceAddressPrefix": "0.0.0.0/0",
                    "destinationPortRange": "443"
                })],
                CloudProvider::Azure,
            )
            .unwrap();

        let g = &gcp.rule_set.rules()[0];
        let a = &azure.rule_set.rules()[0];

        assert_eq!(g.action, RuleAction::Allow);
        assert_eq!(g.action, a.action);
        assert_eq!(g.direction, a.direction);
        assert_eq!(g.protocols, a.protocols);
        assert_eq!(g.ports, a.ports);
        assert_eq!(g.source_ranges, a.source_ranges);
    }
}
