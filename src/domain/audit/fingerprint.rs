//! Audit fingerprinting
//!
//! Produces the exact-match context cache key for an audit request. Two
//! requests share a fingerprint iff their normalized rule set, audit intent
//! and model id are all semantically identical.

use sha2::{Digest, Sha256};

use crate::domain::DomainError;
use crate::domain::rule::NormalizedRuleSet;

/// Compute the SHA-256 hex fingerprint of an audit request.
///
/// Serialization is canonical: struct fields serialize in declaration order,
/// `provider_specific` is a BTreeMap, and `serde_json::to_vec` emits no
/// incidental whitespace. Intent is trimmed and lowercased so cosmetic
/// variations of the same question key identically. Components are separated
/// by a byte that cannot appear in JSON or the digest inputs.
pub fn fingerprint(
    rule_set: &NormalizedRuleSet,
    intent: &str,
    model_id: &str,
) -> Result<String, DomainError> {
    let rules_json = serde_json::to_vec(rule_set)
        .map_err(|e| DomainError::internal(format!("Failed to serialize rule set: {}", e)))?;

    let mut hasher = Sha256::new();
    hasher.update(&rules_json);
    hasher.update([0x1f]);
    hasher.update(intent.trim().to_lowercase().as_bytes());
    hasher.update([0x1f]);
    hasher.update(model_id.as_bytes());

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rule::{
        CanonicalRule, CloudProvider, PriorityOrder, RuleAction, RuleDirection,
    };

    fn sample_rule_set() -> NormalizedRuleSet {
        let rule = CanonicalRule::new(
            "fw-1",
            "allow-https",
            CloudProvider::Gcp,
            RuleDirection::Ingress,
            RuleAction::Allow,
        )
        .with_priority(1000, PriorityOrder::LowerFirst)
        .with_source_ranges(vec!["0.0.0.0/0".into()])
        .with_protocols(vec!["tcp".into()])
        .with_ports(vec!["443".into()]);

        NormalizedRuleSet::new(CloudProvider::Gcp, vec![rule])
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let set = sample_rule_set();
        let a = fingerprint(&set, "check for exposure", "gpt-4").unwrap();
        let b = fingerprint(&set, "check for exposure", "gpt-4").unwrap();

        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_fingerprint_normalizes_intent() {
        let set = sample_rule_set();
        let a = fingerprint(&set, "Check for exposure", "gpt-4").unwrap();
        let b = fingerprint(&set, "  check for exposure  ", "gpt-4").unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_sensitive_to_intent() {
        let set = sample_rule_set();
        let a = fingerprint(&set, "check for exposure", "gpt-4").unwrap();
        let b = fingerprint(&set, "check for compliance", "gpt-4").unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_sensitive_to_model() {
        let set = sample_rule_set();
        let a = fingerprint(&set, "check", "gpt-4").unwrap();
        let b = fingerprint(&set, "check", "gpt-4o-mini").unwrap();

        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_sensitive_to_rule_content() {
        let base = sample_rule_set();

        let mut changed_rule = base.rules()[0].clone();
        changed_rule.ports = vec!["8443".into()];
        let changed = NormalizedRuleSet::new(CloudProvider::Gcp, vec![changed_rule]);

        let a = fingerprint(&base, "check", "gpt-4").unwrap();
        let b = fingerprint(&changed, "check", "gpt-4").unwrap();

        assert_ne!(a, b);
    }
}
