//! Canonical firewall rule model
//!
//! Vendor-neutral representation shared by normalization, fingerprinting
//! and analysis. The typed core is fixed; anything vendor-specific that has
//! no canonical equivalent rides along in `provider_specific` untouched so a
//! later re-export can reconstruct the native rule.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Current canonical schema version, stamped on every rule set.
pub const SCHEMA_VERSION: &str = "1.0";

/// Supported cloud/firewall vendors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloudProvider {
    Gcp,
    Azure,
    Aviatrix,
    Cisco,
    PaloAlto,
}

impl CloudProvider {
    /// Parse a provider tag as it appears in request payloads.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "gcp" => Some(Self::Gcp),
            "azure" => Some(Self::Azure),
            "aviatrix" => Some(Self::Aviatrix),
            "cisco" => Some(Self::Cisco),
            "palo_alto" | "paloalto" => Some(Self::PaloAlto),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gcp => "gcp",
            Self::Azure => "azure",
            Self::Aviatrix => "aviatrix",
            Self::Cisco => "cisco",
            Self::PaloAlto => "palo_alto",
        }
    }
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Traffic direction, always populated after normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleDirection {
    Ingress,
    Egress,
}

/// Rule action, always populated after normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Deny,
    Redirect,
}

/// Provider-native ordering semantics for the `priority` field.
///
/// Recorded separately from the canonical priority value because vendors
/// disagree on whether a lower number wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityOrder {
    /// Lower numeric priority takes precedence (GCP, Azure, Cisco line numbers)
    LowerFirst,
    /// Higher numeric priority takes precedence
    HigherFirst,
}

/// One network-policy rule in vendor-neutral form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRule {
    /// Stable identifier, unique within one normalization batch
    pub id: String,
    pub name: String,
    pub provider: CloudProvider,
    pub direction: RuleDirection,
    pub action: RuleAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    /// How `priority` orders rules on the source provider
    pub priority_order: PriorityOrder,
    /// Ordered CIDR blocks or symbolic labels
    #[serde(default)]
    pub source_ranges: Vec<String>,
    #[serde(default)]
    pub destination_ranges: Vec<String>,
    /// Lowercased protocol names, insertion-ordered, deduplicated
    #[serde(default)]
    pub protocols: Vec<String>,
    /// Port or port-range strings ("443", "8000-8080")
    #[serde(default)]
    pub ports: Vec<String>,
    #[serde(default)]
    pub source_tags: Vec<String>,
    #[serde(default)]
    pub target_tags: Vec<String>,
    #[serde(default)]
    pub logging_enabled: bool,
    #[serde(default)]
    pub disabled: bool,
    /// Vendor fields with no canonical equivalent, preserved verbatim.
    /// BTreeMap keeps serialization order stable for fingerprinting.
    #[serde(default)]
    pub provider_specific: BTreeMap<String, serde_json::Value>,
}

impl CanonicalRule {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        provider: CloudProvider,
        direction: RuleDirection,
        action: RuleAction,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            provider,
            direction,
            action,
            priority: None,
            priority_order: PriorityOrder::LowerFirst,
            source_ranges: Vec::new(),
            destination_ranges: Vec::new(),
            protocols: Vec::new(),
            ports: Vec::new(),
            source_tags: Vec::new(),
            target_tags: Vec::new(),
            logging_enabled: false,
            disabled: false,
            provider_specific: BTreeMap::new(),
        }
    }

    pub fn with_priority(mut self, priority: i64, order: PriorityOrder) -> Self {
        self.priority = Some(priority);
        self.priority_order = order;
        self
    }

    pub fn with_source_ranges(mut self, ranges: Vec<String>) -> Self {
        self.source_ranges = ranges;
        self
    }

    pub fn with_destination_ranges(mut self, ranges: Vec<String>) -> Self {
        self.destination_ranges = ranges;
        self
    }

    pub fn with_protocols(mut self, protocols: Vec<String>) -> Self {
        self.protocols = protocols;
        self
    }

    pub fn with_ports(mut self, ports: Vec<String>) -> Self {
        self.ports = ports;
        self
    }
}

/// Ordered, immutable batch of canonical rules from a single provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRuleSet {
    pub schema_version: String,
    pub provider: CloudProvider,
    rules: Vec<CanonicalRule>,
}

impl NormalizedRuleSet {
    pub fn new(provider: CloudProvider, rules: Vec<CanonicalRule>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            provider,
            rules,
        }
    }

    pub fn rules(&self) -> &[CanonicalRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse() {
        assert_eq!(CloudProvider::parse("gcp"), Some(CloudProvider::Gcp));
        assert_eq!(CloudProvider::parse("GCP"), Some(CloudProvider::Gcp));
        assert_eq!(
            CloudProvider::parse("palo_alto"),
            Some(CloudProvider::PaloAlto)
        );
        assert_eq!(
            CloudProvider::parse("paloalto"),
            Some(CloudProvider::PaloAlto)
        );
        assert_eq!(CloudProvider::parse("oracle"), None);
    }

    #[test]
    fn test_rule_builder() {
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

        assert_eq!(rule.id, "fw-1");
        assert_eq!(rule.priority, Some(1000));
        assert_eq!(rule.ports, vec!["443"]);
        assert!(!rule.disabled);
    }

    #[test]
    fn test_rule_set_is_versioned() {
        let set = NormalizedRuleSet::new(CloudProvider::Azure, vec![]);
        assert_eq!(set.schema_version, SCHEMA_VERSION);
        assert!(set.is_empty());
    }

    #[test]
    fn test_rule_serialization_round_trip() {
        let mut rule = CanonicalRule::new(
            "fw-2",
            "deny-all",
            CloudProvider::Cisco,
            RuleDirection::Egress,
            RuleAction::Deny,
        );
        rule.provider_specific
            .insert("line_number".into(), serde_json::json!(40));

        let json = serde_json::to_string(&rule).unwrap();
        let back: CanonicalRule = serde_json::from_str(&json).unwrap();

        assert_eq!(back, rule);
        assert!(json.contains("\"action\":\"deny\""));
        assert!(json.contains("\"direction\":\"egress\""));
    }
}
