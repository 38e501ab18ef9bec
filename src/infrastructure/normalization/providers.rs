//! Per-provider field mapping tables
//!
//! Each mapper translates one vendor-native rule payload into a
//! `CanonicalRule`, collecting non-fatal warnings along the way. Vendor
//! fields with no canonical slot are preserved verbatim in
//! `provider_specific`.

use serde_json::Value;

use crate::domain::rule::{CanonicalRule, CloudProvider, PriorityOrder, RuleAction, RuleDirection};

/// A mapped rule plus the confidence deductions observed while mapping it
pub struct MappedRule {
    pub rule: CanonicalRule,
    pub warnings: Vec<String>,
    /// 1.0 minus deductions for missing critical fields
    pub confidence: f32,
}

struct RuleBuilder {
    name: String,
    direction: Option<RuleDirection>,
    action: Option<RuleAction>,
    priority: Option<i64>,
    priority_order: PriorityOrder,
    source_ranges: Vec<String>,
    destination_ranges: Vec<String>,
    protocols: Vec<String>,
    ports: Vec<String>,
    source_tags: Vec<String>,
    target_tags: Vec<String>,
    logging_enabled: bool,
    disabled: bool,
    provider_specific: Vec<(String, Value)>,
    warnings: Vec<String>,
    deductions: f32,
}

impl RuleBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            direction: None,
            action: None,
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
            provider_specific: Vec::new(),
            warnings: Vec::new(),
            deductions: 0.0,
        }
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Resolve defaults, apply the conservative action fallback, and build.
    fn finish(mut self, provider: CloudProvider) -> MappedRule {
        let direction = match self.direction {
            Some(direction) => direction,
            None => {
                self.warn(format!(
                    "rule '{}': no direction field, defaulting to ingress",
                    self.name
                ));
                self.deductions += 0.2;
                RuleDirection::Ingress
            }
        };

        let action = match self.action {
            Some(action) => action,
            None => {
                self.warn(format!(
                    "rule '{}': unrecognized or missing action, defaulting to deny",
                    self.name
                ));
                self.deductions += 0.2;
                RuleAction::Deny
            }
        };

        if self.protocols.is_empty() {
            self.deductions += 0.2;
        }

        let mut rule = CanonicalRule::new("", self.name, provider, direction, action);
        rule.priority = self.priority;
        rule.priority_order = self.priority_order;
        rule.source_ranges = self.source_ranges;
        rule.destination_ranges = self.destination_ranges;
        rule.protocols = self.protocols;
        rule.ports = self.ports;
        rule.source_tags = self.source_tags;
        rule.target_tags = self.target_tags;
        rule.logging_enabled = self.logging_enabled;
        rule.disabled = self.disabled;
        rule.provider_specific = self.provider_specific.into_iter().collect();

        let confidence = (1.0 - self.deductions).clamp(0.1, 1.0);

        MappedRule {
            rule,
            warnings: self.warnings,
            confidence,
        }
    }
}

/// Dispatch a raw rule payload to its provider mapper.
pub fn map_rule(raw: &Value, provider: CloudProvider) -> Result<MappedRule, String> {
    let object = raw
        .as_object()
        .ok_or_else(|| "rule payload is not a JSON object".to_string())?;

    if object.is_empty() {
        return Err("rule payload is empty".to_string());
    }

    match provider {
        CloudProvider::Gcp => map_gcp(raw),
        CloudProvider::Azure => map_azure(raw),
        CloudProvider::Aviatrix => map_aviatrix(raw),
        CloudProvider::Cisco => map_cisco(raw),
        CloudProvider::PaloAlto => map_palo_alto(raw),
    }
}

fn str_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_string)
}

fn i64_field(raw: &Value, key: &str) -> Option<i64> {
    raw.get(key).and_then(Value::as_i64)
}

fn bool_field(raw: &Value, key: &str) -> bool {
    raw.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Accept either a single string or an array of strings.
fn string_list(raw: &Value, key: &str) -> Vec<String> {
    match raw.get(key) {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn push_unknown_fields(builder: &mut RuleBuilder, raw: &Value, known: &[&str]) {
    if let Some(object) = raw.as_object() {
        for (key, value) in object {
            if !known.contains(&key.as_str()) {
                builder
                    .provider_specific
                    .push((key.clone(), value.clone()));
            }
        }
    }
}

fn parse_direction(value: &str) -> Option<RuleDirection> {
    match value.to_ascii_lowercase().as_str() {
        "ingress" | "inbound" | "in" => Some(RuleDirection::Ingress),
        "egress" | "outbound" | "out" => Some(RuleDirection::Egress),
        _ => None,
    }
}

fn parse_action(value: &str) -> Option<RuleAction> {
    match value.to_ascii_lowercase().as_str() {
        "allow" | "permit" | "accept" => Some(RuleAction::Allow),
        "deny" | "drop" | "reject" | "block" => Some(RuleAction::Deny),
        "redirect" => Some(RuleAction::Redirect),
        _ => None,
    }
}

fn apply_direction(builder: &mut RuleBuilder, raw: &Value, key: &str) -> Result<(), String> {
    if let Some(value) = str_field(raw, key) {
        match parse_direction(&value) {
            Some(direction) => builder.direction = Some(direction),
            None => return Err(format!("unmappable direction '{}'", value)),
        }
    }
    Ok(())
}

fn apply_action(builder: &mut RuleBuilder, raw: &Value, key: &str) {
    if let Some(value) = str_field(raw, key) {
        match parse_action(&value) {
            Some(action) => builder.action = Some(action),
            None => builder.warn(format!(
                "rule '{}': unknown action '{}', falling back to deny",
                builder.name, value
            )),
        }
    }
}

fn normalize_protocol(protocol: &str) -> Option<String> {
    let lowered = protocol.to_ascii_lowercase();
    match lowered.as_str() {
        "*" | "any" | "all" | "ip" => None,
        _ => Some(lowered),
    }
}

fn push_protocol(builder: &mut RuleBuilder, protocol: &str) {
    if let Some(canonical) = normalize_protocol(protocol)
        && !builder.protocols.contains(&canonical)
    {
        builder.protocols.push(canonical);
    }
}

fn push_ports(builder: &mut RuleBuilder, ports: Vec<String>) {
    for port in ports {
        if port != "*" && port != "all" && !builder.ports.contains(&port) {
            builder.ports.push(port);
        }
    }
}

/// GCP VPC firewall rule. Action comes from the `allowed`/`denied` arrays of
/// `{IPProtocol, ports}` blocks rather than a scalar field.
fn map_gcp(raw: &Value) -> Result<MappedRule, String> {
    let name = str_field(raw, "name").unwrap_or_default();
    let mut builder = RuleBuilder::new(name);

    apply_direction(&mut builder, raw, "direction")?;

    let mut protocol_blocks: Option<&Vec<Value>> = None;
    if let Some(allowed) = raw.get("allowed").and_then(Value::as_array) {
        builder.action = Some(RuleAction::Allow);
        protocol_blocks = Some(allowed);
    } else if let Some(denied) = raw.get("denied").and_then(Value::as_array) {
        builder.action = Some(RuleAction::Deny);
        protocol_blocks = Some(denied);
    } else {
        apply_action(&mut builder, raw, "action");
    }

    if let Some(blocks) = protocol_blocks {
        for block in blocks {
            if let Some(protocol) = block.get("IPProtocol").and_then(Value::as_str) {
                push_protocol(&mut builder, protocol);
            }
            push_ports(&mut builder, string_list(block, "ports"));
        }
    }

    builder.priority = i64_field(raw, "priority");
    builder.priority_order = PriorityOrder::LowerFirst;
    builder.source_ranges = string_list(raw, "sourceRanges");
    builder.destination_ranges = string_list(raw, "destinationRanges");
    builder.source_tags = string_list(raw, "sourceTags");
    builder.target_tags = string_list(raw, "targetTags");
    builder.disabled = bool_field(raw, "disabled");
    builder.logging_enabled = raw
        .get("logConfig")
        .map(|c| bool_field(c, "enable"))
        .unwrap_or(false);

    push_unknown_fields(
        &mut builder,
        raw,
        &[
            "name",
            "direction",
            "allowed",
            "denied",
            "action",
            "priority",
            "sourceRanges",
            "destinationRanges",
            "sourceTags",
            "targetTags",
            "disabled",
            "logConfig",
        ],
    );

    Ok(builder.finish(CloudProvider::Gcp))
}

/// Azure NSG rule: `Inbound`/`Outbound` direction, `Allow`/`Deny` access.
fn map_azure(raw: &Value) -> Result<MappedRule, String> {
    let name = str_field(raw, "name").unwrap_or_default();
    let mut builder = RuleBuilder::new(name);

    apply_direction(&mut builder, raw, "direction")?;
    apply_action(&mut builder, raw, "access");

    if let Some(protocol) = str_field(raw, "protocol") {
        push_protocol(&mut builder, &protocol);
    }

    builder.priority = i64_field(raw, "priority");
    builder.priority_order = PriorityOrder::LowerFirst;

    let mut sources = string_list(raw, "sourceAddressPrefixes");
    if sources.is_empty() {
        sources = string_list(raw, "sourceAddressPrefix");
    }
    builder.source_ranges = sources;

    let mut destinations = string_list(raw, "destinationAddressPrefixes");
    if destinations.is_empty() {
        destinations = string_list(raw, "destinationAddressPrefix");
    }
    builder.destination_ranges = destinations;

    let mut ports = string_list(raw, "destinationPortRanges");
    if ports.is_empty() {
        ports = string_list(raw, "destinationPortRange");
    }
    push_ports(&mut builder, ports);

    builder.source_tags = string_list(raw, "sourceApplicationSecurityGroups");
    builder.target_tags = string_list(raw, "destinationApplicationSecurityGroups");

    push_unknown_fields(
        &mut builder,
        raw,
        &[
            "name",
            "direction",
            "access",
            "protocol",
            "priority",
            "sourceAddressPrefix",
            "sourceAddressPrefixes",
            "destinationAddressPrefix",
            "destinationAddressPrefixes",
            "destinationPortRange",
            "destinationPortRanges",
            "sourceApplicationSecurityGroups",
            "destinationApplicationSecurityGroups",
        ],
    );

    Ok(builder.finish(CloudProvider::Azure))
}

/// Aviatrix distributed cloud firewall policy. SmartGroups and WebGroups map
/// onto tags with a discriminating prefix so they survive canonicalization.
fn map_aviatrix(raw: &Value) -> Result<MappedRule, String> {
    let name = str_field(raw, "name")
        .or_else(|| str_field(raw, "display_name"))
        .unwrap_or_default();
    let mut builder = RuleBuilder::new(name);

    apply_direction(&mut builder, raw, "direction")?;
    apply_action(&mut builder, raw, "action");

    if let Some(protocol) = str_field(raw, "protocol") {
        push_protocol(&mut builder, &protocol);
    }
    push_ports(&mut builder, string_list(raw, "port_ranges"));

    builder.priority = i64_field(raw, "priority");
    builder.priority_order = PriorityOrder::LowerFirst;

    builder.source_tags = string_list(raw, "src_smart_groups")
        .into_iter()
        .map(|group| format!("smartgroup:{}", group))
        .collect();
    builder.target_tags = string_list(raw, "dst_smart_groups")
        .into_iter()
        .map(|group| format!("smartgroup:{}", group))
        .collect();
    builder.target_tags.extend(
        string_list(raw, "web_groups")
            .into_iter()
            .map(|group| format!("webgroup:{}", group)),
    );

    builder.logging_enabled = bool_field(raw, "logging");

    // Group indirection loses address-level detail
    builder.deductions += 0.1;

    push_unknown_fields(
        &mut builder,
        raw,
        &[
            "name",
            "display_name",
            "direction",
            "action",
            "protocol",
            "port_ranges",
            "priority",
            "src_smart_groups",
            "dst_smart_groups",
            "web_groups",
            "logging",
        ],
    );

    Ok(builder.finish(CloudProvider::Aviatrix))
}

/// Cisco ASA access-list entry: `permit`/`deny`, line numbers order the list.
fn map_cisco(raw: &Value) -> Result<MappedRule, String> {
    let name = str_field(raw, "name")
        .or_else(|| str_field(raw, "acl_name"))
        .unwrap_or_default();
    let mut builder = RuleBuilder::new(name);

    apply_direction(&mut builder, raw, "direction")?;
    apply_action(&mut builder, raw, "action");

    if let Some(protocol) = str_field(raw, "protocol") {
        push_protocol(&mut builder, &protocol);
    }

    builder.priority = i64_field(raw, "line");
    builder.priority_order = PriorityOrder::LowerFirst;
    builder.source_ranges = string_list(raw, "source");
    builder.destination_ranges = string_list(raw, "destination");
    push_ports(&mut builder, string_list(raw, "destination_port"));
    builder.logging_enabled = bool_field(raw, "log");

    push_unknown_fields(
        &mut builder,
        raw,
        &[
            "name",
            "acl_name",
            "direction",
            "action",
            "protocol",
            "line",
            "source",
            "destination",
            "destination_port",
            "log",
        ],
    );

    Ok(builder.finish(CloudProvider::Cisco))
}

/// Palo Alto security policy: zones map onto tags, services onto ports,
/// applications onto protocols where they name one.
fn map_palo_alto(raw: &Value) -> Result<MappedRule, String> {
    let name = str_field(raw, "name")
        .or_else(|| str_field(raw, "rule_name"))
        .unwrap_or_default();
    let mut builder = RuleBuilder::new(name);

    apply_direction(&mut builder, raw, "direction")?;
    apply_action(&mut builder, raw, "action");

    for application in string_list(raw, "application") {
        push_protocol(&mut builder, &application);
    }
    if let Some(protocol) = str_field(raw, "protocol") {
        push_protocol(&mut builder, &protocol);
    }

    builder.priority = i64_field(raw, "priority");
    builder.priority_order = PriorityOrder::LowerFirst;
    builder.source_ranges = string_list(raw, "source");
    builder.destination_ranges = string_list(raw, "destination");
    push_ports(&mut builder, service_ports(&string_list(raw, "service")));
    builder.source_tags = string_list(raw, "from_zone");
    builder.target_tags = string_list(raw, "to_zone");
    builder.logging_enabled = bool_field(raw, "log_end") || bool_field(raw, "log_start");

    push_unknown_fields(
        &mut builder,
        raw,
        &[
            "name",
            "rule_name",
            "direction",
            "action",
            "application",
            "protocol",
            "priority",
            "source",
            "destination",
            "service",
            "from_zone",
            "to_zone",
            "log_start",
            "log_end",
        ],
    );

    Ok(builder.finish(CloudProvider::PaloAlto))
}

/// Extract port numbers from PAN service names ("service-https" -> 443).
fn service_ports(services: &[String]) -> Vec<String> {
    services
        .iter()
        .filter_map(|service| match service.as_str() {
            "service-http" => Some("80".to_string()),
            "service-https" => Some("443".to_string()),
            "application-default" | "any" => None,
            other => other.strip_prefix("tcp-").or_else(|| other.strip_prefix("udp-")).map(str::to_string),
        })
        .collect()
}
