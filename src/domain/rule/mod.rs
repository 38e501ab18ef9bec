pub mod entity;

pub use entity::{
    CanonicalRule, CloudProvider, NormalizedRuleSet, PriorityOrder, RuleAction, RuleDirection,
    SCHEMA_VERSION,
};
