//! Audit domain: results, the analyzer capability, and fingerprinting

mod analyzer;
mod entity;
mod fingerprint;

pub use analyzer::{AnalysisOutcome, RuleAnalyzer};
#[cfg(test)]
pub use analyzer::MockRuleAnalyzer;
pub use entity::{
    AuditResult, Recommendation, RecommendationSource, Violation, ViolationSeverity,
};
pub use fingerprint::fingerprint;
