//! Rule analyzer capability
//!
//! The generative-model call behind the audit path. Implementations are
//! injected so the orchestrator and its caches never depend on a concrete
//! vendor API.

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::domain::audit::{Recommendation, Violation};
use crate::domain::rule::NormalizedRuleSet;

/// Raw output of one model analysis, before cache-sourced substitutions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub violations: Vec<Violation>,
    pub recommendations: Vec<Recommendation>,
    pub confidence_score: f32,
}

/// Analyzes a normalized rule set against an audit intent.
///
/// Treated as slow and expensive; the audit service only invokes it on a
/// context-cache miss.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RuleAnalyzer: Send + Sync + Debug {
    async fn analyze(
        &self,
        rule_set: &NormalizedRuleSet,
        intent: &str,
    ) -> Result<AnalysisOutcome, DomainError>;

    /// Identifier of the underlying model, part of the cache fingerprint
    fn model_id(&self) -> &str;
}
