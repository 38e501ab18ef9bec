//! Audit orchestration service
//!
//! Composes normalization, fingerprinting, both cache tiers and the injected
//! analyzer. This service is the only writer to either cache. Cache failures
//! degrade to the uncached path; model failures propagate and are never
//! cached.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::DomainError;
use crate::domain::audit::{AuditResult, Recommendation, RuleAnalyzer, fingerprint};
use crate::domain::cache::{
    ContextCache, ContextCacheStats, SemanticCache, SemanticCacheEntry, SemanticCacheStats,
};
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::rule::CloudProvider;
use crate::infrastructure::normalization::{NormalizationEngine, NormalizationOutput};

/// Combined statistics of both cache tiers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStatsSnapshot {
    pub context_cache: ContextCacheStats,
    pub semantic_cache: SemanticCacheStats,
}

/// Service surface consumed by the API layer
#[async_trait]
pub trait AuditServiceTrait: Send + Sync + Debug {
    /// Full audit path: normalize, fingerprint, cache, analyze.
    async fn audit(
        &self,
        raw_rules: &[Value],
        provider: CloudProvider,
        intent: &str,
    ) -> Result<AuditResult, DomainError>;

    /// Normalization without an audit, for rule import/preview.
    async fn normalize_rules(
        &self,
        raw_rules: &[Value],
        provider: CloudProvider,
    ) -> Result<NormalizationOutput, DomainError>;

    async fn cache_stats(&self) -> Result<CacheStatsSnapshot, DomainError>;

    /// Administrative reset of both cache tiers.
    async fn clear_cache(&self) -> Result<(), DomainError>;

    /// Record a human-approved fix. The only semantic-cache write path.
    /// Returns the new entry's id.
    async fn submit_feedback(
        &self,
        issue_text: &str,
        approved_fix: &str,
    ) -> Result<String, DomainError>;
}

#[derive(Debug)]
pub struct AuditService {
    engine: NormalizationEngine,
    context_cache: Arc<dyn ContextCache>,
    semantic_cache: Arc<dyn SemanticCache>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    analyzer: Arc<dyn RuleAnalyzer>,
    /// Minimum cosine similarity for a semantic-cache substitution
    similarity_threshold: f32,
}

impl AuditService {
    pub fn new(
        context_cache: Arc<dyn ContextCache>,
        semantic_cache: Arc<dyn SemanticCache>,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        analyzer: Arc<dyn RuleAnalyzer>,
        similarity_threshold: f32,
    ) -> Self {
        Self {
            engine: NormalizationEngine::new(),
            context_cache,
            semantic_cache,
            embedding_provider,
            analyzer,
            similarity_threshold,
        }
    }

    /// Context lookup that degrades to a miss when the cache backend fails.
    async fn context_get(&self, key: &str) -> Option<AuditResult> {
        match self.context_cache.get(key).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!("Context cache lookup failed, bypassing cache: {}", e);
                None
            }
        }
    }

    async fn context_put(&self, key: &str, result: &AuditResult) {
        if let Err(e) = self.context_cache.put(key, result.clone()).await {
            warn!("Context cache store failed, result not cached: {}", e);
        }
    }

    /// Replace a fresh violation's recommendation with an approved one when
    /// the semantic cache knows a sufficiently similar issue. Failures here
    /// never fail the audit.
    async fn apply_approved_fixes(&self, result: &mut AuditResult) {
        for violation in &result.violations {
            let embedding = match self.embedding_provider.embed(&violation.description).await {
                Ok(embedding) => embedding,
                Err(e) => {
                    warn!(
                        rule_id = %violation.rule_id,
                        "Embedding failed, keeping model recommendation: {}", e
                    );
                    continue;
                }
            };

            let matched = match self
                .semantic_cache
                .lookup(&embedding, self.similarity_threshold)
                .await
            {
                Ok(matched) => matched,
                Err(e) => {
                    warn!("Semantic cache lookup failed, keeping model recommendation: {}", e);
                    continue;
                }
            };

            if let Some(hit) = matched {
                debug!(
                    rule_id = %violation.rule_id,
                    similarity = hit.similarity,
                    "Substituting approved recommendation"
                );
                result
                    .recommendations
                    .retain(|r| r.rule_id.as_deref() != Some(violation.rule_id.as_str()));
                result.recommendations.push(Recommendation::from_semantic_cache(
                    Uuid::new_v4().to_string(),
                    Some(violation.rule_id.clone()),
                    "Approved remediation",
                    hit.entry.approved_recommendation(),
                    hit.similarity,
                ));
            }
        }
    }
}

#[async_trait]
impl AuditServiceTrait for AuditService {
    async fn audit(
        &self,
        raw_rules: &[Value],
        provider: CloudProvider,
        intent: &str,
    ) -> Result<AuditResult, DomainError> {
        let started = Instant::now();

        let normalization = self.engine.normalize(raw_rules, provider)?;
        let key = fingerprint(&normalization.rule_set, intent, self.analyzer.model_id())?;

        if let Some(mut result) = self.context_get(&key).await {
            result.cached = true;
            result.execution_time_ms = started.elapsed().as_millis() as u64;
            info!(provider = %provider, "Audit served from context cache");
            return Ok(result);
        }

        // Miss: one model call for the whole set. No cache lock is held here;
        // concurrent identical misses may both analyze and the last store
        // wins, which is acceptable for identical input.
        let outcome = self
            .analyzer
            .analyze(&normalization.rule_set, intent)
            .await?;

        let mut result = AuditResult {
            violations: outcome.violations,
            recommendations: outcome.recommendations,
            confidence_score: outcome.confidence_score,
            execution_time_ms: started.elapsed().as_millis() as u64,
            cached: false,
            total_rules_processed: normalization.rule_set.len(),
            warnings: normalization.warnings.clone(),
        };

        // Store the fresh result before any approved-fix substitution so a
        // later exact hit replays the model's own analysis
        self.context_put(&key, &result).await;

        self.apply_approved_fixes(&mut result).await;

        result.execution_time_ms = started.elapsed().as_millis() as u64;
        info!(
            provider = %provider,
            violations = result.violations.len(),
            "Audit completed"
        );

        Ok(result)
    }

    async fn normalize_rules(
        &self,
        raw_rules: &[Value],
        provider: CloudProvider,
    ) -> Result<NormalizationOutput, DomainError> {
        self.engine.normalize(raw_rules, provider)
    }

    async fn cache_stats(&self) -> Result<CacheStatsSnapshot, DomainError> {
        Ok(CacheStatsSnapshot {
            context_cache: self.context_cache.stats().await?,
            semantic_cache: self.semantic_cache.stats().await?,
        })
    }

    async fn clear_cache(&self) -> Result<(), DomainError> {
        // Attempt both clears even if the first fails
        let context = self.context_cache.clear().await;
        let semantic = self.semantic_cache.clear().await;

        context?;
        semantic?;

        info!("Both cache tiers cleared");
        Ok(())
    }

    async fn submit_feedback(
        &self,
        issue_text: &str,
        approved_fix: &str,
    ) -> Result<String, DomainError> {
        if issue_text.trim().is_empty() || approved_fix.trim().is_empty() {
            return Err(DomainError::validation(
                "Feedback requires both an issue description and an approved fix",
            ));
        }

        let embedding = self.embedding_provider.embed(issue_text).await?;

        let id = Uuid::new_v4().to_string();
        let entry = SemanticCacheEntry::new(id.clone(), issue_text, embedding, approved_fix);
        self.semantic_cache.add(entry).await?;

        info!(id = %id, "Approved fix recorded in semantic cache");
        Ok(id)
    }
}
