//! Semantic cache trait and types
//!
//! Approximate tier of the audit cache. Holds only human-approved
//! recommendations, matched by embedding similarity against new issue text.
//! Entries never expire; they leave only through an explicit clear.

use std::fmt::Debug;
use std::time::SystemTime;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// One approved fix, indexed by the embedding of the issue it resolves
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticCacheEntry {
    id: String,
    /// The issue description the approved fix was written for
    issue_text: String,
    embedding: Vec<f32>,
    /// The human-approved recommendation text
    approved_recommendation: String,
    /// Times this entry has been served as a lookup hit
    usage_count: u64,
    created_at: u64,
}

impl SemanticCacheEntry {
    pub fn new(
        id: impl Into<String>,
        issue_text: impl Into<String>,
        embedding: Vec<f32>,
        approved_recommendation: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            issue_text: issue_text.into(),
            embedding,
            approved_recommendation: approved_recommendation.into(),
            usage_count: 0,
            created_at: unix_now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn issue_text(&self) -> &str {
        &self.issue_text
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    pub fn approved_recommendation(&self) -> &str {
        &self.approved_recommendation
    }

    pub fn usage_count(&self) -> u64 {
        self.usage_count
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn increment_usage(&mut self) {
        self.usage_count += 1;
    }
}

/// Result of a semantic lookup: the winning entry and its similarity
#[derive(Debug, Clone)]
pub struct SemanticMatch {
    pub entry: SemanticCacheEntry,
    pub similarity: f32,
}

/// Statistics for the semantic cache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SemanticCacheStats {
    pub entries: usize,
    /// Sum of usage counts across all entries
    pub total_usage: u64,
    pub embedding_dimension: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Trait for the approved-recommendation similarity cache
#[async_trait]
pub trait SemanticCache: Send + Sync + Debug {
    /// Find the best entry at or above `min_score`. A hit increments that
    /// entry's usage count. Returns `DimensionMismatch` for a wrong-size
    /// query vector.
    async fn lookup(
        &self,
        embedding: &[f32],
        min_score: f32,
    ) -> Result<Option<SemanticMatch>, DomainError>;

    /// Insert an approved fix. The only write path; never fed from raw
    /// model output.
    async fn add(&self, entry: SemanticCacheEntry) -> Result<(), DomainError>;

    /// Drop every entry. Atomic with respect to concurrent lookups.
    async fn clear(&self) -> Result<(), DomainError>;

    async fn stats(&self) -> Result<SemanticCacheStats, DomainError>;

    /// Snapshot all entries, for persistence.
    async fn export_entries(&self) -> Result<Vec<SemanticCacheEntry>, DomainError>;

    /// Restore previously exported entries. Returns how many were admitted.
    async fn import_entries(&self, entries: Vec<SemanticCacheEntry>)
    -> Result<usize, DomainError>;
}
