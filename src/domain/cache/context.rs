//! Context cache trait and types
//!
//! Exact-match tier of the audit cache: fingerprint in, complete stored
//! audit result out. Anything short of an exact fingerprint match is a miss.

use std::fmt::Debug;
use std::time::SystemTime;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::domain::audit::AuditResult;

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// A stored audit result keyed by its request fingerprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextCacheEntry {
    /// Request fingerprint (SHA-256 hex)
    key: String,
    /// The complete audit result as produced on the miss path
    result: AuditResult,
    /// Serialized size of `result`, counted against the byte ceiling
    size_bytes: usize,
    created_at: u64,
    last_accessed_at: u64,
}

impl ContextCacheEntry {
    /// Create an entry, measuring the result's serialized size.
    pub fn new(key: impl Into<String>, result: AuditResult) -> Result<Self, DomainError> {
        let size_bytes = serde_json::to_vec(&result)
            .map_err(|e| DomainError::internal(format!("Failed to serialize audit result: {}", e)))?
            .len();
        let now = unix_now();

        Ok(Self {
            key: key.into(),
            result,
            size_bytes,
            created_at: now,
            last_accessed_at: now,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn result(&self) -> &AuditResult {
        &self.result
    }

    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn last_accessed_at(&self) -> u64 {
        self.last_accessed_at
    }

    /// Check expiry against a TTL anchored at creation time.
    pub fn is_expired(&self, ttl_secs: u64) -> bool {
        unix_now() >= self.created_at + ttl_secs
    }

    /// Record an access.
    pub fn touch(&mut self) {
        self.last_accessed_at = unix_now();
    }

    pub fn into_result(self) -> AuditResult {
        self.result
    }
}

/// Statistics for the context cache
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextCacheStats {
    pub entries: usize,
    pub total_size_bytes: usize,
    /// Byte-ceiling utilization, observational only
    pub utilization_percent: f32,
    pub ttl_hours: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl ContextCacheStats {
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.misses;

        if total == 0 {
            return 0.0;
        }

        self.hits as f32 / total as f32
    }
}

/// Trait for the exact-match audit result cache
#[async_trait]
pub trait ContextCache: Send + Sync + Debug {
    /// Look up a fingerprint. Expired entries are removed and count as a
    /// miss. A hit refreshes the entry's access time.
    async fn get(&self, key: &str) -> Result<Option<AuditResult>, DomainError>;

    /// Store a result, evicting as needed to respect both ceilings.
    async fn put(&self, key: &str, result: AuditResult) -> Result<(), DomainError>;

    /// Drop every entry. Atomic with respect to concurrent lookups.
    async fn clear(&self) -> Result<(), DomainError>;

    async fn stats(&self) -> Result<ContextCacheStats, DomainError>;

    /// Snapshot all live entries, for persistence.
    async fn export_entries(&self) -> Result<Vec<ContextCacheEntry>, DomainError>;

    /// Restore previously exported entries, subject to the usual ceilings
    /// and TTL. Returns how many were admitted.
    async fn import_entries(&self, entries: Vec<ContextCacheEntry>) -> Result<usize, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> AuditResult {
        AuditResult {
            violations: vec![],
            recommendations: vec![],
            confidence_score: 0.8,
            execution_time_ms: 10,
            cached: false,
            total_rules_processed: 1,
            warnings: vec![],
        }
    }

    #[test]
    fn test_entry_measures_size() {
        let entry = ContextCacheEntry::new("abc", sample_result()).unwrap();

        assert_eq!(entry.key(), "abc");
        assert!(entry.size_bytes() > 0);
        assert_eq!(entry.created_at(), entry.last_accessed_at());
    }

    #[test]
    fn test_entry_expiry() {
        let entry = ContextCacheEntry::new("abc", sample_result()).unwrap();

        assert!(!entry.is_expired(3600));
        assert!(entry.is_expired(0));
    }

    #[test]
    fn test_stats_hit_rate() {
        let stats = ContextCacheStats {
            hits: 3,
            misses: 1,
            ..Default::default()
        };

        assert!((stats.hit_rate() - 0.75).abs() < f32::EPSILON);
        assert_eq!(ContextCacheStats::default().hit_rate(), 0.0);
    }
}
