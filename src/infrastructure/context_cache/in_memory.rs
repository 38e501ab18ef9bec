//! In-memory context cache implementation

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::DomainError;
use crate::domain::audit::AuditResult;
use crate::domain::cache::{ContextCache, ContextCacheEntry, ContextCacheStats};

/// An entry plus its position in the access order.
///
/// The sequence number orders evictions exactly even when two accesses land
/// in the same wall-clock second; `last_accessed_at` on the entry itself is
/// observational.
#[derive(Debug)]
struct StoredEntry {
    entry: ContextCacheEntry,
    access_seq: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, StoredEntry>,
    total_bytes: usize,
}

/// In-memory exact-match cache with dual ceilings and LRU eviction
#[derive(Debug)]
pub struct InMemoryContextCache {
    state: RwLock<CacheState>,
    max_entries: usize,
    max_total_bytes: usize,
    ttl_secs: u64,
    access_counter: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl InMemoryContextCache {
    pub fn new(max_entries: usize, max_total_bytes: usize, ttl_hours: u64) -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            max_entries,
            max_total_bytes,
            ttl_secs: ttl_hours * 3600,
            access_counter: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    fn next_seq(&self) -> u64 {
        self.access_counter.fetch_add(1, Ordering::Relaxed)
    }

    /// Evict least-recently-accessed entries until both ceilings admit an
    /// insertion of `incoming_bytes`.
    fn evict_for(&self, state: &mut CacheState, incoming_bytes: usize) {
        while !state.entries.is_empty()
            && (state.entries.len() >= self.max_entries
                || state.total_bytes + incoming_bytes > self.max_total_bytes)
        {
            let victim = state
                .entries
                .iter()
                .min_by_key(|(_, stored)| (stored.access_seq, stored.entry.created_at()))
                .map(|(key, _)| key.clone());

            if let Some(key) = victim {
                if let Some(stored) = state.entries.remove(&key) {
                    state.total_bytes -= stored.entry.size_bytes();
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                }
            } else {
                break;
            }
        }
    }

    fn admit(&self, state: &mut CacheState, entry: ContextCacheEntry) -> bool {
        if entry.size_bytes() > self.max_total_bytes {
            debug!(
                key = entry.key(),
                size_bytes = entry.size_bytes(),
                "Entry exceeds the cache size ceiling on its own, not admitted"
            );
            return false;
        }

        // Replacing a key frees its old footprint first
        if let Some(previous) = state.entries.remove(entry.key()) {
            state.total_bytes -= previous.entry.size_bytes();
        }

        self.evict_for(state, entry.size_bytes());

        state.total_bytes += entry.size_bytes();
        state.entries.insert(
            entry.key().to_string(),
            StoredEntry {
                entry,
                access_seq: self.next_seq(),
            },
        );

        true
    }

    fn write_state(&self) -> Result<std::sync::RwLockWriteGuard<'_, CacheState>, DomainError> {
        self.state
            .write()
            .map_err(|e| DomainError::cache_unavailable(format!("Failed to acquire write lock: {}", e)))
    }

    fn read_state(&self) -> Result<std::sync::RwLockReadGuard<'_, CacheState>, DomainError> {
        self.state
            .read()
            .map_err(|e| DomainError::cache_unavailable(format!("Failed to acquire read lock: {}", e)))
    }
}

#[async_trait]
impl ContextCache for InMemoryContextCache {
    async fn get(&self, key: &str) -> Result<Option<AuditResult>, DomainError> {
        let mut state = self.write_state()?;

        let expired = match state.entries.get(key) {
            Some(stored) => stored.entry.is_expired(self.ttl_secs),
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                return Ok(None);
            }
        };

        if expired {
            if let Some(stored) = state.entries.remove(key) {
                state.total_bytes -= stored.entry.size_bytes();
            }
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Ok(None);
        }

        let seq = self.next_seq();
        let stored = state
            .entries
            .get_mut(key)
            .ok_or_else(|| DomainError::internal("Entry vanished under write lock"))?;
        stored.access_seq = seq;
        stored.entry.touch();
        self.hits.fetch_add(1, Ordering::Relaxed);

        Ok(Some(stored.entry.result().clone()))
    }

    async fn put(&self, key: &str, result: AuditResult) -> Result<(), DomainError> {
        let entry = ContextCacheEntry::new(key, result)?;
        let mut state = self.write_state()?;

        self.admit(&mut state, entry);

        Ok(())
    }

    async fn clear(&self) -> Result<(), DomainError> {
        let mut state = self.write_state()?;

        state.entries.clear();
        state.total_bytes = 0;
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);

        Ok(())
    }

    async fn stats(&self) -> Result<ContextCacheStats, DomainError> {
        let state = self.read_state()?;

        let utilization_percent = if self.max_total_bytes == 0 {
            0.0
        } else {
            state.total_bytes as f32 / self.max_total_bytes as f32 * 100.0
        };

        Ok(ContextCacheStats {
            entries: state.entries.len(),
            total_size_bytes: state.total_bytes,
            utilization_percent,
            ttl_hours: self.ttl_secs / 3600,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        })
    }

    async fn export_entries(&self) -> Result<Vec<ContextCacheEntry>, DomainError> {
        let state = self.read_state()?;

        let mut entries: Vec<ContextCacheEntry> = state
            .entries
            .values()
            .filter(|stored| !stored.entry.is_expired(self.ttl_secs))
            .map(|stored| stored.entry.clone())
            .collect();

        // Stable order keeps snapshots diffable
        entries.sort_by(|a, b| a.key().cmp(b.key()));

        Ok(entries)
    }

    async fn import_entries(&self, entries: Vec<ContextCacheEntry>) -> Result<usize, DomainError> {
        let mut live: Vec<ContextCacheEntry> = entries
            .into_iter()
            .filter(|entry| !entry.is_expired(self.ttl_secs))
            .collect();

        // Restore in access order so LRU eviction survives a restart
        live.sort_by_key(|entry| (entry.last_accessed_at(), entry.created_at()));

        let mut state = self.write_state()?;
        let mut admitted = 0;

        for entry in live {
            if self.admit(&mut state, entry) {
                admitted += 1;
            }
        }

        Ok(admitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audit::AuditResult;

    fn result_with_warnings(warnings: Vec<String>) -> AuditResult {
        AuditResult {
            violations: vec![],
            recommendations: vec![],
            confidence_score: 0.9,
            execution_time_ms: 5,
            cached: false,
            total_rules_processed: 1,
            warnings,
        }
    }

    fn small_result() -> AuditResult {
        result_with_warnings(vec![])
    }

    #[tokio::test]
    async fn test_round_trip() {
        let cache = InMemoryContextCache::new(10, 1 << 20, 24);

        cache.put("key-1", small_result()).await.unwrap();
        let hit = cache.get("key-1").await.unwrap();

        assert_eq!(hit, Some(small_result()));

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert!(stats.total_size_bytes > 0);
    }

    #[tokio::test]
    async fn test_miss_is_counted() {
        let cache = InMemoryContextCache::new(10, 1 << 20, 24);

        assert!(cache.get("absent").await.unwrap().is_none());

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_entry_count_ceiling_evicts_lru() {
        let cache = InMemoryContextCache::new(3, 1 << 20, 24);

        cache.put("a", small_result()).await.unwrap();
        cache.put("b", small_result()).await.unwrap();
        cache.put("c", small_result()).await.unwrap();

        // Touch "a" so "b" becomes least recently accessed
        cache.get("a").await.unwrap();

        cache.put("d", small_result()).await.unwrap();

        assert!(cache.get("b").await.unwrap().is_none());
        assert!(cache.get("a").await.unwrap().is_some());
        assert!(cache.get("c").await.unwrap().is_some());
        assert!(cache.get("d").await.unwrap().is_some());

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.entries, 3);
        assert_eq!(stats.evictions, 1);
    }

    #[tokio::test]
    async fn test_byte_ceiling_evicts() {
        let entry_size = ContextCacheEntry::new("x", small_result())
            .unwrap()
            .size_bytes();
        // Room for exactly two small entries
        let cache = InMemoryContextCache::new(100, entry_size * 2, 24);

        cache.put("a", small_result()).await.unwrap();
        cache.put("b", small_result()).await.unwrap();
        cache.put("c", small_result()).await.unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.evictions, 1);
        assert!(stats.total_size_bytes <= entry_size * 2);
    }

    #[tokio::test]
    async fn test_oversized_entry_not_admitted() {
        let cache = InMemoryContextCache::new(10, 8, 24);

        cache.put("huge", small_result()).await.unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.evictions, 0);
    }

    #[tokio::test]
    async fn test_ttl_expiry_removes_on_get() {
        let cache = InMemoryContextCache::new(10, 1 << 20, 0);

        cache.put("key-1", small_result()).await.unwrap();

        assert!(cache.get("key-1").await.unwrap().is_none());

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_replacing_key_updates_size_accounting() {
        let cache = InMemoryContextCache::new(10, 1 << 20, 24);

        cache.put("key-1", small_result()).await.unwrap();
        cache
            .put("key-1", result_with_warnings(vec!["w".repeat(100)]))
            .await
            .unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.entries, 1);

        let exported = cache.export_entries().await.unwrap();
        assert_eq!(stats.total_size_bytes, exported[0].size_bytes());
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = InMemoryContextCache::new(10, 1 << 20, 24);

        cache.put("a", small_result()).await.unwrap();
        cache.get("a").await.unwrap();
        cache.clear().await.unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.entries, 0);
        assert_eq!(stats.total_size_bytes, 0);
        assert_eq!(stats.hits, 0);
    }

    #[tokio::test]
    async fn test_export_import_round_trip() {
        let cache = InMemoryContextCache::new(10, 1 << 20, 24);
        cache.put("a", small_result()).await.unwrap();
        cache.put("b", small_result()).await.unwrap();

        let exported = cache.export_entries().await.unwrap();
        assert_eq!(exported.len(), 2);

        let restored = InMemoryContextCache::new(10, 1 << 20, 24);
        let admitted = restored.import_entries(exported).await.unwrap();

        assert_eq!(admitted, 2);
        assert!(restored.get("a").await.unwrap().is_some());
        assert!(restored.get("b").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_import_respects_ceilings() {
        let cache = InMemoryContextCache::new(10, 1 << 20, 24);
        for key in ["a", "b", "c", "d"] {
            cache.put(key, small_result()).await.unwrap();
        }

        let exported = cache.export_entries().await.unwrap();

        let restored = InMemoryContextCache::new(2, 1 << 20, 24);
        let admitted = restored.import_entries(exported).await.unwrap();

        assert_eq!(admitted, 4);
        let stats = restored.stats().await.unwrap();
        assert_eq!(stats.entries, 2);
    }
}
