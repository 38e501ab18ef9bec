//! In-memory semantic cache implementation
//!
//! Exact linear cosine scan over every stored entry. Correctness baseline;
//! an approximate index could replace the scan but must not change which
//! entries match above threshold.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::DomainError;
use crate::domain::cache::{SemanticCache, SemanticCacheEntry, SemanticCacheStats, SemanticMatch};
use crate::domain::embedding::cosine_similarity;

/// In-memory approved-recommendation cache using linear search
#[derive(Debug)]
pub struct InMemorySemanticCache {
    entries: RwLock<HashMap<String, SemanticCacheEntry>>,
    dimensions: usize,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl InMemorySemanticCache {
    pub fn new(dimensions: usize, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            dimensions,
            max_entries,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn check_dimension(&self, embedding: &[f32]) -> Result<(), DomainError> {
        if embedding.len() != self.dimensions {
            return Err(DomainError::dimension_mismatch(
                self.dimensions,
                embedding.len(),
            ));
        }
        Ok(())
    }

    /// Evict the least-validated entry when at capacity. Approved knowledge
    /// with the fewest confirmed uses goes first, oldest breaks ties.
    fn evict_if_needed(&self, entries: &mut HashMap<String, SemanticCacheEntry>) {
        if entries.len() < self.max_entries {
            return;
        }

        if let Some(victim) = entries
            .values()
            .min_by_key(|entry| (entry.usage_count(), entry.created_at()))
            .map(|entry| entry.id().to_string())
        {
            debug!(id = %victim, "Semantic cache at capacity, evicting least-used entry");
            entries.remove(&victim);
        }
    }

    fn write_entries(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<String, SemanticCacheEntry>>, DomainError>
    {
        self.entries.write().map_err(|e| {
            DomainError::cache_unavailable(format!("Failed to acquire write lock: {}", e))
        })
    }
}

#[async_trait]
impl SemanticCache for InMemorySemanticCache {
    async fn lookup(
        &self,
        embedding: &[f32],
        min_score: f32,
    ) -> Result<Option<SemanticMatch>, DomainError> {
        self.check_dimension(embedding)?;

        let mut entries = self.write_entries()?;

        let best = entries
            .values()
            .map(|entry| {
                let similarity = cosine_similarity(embedding, entry.embedding());
                (entry.id().to_string(), similarity)
            })
            .filter(|(_, similarity)| *similarity >= min_score)
            .max_by(|(a_id, a_sim), (b_id, b_sim)| {
                a_sim
                    .partial_cmp(b_sim)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| {
                        // Ties above threshold prefer the most-validated
                        // entry, then the most recent
                        let a = &entries[a_id];
                        let b = &entries[b_id];
                        a.usage_count()
                            .cmp(&b.usage_count())
                            .then_with(|| a.created_at().cmp(&b.created_at()))
                    })
            });

        match best {
            Some((id, similarity)) => {
                let entry = entries
                    .get_mut(&id)
                    .ok_or_else(|| DomainError::internal("Entry vanished under write lock"))?;
                entry.increment_usage();
                self.hits.fetch_add(1, Ordering::Relaxed);

                Ok(Some(SemanticMatch {
                    entry: entry.clone(),
                    similarity,
                }))
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
        }
    }

    async fn add(&self, entry: SemanticCacheEntry) -> Result<(), DomainError> {
        self.check_dimension(entry.embedding())?;

        let mut entries = self.write_entries()?;

        self.evict_if_needed(&mut entries);
        entries.insert(entry.id().to_string(), entry);

        Ok(())
    }

    async fn clear(&self) -> Result<(), DomainError> {
        let mut entries = self.write_entries()?;

        entries.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);

        Ok(())
    }

    async fn stats(&self) -> Result<SemanticCacheStats, DomainError> {
        let entries = self.entries.read().map_err(|e| {
            DomainError::cache_unavailable(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(SemanticCacheStats {
            entries: entries.len(),
            total_usage: entries.values().map(SemanticCacheEntry::usage_count).sum(),
            embedding_dimension: self.dimensions,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        })
    }

    async fn export_entries(&self) -> Result<Vec<SemanticCacheEntry>, DomainError> {
        let entries = self.entries.read().map_err(|e| {
            DomainError::cache_unavailable(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut exported: Vec<SemanticCacheEntry> = entries.values().cloned().collect();
        exported.sort_by(|a, b| a.id().cmp(b.id()));

        Ok(exported)
    }

    async fn import_entries(
        &self,
        entries: Vec<SemanticCacheEntry>,
    ) -> Result<usize, DomainError> {
        let mut store = self.write_entries()?;
        let mut admitted = 0;

        for entry in entries {
            if entry.embedding().len() != self.dimensions {
                debug!(
                    id = entry.id(),
                    "Skipping snapshot entry with mismatched embedding dimension"
                );
                continue;
            }
            self.evict_if_needed(&mut store);
            store.insert(entry.id().to_string(), entry);
            admitted += 1;
        }

        Ok(admitted)
    }
}
