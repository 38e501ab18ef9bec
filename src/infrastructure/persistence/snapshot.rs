//! Cache snapshot persistence
//!
//! Load-on-start/save-on-stop wrapper around both cache tiers. The caches
//! themselves are purely in-memory and never assume this exists.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::DomainError;
use crate::domain::cache::{ContextCache, ContextCacheEntry, SemanticCache, SemanticCacheEntry};

#[derive(Debug, Serialize, Deserialize)]
struct CacheSnapshot {
    #[serde(default)]
    context_entries: Vec<ContextCacheEntry>,
    #[serde(default)]
    semantic_entries: Vec<SemanticCacheEntry>,
}

/// JSON snapshot file for both cache tiers
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Restore both caches from the snapshot file. A missing file is a
    /// clean start, not an error. Returns (context, semantic) admit counts.
    pub async fn load(
        &self,
        context_cache: &dyn ContextCache,
        semantic_cache: &dyn SemanticCache,
    ) -> Result<(usize, usize), DomainError> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "No cache snapshot found, starting empty");
            return Ok((0, 0));
        }

        let data = std::fs::read_to_string(&self.path)
            .map_err(|e| DomainError::internal(format!("Failed to read snapshot: {}", e)))?;
        let snapshot: CacheSnapshot = serde_json::from_str(&data)
            .map_err(|e| DomainError::internal(format!("Malformed snapshot file: {}", e)))?;

        let context_count = context_cache
            .import_entries(snapshot.context_entries)
            .await?;
        let semantic_count = semantic_cache
            .import_entries(snapshot.semantic_entries)
            .await?;

        info!(
            context_entries = context_count,
            semantic_entries = semantic_count,
            "Restored cache snapshot"
        );

        Ok((context_count, semantic_count))
    }

    /// Write both caches to the snapshot file.
    pub async fn save(
        &self,
        context_cache: &dyn ContextCache,
        semantic_cache: &dyn SemanticCache,
    ) -> Result<(), DomainError> {
        let snapshot = CacheSnapshot {
            context_entries: context_cache.export_entries().await?,
            semantic_entries: semantic_cache.export_entries().await?,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!("Failed to create snapshot directory: {}", e);
        }

        let data = serde_json::to_string(&snapshot)
            .map_err(|e| DomainError::internal(format!("Failed to serialize snapshot: {}", e)))?;
        std::fs::write(&self.path, data)
            .map_err(|e| DomainError::internal(format!("Failed to write snapshot: {}", e)))?;

        info!(
            path = %self.path.display(),
            context_entries = snapshot.context_entries.len(),
            semantic_entries = snapshot.semantic_entries.len(),
            "Saved cache snapshot"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audit::AuditResult;
    use crate::domain::cache::SemanticCacheEntry;
    use crate::infrastructure::context_cache::InMemoryContextCache;
    use crate::infrastructure::semantic_cache::InMemorySemanticCache;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("fwaudit-snapshot-{}.json", Uuid::new_v4()))
    }

    fn sample_result() -> AuditResult {
        AuditResult {
            violations: vec![],
            recommendations: vec![],
            confidence_score: 0.9,
            execution_time_ms: 5,
            cached: false,
            total_rules_processed: 1,
            warnings: vec![],
        }
    }

    #[tokio::test]
    async fn test_load_missing_file_is_clean_start() {
        let store = SnapshotStore::new(temp_path());
        let context = InMemoryContextCache::new(10, 1 << 20, 24);
        let semantic = InMemorySemanticCache::new(2, 10);

        let (c, s) = store.load(&context, &semantic).await.unwrap();

        assert_eq!((c, s), (0, 0));
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let path = temp_path();
        let store = SnapshotStore::new(&path);

        let context = InMemoryContextCache::new(10, 1 << 20, 24);
        let semantic = InMemorySemanticCache::new(2, 10);
        context.put("key-1", sample_result()).await.unwrap();
        semantic
            .add(SemanticCacheEntry::new("e-1", "issue", vec![1.0, 0.0], "fix"))
            .await
            .unwrap();

        store.save(&context, &semantic).await.unwrap();

        let restored_context = InMemoryContextCache::new(10, 1 << 20, 24);
        let restored_semantic = InMemorySemanticCache::new(2, 10);
        let (c, s) = store
            .load(&restored_context, &restored_semantic)
            .await
            .unwrap();

        assert_eq!((c, s), (1, 1));
        assert!(restored_context.get("key-1").await.unwrap().is_some());

        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_malformed_snapshot_is_an_error() {
        let path = temp_path();
        std::fs::write(&path, "not json").unwrap();
        let store = SnapshotStore::new(&path);

        let context = InMemoryContextCache::new(10, 1 << 20, 24);
        let semantic = InMemorySemanticCache::new(2, 10);

        assert!(store.load(&context, &semantic).await.is_err());

        std::fs::remove_file(path).ok();
    }
}
