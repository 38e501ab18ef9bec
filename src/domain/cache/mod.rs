//! Audit cache domain traits
//!
//! Two tiers: an exact-match context cache keyed by request fingerprint,
//! and a similarity-matched semantic cache of human-approved fixes.

mod context;
mod semantic;

pub use context::{ContextCache, ContextCacheEntry, ContextCacheStats};
pub use semantic::{SemanticCache, SemanticCacheEntry, SemanticCacheStats, SemanticMatch};
