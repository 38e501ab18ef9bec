//! Firewall Audit API
//!
//! Normalizes provider-native firewall rules into a canonical model and runs
//! model-backed compliance audits behind two cache tiers:
//! - a context cache keyed by an exact fingerprint of the audit inputs
//! - a semantic cache of human-approved remediations matched by embedding
//!   similarity

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::AppState;
use domain::cache::{ContextCache, SemanticCache};
use infrastructure::analyzer::OpenAiRuleAnalyzer;
use infrastructure::context_cache::InMemoryContextCache;
use infrastructure::embedding::OpenAiEmbeddingProvider;
use infrastructure::http_client::HttpClient;
use infrastructure::semantic_cache::InMemorySemanticCache;
use infrastructure::services::AuditService;

/// Wired application plus handles the server lifecycle needs directly,
/// such as the cache tiers for snapshot load and save.
pub struct AppComponents {
    pub state: AppState,
    pub context_cache: Arc<dyn ContextCache>,
    pub semantic_cache: Arc<dyn SemanticCache>,
}

/// Create the application state with default configuration
pub fn create_app_state() -> anyhow::Result<AppState> {
    Ok(build_app(&AppConfig::default())?.state)
}

/// Wire all services from configuration
pub fn build_app(config: &AppConfig) -> anyhow::Result<AppComponents> {
    let http_client = HttpClient::with_timeout(Duration::from_secs(config.openai.timeout_secs))?;

    let context_cache: Arc<dyn ContextCache> = Arc::new(InMemoryContextCache::new(
        config.cache.max_entries,
        config.cache.max_total_bytes,
        config.cache.ttl_hours,
    ));

    let semantic_cache: Arc<dyn SemanticCache> = Arc::new(InMemorySemanticCache::new(
        config.embedding.dimensions,
        config.semantic.max_entries,
    ));

    let embedding_provider = match &config.openai.base_url {
        Some(base_url) => OpenAiEmbeddingProvider::with_base_url(
            http_client.clone(),
            &config.openai.api_key,
            &config.embedding.model,
            config.embedding.dimensions,
            base_url,
        ),
        None => OpenAiEmbeddingProvider::new(
            http_client.clone(),
            &config.openai.api_key,
            &config.embedding.model,
            config.embedding.dimensions,
        ),
    };

    let analyzer = match &config.openai.base_url {
        Some(base_url) => OpenAiRuleAnalyzer::with_base_url(
            http_client,
            &config.openai.api_key,
            &config.analyzer.model,
            base_url,
        ),
        None => OpenAiRuleAnalyzer::new(http_client, &config.openai.api_key, &config.analyzer.model),
    };

    let audit_service = Arc::new(AuditService::new(
        context_cache.clone(),
        semantic_cache.clone(),
        Arc::new(embedding_provider),
        Arc::new(analyzer),
        config.semantic.similarity_threshold,
    ));

    Ok(AppComponents {
        state: AppState::new(audit_service),
        context_cache,
        semantic_cache,
    })
}
