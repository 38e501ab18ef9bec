mod app_config;

pub use app_config::{
    AnalyzerConfig, AppConfig, CacheConfig, EmbeddingConfig, LogFormat, LoggingConfig,
    OpenAiConfig, SemanticConfig, ServerConfig,
};
