pub mod analyzer;
pub mod context_cache;
pub mod embedding;
pub mod http_client;
pub mod logging;
pub mod normalization;
pub mod persistence;
pub mod semantic_cache;
pub mod services;
