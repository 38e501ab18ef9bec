use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    /// A single rule failed to normalize; recoverable, reported per rule.
    #[error("Normalization error for rule '{rule}': {message}")]
    Normalization { rule: String, message: String },

    /// The provider tag on a batch is not one we know how to normalize.
    #[error("Unsupported provider: {provider}")]
    ProviderUnsupported { provider: String },

    /// The generative-model call failed; never cached, always surfaced.
    #[error("Model call failed: {message}")]
    ModelCall { message: String },

    /// A cache backend failed; callers degrade to the uncached path.
    #[error("Cache unavailable: {message}")]
    CacheUnavailable { message: String },

    /// An embedding vector did not match the configured dimension.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn normalization(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Normalization {
            rule: rule.into(),
            message: message.into(),
        }
    }

    pub fn provider_unsupported(provider: impl Into<String>) -> Self {
        Self::ProviderUnsupported {
            provider: provider.into(),
        }
    }

    pub fn model_call(message: impl Into<String>) -> Self {
        Self::ModelCall {
            message: message.into(),
        }
    }

    pub fn cache_unavailable(message: impl Into<String>) -> Self {
        Self::CacheUnavailable {
            message: message.into(),
        }
    }

    pub fn dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch { expected, actual }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// True for errors the audit path may absorb by bypassing caching.
    pub fn is_cache_degradable(&self) -> bool {
        matches!(self, Self::CacheUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_error() {
        let error = DomainError::normalization("fw-1", "missing direction");
        assert_eq!(
            error.to_string(),
            "Normalization error for rule 'fw-1': missing direction"
        );
    }

    #[test]
    fn test_provider_unsupported_error() {
        let error = DomainError::provider_unsupported("oracle");
        assert_eq!(error.to_string(), "Unsupported provider: oracle");
    }

    #[test]
    fn test_dimension_mismatch_error() {
        let error = DomainError::dimension_mismatch(384, 128);
        assert_eq!(
            error.to_string(),
            "Embedding dimension mismatch: expected 384, got 128"
        );
    }

    #[test]
    fn test_cache_errors_are_degradable() {
        assert!(DomainError::cache_unavailable("down").is_cache_degradable());
        assert!(!DomainError::model_call("timeout").is_cache_degradable());
    }
}
