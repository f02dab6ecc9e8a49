use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
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

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error is the recoverable "not found" condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("no embedding for 'hello'");
        assert_eq!(error.to_string(), "Not found: no embedding for 'hello'");
        assert!(error.is_not_found());
    }

    #[test]
    fn test_provider_error() {
        let error = DomainError::provider("openai", "rate limit exceeded");
        assert_eq!(
            error.to_string(),
            "Provider error: openai - rate limit exceeded"
        );
        assert!(!error.is_not_found());
    }

    #[test]
    fn test_unsupported_error() {
        let error = DomainError::unsupported("backend lacks strategy search");
        assert_eq!(
            error.to_string(),
            "Unsupported operation: backend lacks strategy search"
        );
    }
}
