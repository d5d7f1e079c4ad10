//! Error types for the chat service

use foodtrace_clients::ClientError;
use thiserror::Error;

use crate::orchestrator::Collaborator;

/// Request-level failure of the chat pipeline
#[derive(Error, Debug)]
pub enum ChatError {
    /// Request rejected before any collaborator was called
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The inference engine produced no answer
    #[error("LLM generation failed: {0}")]
    Inference(#[source] ClientError),

    /// Another collaborator failed under a fatal policy
    #[error("{collaborator} failed: {source}")]
    Collaborator {
        collaborator: Collaborator,
        #[source]
        source: ClientError,
    },
}

impl ChatError {
    /// Wrap a fatal collaborator failure
    pub fn from_collaborator(collaborator: Collaborator, source: ClientError) -> Self {
        match collaborator {
            Collaborator::Inference => ChatError::Inference(source),
            collaborator => ChatError::Collaborator {
                collaborator,
                source,
            },
        }
    }
}

/// Configuration could not be loaded
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_inference_error_keeps_source() {
        let err = ChatError::Inference(ClientError::Timeout {
            timeout_seconds: 120,
            context: "POST /api/chat".to_string(),
        });

        assert!(err.to_string().starts_with("LLM generation failed: "));
        assert!(err.to_string().contains("120s"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_from_collaborator() {
        let err = ChatError::from_collaborator(
            Collaborator::Inference,
            ClientError::Engine("out of memory".to_string()),
        );
        assert!(matches!(err, ChatError::Inference(ClientError::Engine(_))));

        let err = ChatError::from_collaborator(
            Collaborator::CacheStore,
            ClientError::Cache("broken pipe".to_string()),
        );
        assert_eq!(err.to_string(), "cache store failed: Cache error: broken pipe");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidValue {
            key: "PORT".to_string(),
            value: "http".to_string(),
        };
        assert_eq!(err.to_string(), "invalid value for PORT: 'http'");
    }
}
