//! Error types for collaborator clients
//!
//! Every adapter in this crate (cache store, ingredient backend, inference
//! engine) reports failures through [`ClientError`]. Callers decide whether a
//! failure is degradable or fatal; the adapters only classify.

use thiserror::Error;

/// Main error type for collaborator operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// Connection error - the collaborator could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// Operation timeout
    #[error("Operation timed out after {timeout_seconds}s: {context}")]
    Timeout {
        timeout_seconds: u64,
        context: String,
    },

    /// Non-success HTTP status from a collaborator
    #[error("Unexpected status {status}: {context}")]
    Status { status: u16, context: String },

    /// Response body did not match the expected schema
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Cache store command failure
    #[error("Cache error: {0}")]
    Cache(String),

    /// Inference engine reported an error in its payload
    #[error("Engine error: {0}")]
    Engine(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for collaborator operations
pub type Result<T> = std::result::Result<T, ClientError>;

impl ClientError {
    /// Whether the failure means the collaborator could not be reached at all
    /// (as opposed to answering with something unusable).
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            ClientError::Connection(_) | ClientError::Timeout { .. } | ClientError::Cache(_)
        ) || matches!(self, ClientError::Status { status, .. } if *status >= 500)
    }

    /// Build a client error from a reqwest failure, keeping timeouts distinct.
    pub(crate) fn from_http(
        err: reqwest::Error,
        timeout: std::time::Duration,
        context: &str,
    ) -> Self {
        if err.is_timeout() {
            ClientError::Timeout {
                timeout_seconds: timeout.as_secs(),
                context: context.to_string(),
            }
        } else if err.is_decode() {
            ClientError::InvalidResponse(format!("{}: {}", context, err))
        } else {
            ClientError::Connection(format!("{}: {}", context, err))
        }
    }
}
