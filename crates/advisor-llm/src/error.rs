//! Error types for language model operations

use thiserror::Error;

/// Result type for language model operations
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors that can occur when calling a language model
#[derive(Error, Debug)]
pub enum LlmError {
    /// API request failed
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Transport-level failure (connection, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
