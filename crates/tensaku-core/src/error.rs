//! Error types for the explanation engine.

use thiserror::Error;

/// Result type alias for tensaku operations.
pub type Result<T> = std::result::Result<T, TensakuError>;

/// Errors that can occur while producing an explanation list.
#[derive(Debug, Error)]
pub enum TensakuError {
    /// Error from the chat backend.
    #[error("Backend error: {0}")]
    Backend(String),

    /// HTTP/network error.
    #[error("Network error: {0}")]
    Network(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Model output failed validation against the required format.
    #[error("Invalid model output: {0}")]
    InvalidOutput(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for TensakuError {
    fn from(e: reqwest::Error) -> Self {
        TensakuError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for TensakuError {
    fn from(e: serde_json::Error) -> Self {
        TensakuError::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for TensakuError {
    fn from(e: std::io::Error) -> Self {
        TensakuError::Internal(e.to_string())
    }
}
