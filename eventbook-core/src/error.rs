//! Error types for eventbook.

use thiserror::Error;

/// Errors that can occur in eventbook operations.
#[derive(Error, Debug)]
pub enum EventBookError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Could not convert media file '{name}': {reason}")]
    Conversion { name: String, reason: String },

    #[error("Invalid media payload: {0}")]
    Payload(String),

    #[error("Storage error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("Report generation failed: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for eventbook operations.
pub type EventBookResult<T> = Result<T, EventBookError>;
