//! Error types for the shabda crates.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type shared by every shabda crate.
#[derive(Error, Debug)]
pub enum ShabdaError {
    /// Caller passed something that violates an input contract,
    /// e.g. a multi-character string where one character is required.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Persisted model file does not exist
    #[error("Model not found: {}", .path.display())]
    ModelNotFound { path: PathBuf },

    /// Persisted model is present but structurally malformed
    #[error("Model corrupt: {0}")]
    ModelCorrupt(String),

    /// A final encoded symbol has no id and no unknown-token convention is configured
    #[error("Unknown symbol: {0}")]
    SymbolUnknown(String),

    /// Error during training
    #[error("Training error: {0}")]
    Training(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error with file context
    #[error("I/O error for {}: {}", .path.display(), .err)]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for shabda operations.
pub type Result<T> = std::result::Result<T, ShabdaError>;
