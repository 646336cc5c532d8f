//! Error types for BKG

use thiserror::Error;

/// Result type alias for BKG operations
pub type Result<T> = std::result::Result<T, BkgError>;

/// Main error type for BKG
#[derive(Error, Debug)]
pub enum BkgError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown identifier prefix: {0}")]
    UnknownPrefix(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
