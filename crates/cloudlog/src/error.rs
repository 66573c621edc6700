//! Logging error types.

use thiserror::Error;

/// Errors that can occur while building or installing loggers.
#[derive(Debug, Error)]
pub enum LogError {
    /// The configuration is invalid.
    #[error("invalid logging configuration: {0}")]
    Config(String),

    /// A collector could not be installed.
    #[error("failed to install collector: {0}")]
    Init(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for logging operations.
pub type Result<T> = std::result::Result<T, LogError>;
