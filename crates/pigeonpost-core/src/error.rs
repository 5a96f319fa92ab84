//! Error types shared across PigeonPost crates.

use thiserror::Error;

/// Errors raised during setup and configuration.
#[derive(Debug, Error)]
pub enum PigeonError {
    /// Configuration file could not be read or parsed.
    #[error("Config error: {0}")]
    Config(String),

    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, PigeonError>;
