//! Error types for promptlib-core

use thiserror::Error;

use crate::config::ConfigError;
use crate::remote::RemoteError;

/// Result type alias using promptlib-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in promptlib-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Prompt not found
    #[error("Prompt not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Remote record API error
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),
}
