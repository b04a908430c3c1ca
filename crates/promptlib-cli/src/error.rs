use std::io;

use promptlib_core::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] promptlib_core::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Prompt name cannot be empty")]
    EmptyName,
    #[error("No prompt text provided")]
    EmptyText,
    #[error("Prompt ID cannot be empty")]
    EmptyPromptId,
    #[error("Search query cannot be empty")]
    EmptySearchQuery,
    #[error("Prompt not found for id/prefix: {0}")]
    PromptNotFound(String),
    #[error("{0}")]
    AmbiguousPromptId(String),
    #[error("Editor command failed: {0}")]
    EditorFailed(String),
    #[error("Sync is not configured. Set PROMPTLIB_API_URL to enable the remote record API.")]
    SyncNotConfigured,
    #[error("Sync failed: {0}")]
    SyncFailed(String),
}
