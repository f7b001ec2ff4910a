//! History store error types.

use std::path::PathBuf;

/// Errors that can occur while opening or persisting the history store.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write history to {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),
}
