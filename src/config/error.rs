//! Configuration error types.

use std::path::PathBuf;

/// Errors that can occur while loading or resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Export and trash roots must be distinct and non-nested, otherwise the
    /// watcher would scan or overwrite its own output.
    #[error("Export root {export} and trash root {trash} overlap")]
    OverlappingRoots { export: PathBuf, trash: PathBuf },
}
