//! Configuration types.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Directory name used for extracted text when no export root is configured.
pub const DEFAULT_EXPORT_DIR: &str = "Export";

/// Directory name used for relocated originals when no trash root is configured.
pub const DEFAULT_TRASH_DIR: &str = "Trash";

/// Configuration for the OCR extraction client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Model to request from the extraction service.
    #[serde(default = "default_model")]
    pub model: String,
    /// Base URL for the API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Environment variable name for the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Ask the service to embed images as base64 in the returned markdown.
    #[serde(default)]
    pub include_images: bool,
}

fn default_model() -> String {
    "mistral-ocr-latest".to_string()
}

fn default_base_url() -> String {
    "https://api.mistral.ai".to_string()
}

fn default_api_key_env() -> String {
    "MISTRAL_API_KEY".to_string()
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            include_images: false,
        }
    }
}

/// Configuration for the deposit watcher.
///
/// `export_root` and `trash_root` default to `Export` and `Trash`
/// subdirectories of the deposit root when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Directory under automatic observation.
    pub deposit_root: PathBuf,
    /// Directory receiving extracted text.
    #[serde(default)]
    pub export_root: Option<PathBuf>,
    /// Directory receiving relocated originals (custom trash mode only).
    #[serde(default)]
    pub trash_root: Option<PathBuf>,
    /// Hand originals to the platform trash instead of the trash root.
    #[serde(default)]
    pub use_system_trash: bool,
}

impl WatchConfig {
    /// Create a configuration watching `deposit_root` with default output
    /// directories.
    #[must_use]
    pub fn new(deposit_root: impl Into<PathBuf>) -> Self {
        Self {
            deposit_root: deposit_root.into(),
            export_root: None,
            trash_root: None,
            use_system_trash: false,
        }
    }

    /// Resolve the effective directory layout for one watch lifetime.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::OverlappingRoots` if the export and trash roots
    /// are equal or one is nested inside the other.
    pub fn resolve(&self) -> Result<WatchPaths, ConfigError> {
        let export_root = self
            .export_root
            .clone()
            .unwrap_or_else(|| self.deposit_root.join(DEFAULT_EXPORT_DIR));
        let trash_root = self
            .trash_root
            .clone()
            .unwrap_or_else(|| self.deposit_root.join(DEFAULT_TRASH_DIR));

        if export_root.starts_with(&trash_root) || trash_root.starts_with(&export_root) {
            return Err(ConfigError::OverlappingRoots {
                export: export_root,
                trash: trash_root,
            });
        }

        Ok(WatchPaths {
            deposit_root: self.deposit_root.clone(),
            export_root,
            trash_root,
            use_system_trash: self.use_system_trash,
        })
    }
}

/// Resolved directory layout consumed by the scanner and file pipeline.
///
/// Immutable for the lifetime of one armed watch; a configuration change
/// always produces a fresh snapshot via [`WatchConfig::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchPaths {
    /// Directory under automatic observation.
    pub deposit_root: PathBuf,
    /// Directory receiving extracted text.
    pub export_root: PathBuf,
    /// Directory receiving relocated originals.
    pub trash_root: PathBuf,
    /// Hand originals to the platform trash instead of the trash root.
    pub use_system_trash: bool,
}

impl WatchPaths {
    /// Final name component of the export root, used for traversal exclusion.
    #[must_use]
    pub fn export_name(&self) -> &OsStr {
        self.export_root
            .file_name()
            .unwrap_or_else(|| self.export_root.as_os_str())
    }

    /// Final name component of the trash root, used for traversal exclusion.
    #[must_use]
    pub fn trash_name(&self) -> &OsStr {
        self.trash_root
            .file_name()
            .unwrap_or_else(|| self.trash_root.as_os_str())
    }

    /// Compute `file`'s path relative to the deposit root.
    ///
    /// Returns `None` for paths outside the deposit tree.
    #[must_use]
    pub fn relative_from_deposit<'a>(&self, file: &'a Path) -> Option<&'a Path> {
        file.strip_prefix(&self.deposit_root).ok()
    }

    /// Create the export directory, and the trash directory when a custom
    /// trash is in use.
    ///
    /// Creation failures are logged and swallowed: a later scan may succeed
    /// once permissions or availability change.
    pub async fn ensure_directories(&self) {
        if let Err(e) = tokio::fs::create_dir_all(&self.export_root).await {
            tracing::warn!(
                path = %self.export_root.display(),
                error = %e,
                "Failed to create export directory"
            );
        }
        if !self.use_system_trash {
            if let Err(e) = tokio::fs::create_dir_all(&self.trash_root).await {
                tracing::warn!(
                    path = %self.trash_root.display(),
                    error = %e,
                    "Failed to create trash directory"
                );
            }
        }
    }
}
