//! History entry types.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One durable record of a completed extraction.
///
/// Immutable once created; the store hands out clones, never references into
/// its own collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub display_title: String,
    /// Where the file sat in the deposit tree when it was discovered.
    pub source_path: PathBuf,
    /// Where the original lives after relocation. `None` when the platform
    /// trash consumed it or the move failed.
    pub relocated_path: Option<PathBuf>,
    pub output_kind: String,
    pub output_text: Option<String>,
    pub output_path: Option<PathBuf>,
    pub page_count: u32,
}

impl HistoryEntry {
    /// Create an entry for `source_path` with a fresh id and timestamp.
    #[must_use]
    pub fn new(source_path: PathBuf) -> Self {
        let display_title = source_path.file_name().map_or_else(
            || source_path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            display_title,
            source_path,
            relocated_path: None,
            output_kind: "markdown".to_string(),
            output_text: None,
            output_path: None,
            page_count: 0,
        }
    }

    /// Best-known location of the original file.
    ///
    /// Prefers the relocated path, which survives the original being moved
    /// out of the deposit tree.
    #[must_use]
    pub fn source_location(&self) -> &Path {
        self.relocated_path.as_deref().unwrap_or(&self.source_path)
    }
}

/// Change notification emitted after each committed store mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryEvent {
    Inserted(Uuid),
    Deleted(Uuid),
    Wiped,
}
