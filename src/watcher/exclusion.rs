//! Traversal exclusion for the watcher's own output directories.

use std::ffi::{OsStr, OsString};

use crate::config::WatchPaths;

/// Decides whether a directory name belongs to the watcher's output areas.
///
/// Matches the final name component only, so the export and trash
/// directories are pruned wherever they appear in the deposit tree. Pure
/// membership test, no filesystem access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionRule {
    export_name: OsString,
    trash_name: OsString,
}

impl ExclusionRule {
    /// Derive the rule from a resolved directory layout.
    #[must_use]
    pub fn from_paths(paths: &WatchPaths) -> Self {
        Self {
            export_name: paths.export_name().to_os_string(),
            trash_name: paths.trash_name().to_os_string(),
        }
    }

    /// True when `name` is the export or trash directory name.
    #[must_use]
    pub fn matches(&self, name: &OsStr) -> bool {
        name == self.export_name || name == self.trash_name
    }
}
