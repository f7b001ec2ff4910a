//! One exclusion-aware traversal of the deposit tree.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::dedup::DedupTracker;
use super::exclusion::ExclusionRule;

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Walk `root` depth-first and return every regular file not yet dispatched.
///
/// Hidden entries are skipped, and any directory whose name matches `rule`
/// is pruned wholesale (the entire subtree, not just its direct files),
/// which keeps the watcher out of its own output. Each returned path is
/// marked in `tracker` before this function yields it, so overlapping scans
/// can never dispatch the same path twice. Unreadable entries are skipped
/// rather than aborting the traversal. No ordering is guaranteed across the
/// returned files.
pub fn scan(root: &Path, rule: &ExclusionRule, tracker: &mut DedupTracker) -> Vec<PathBuf> {
    let mut discovered = Vec::new();

    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        if entry.depth() == 0 {
            return true;
        }
        if is_hidden(entry) {
            return false;
        }
        !(entry.file_type().is_dir() && rule.matches(entry.file_name()))
    });

    for entry in walker {
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        if tracker.mark(&path) {
            discovered.push(path);
        }
    }

    discovered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WatchConfig;
    use tempfile::TempDir;

    fn rule_for(deposit: &Path) -> ExclusionRule {
        let paths = WatchConfig::new(deposit).resolve().unwrap();
        ExclusionRule::from_paths(&paths)
    }

    #[test]
    fn test_scan_finds_nested_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("top.pdf"), b"x").unwrap();
        std::fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
        std::fs::write(dir.path().join("sub/deeper/nested.pdf"), b"x").unwrap();

        let mut tracker = DedupTracker::new();
        let found = scan(dir.path(), &rule_for(dir.path()), &mut tracker);

        assert_eq!(found.len(), 2);
        assert!(found.iter().any(|p| p.ends_with("top.pdf")));
        assert!(found.iter().any(|p| p.ends_with("sub/deeper/nested.pdf")));
    }

    #[test]
    fn test_scan_never_returns_same_path_twice() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("doc.pdf"), b"x").unwrap();

        let rule = rule_for(dir.path());
        let mut tracker = DedupTracker::new();

        assert_eq!(scan(dir.path(), &rule, &mut tracker).len(), 1);
        assert!(scan(dir.path(), &rule, &mut tracker).is_empty());
    }

    #[test]
    fn test_scan_prunes_output_directories() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("doc.pdf"), b"x").unwrap();
        // Output areas nested inside the deposit tree, with content.
        std::fs::create_dir_all(dir.path().join("Export/sub")).unwrap();
        std::fs::write(dir.path().join("Export/sub/old.md"), b"x").unwrap();
        std::fs::create_dir_all(dir.path().join("Trash")).unwrap();
        std::fs::write(dir.path().join("Trash/moved.pdf"), b"x").unwrap();

        let mut tracker = DedupTracker::new();
        let found = scan(dir.path(), &rule_for(dir.path()), &mut tracker);

        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("doc.pdf"));
    }

    #[test]
    fn test_scan_prunes_excluded_names_anywhere_in_tree() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("invoices/Export")).unwrap();
        std::fs::write(dir.path().join("invoices/Export/inner.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("invoices/new.pdf"), b"x").unwrap();

        let mut tracker = DedupTracker::new();
        let found = scan(dir.path(), &rule_for(dir.path()), &mut tracker);

        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("invoices/new.pdf"));
    }

    #[test]
    fn test_scan_skips_hidden_entries() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(".DS_Store"), b"x").unwrap();
        std::fs::create_dir_all(dir.path().join(".staging")).unwrap();
        std::fs::write(dir.path().join(".staging/doc.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("visible.pdf"), b"x").unwrap();

        let mut tracker = DedupTracker::new();
        let found = scan(dir.path(), &rule_for(dir.path()), &mut tracker);

        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("visible.pdf"));
    }

    #[test]
    fn test_scan_missing_root_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("gone");
        let mut tracker = DedupTracker::new();
        assert!(scan(&missing, &rule_for(&missing), &mut tracker).is_empty());
    }
}
