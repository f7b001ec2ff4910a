//! Per-file ingestion pipeline.
//!
//! Turns one discovered file into one history entry: extract text, write it
//! into the mirrored export tree, relocate the original out of the deposit
//! tree, leave a recovery alias, record the result. Every failure is
//! contained to the one file being processed.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::WatchPaths;
use crate::history::{HistoryEntry, HistoryStore};
use crate::ocr::{self, ExtractionRequest, TextExtractor};

use super::error::ProcessError;

/// Extension given to extracted text files.
const OUTPUT_EXTENSION: &str = "md";

/// Orchestrates the pipeline for one file at a time.
///
/// Invocations are independent of each other; the history store is the only
/// shared state and serializes its own mutations.
pub struct FileProcessor {
    extractor: Arc<dyn TextExtractor>,
    history: HistoryStore,
}

impl FileProcessor {
    /// Create a processor writing results through `history`.
    #[must_use]
    pub fn new(extractor: Arc<dyn TextExtractor>, history: HistoryStore) -> Self {
        Self { extractor, history }
    }

    /// Process `file`, containing every failure to this file's pipeline.
    ///
    /// Never propagates an error to the caller: the pipeline runs
    /// unattended, so failures surface only in the log and as the absence
    /// of an output file.
    pub async fn run(&self, file: PathBuf, paths: &WatchPaths) {
        if let Err(e) = self.process(&file, paths).await {
            tracing::error!(
                file = %file.display(),
                error = %e,
                "Deposit processing failed"
            );
        }
    }

    /// The fallible head of the pipeline. Everything after a successful
    /// extraction is best-effort and logged inline.
    async fn process(&self, file: &Path, paths: &WatchPaths) -> Result<(), ProcessError> {
        let normalized = ocr::normalize(file)?;
        let content =
            tokio::fs::read(&normalized.path)
                .await
                .map_err(|source| ProcessError::Read {
                    path: normalized.path.clone(),
                    source,
                })?;

        let result = self
            .extractor
            .extract(ExtractionRequest {
                content,
                kind: normalized.kind,
                mime: normalized.mime.to_string(),
            })
            .await?;

        // Mirror the file's position in the deposit tree under the output
        // roots. Files outside the deposit root (should not happen) land at
        // the top level.
        let relative_dir = paths
            .relative_from_deposit(file)
            .and_then(Path::parent)
            .map_or_else(PathBuf::new, Path::to_path_buf);

        let output_path = write_output(file, &relative_dir, paths, &result.text).await;
        let relocated = relocate_original(file, &relative_dir, paths).await;
        if let Some(moved) = &relocated {
            create_recovery_alias(file, &relative_dir, paths, moved).await;
        }

        let mut entry = HistoryEntry::new(file.to_path_buf());
        entry.relocated_path = relocated;
        entry.output_text = Some(result.text);
        entry.output_path = output_path;
        entry.page_count = result.page_count;

        if let Err(e) = self.history.insert(entry).await {
            tracing::error!(
                file = %file.display(),
                error = %e,
                "Failed to record history entry"
            );
        }
        Ok(())
    }
}

/// Write extracted text to `<export>/<relative_dir>/<stem>.md`.
///
/// Returns the written path, or `None` when the write failed.
async fn write_output(
    file: &Path,
    relative_dir: &Path,
    paths: &WatchPaths,
    text: &str,
) -> Option<PathBuf> {
    let dest_dir = paths.export_root.join(relative_dir);
    if let Err(e) = tokio::fs::create_dir_all(&dest_dir).await {
        tracing::error!(
            path = %dest_dir.display(),
            error = %e,
            "Failed to create export directory"
        );
    }

    let mut name = file
        .file_stem()
        .map_or_else(OsString::new, std::ffi::OsStr::to_os_string);
    name.push(".");
    name.push(OUTPUT_EXTENSION);
    let dest = dest_dir.join(name);

    match tokio::fs::write(&dest, text).await {
        Ok(()) => Some(dest),
        Err(e) => {
            tracing::error!(
                path = %dest.display(),
                error = %e,
                "Failed to write extracted text"
            );
            None
        }
    }
}

/// Move the original out of the deposit tree.
///
/// System trash hands the file to the platform facility, which reports no
/// destination; custom trash mirrors the relative directory under the trash
/// root and returns the new location. A failed move leaves the original in
/// place; it stays marked as dispatched and is not rescanned.
async fn relocate_original(
    file: &Path,
    relative_dir: &Path,
    paths: &WatchPaths,
) -> Option<PathBuf> {
    if paths.use_system_trash {
        let target = file.to_path_buf();
        match tokio::task::spawn_blocking(move || trash::delete(&target)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(
                file = %file.display(),
                error = %e,
                "Failed to move file to system trash"
            ),
            Err(e) => tracing::error!(
                file = %file.display(),
                error = %e,
                "System trash task failed"
            ),
        }
        return None;
    }

    let dest_dir = paths.trash_root.join(relative_dir);
    if let Err(e) = tokio::fs::create_dir_all(&dest_dir).await {
        tracing::error!(
            path = %dest_dir.display(),
            error = %e,
            "Failed to create trash directory"
        );
    }

    let Some(name) = file.file_name() else {
        return None;
    };
    let dest = dest_dir.join(name);
    match tokio::fs::rename(file, &dest).await {
        Ok(()) => Some(dest),
        Err(e) => {
            tracing::error!(
                file = %file.display(),
                error = %e,
                "Failed to move file to trash directory"
            );
            None
        }
    }
}

/// Leave a symlink beside the extracted text pointing at the relocated
/// original, so the text and a path back to its source sit side by side.
/// Advisory only; failure is logged and nothing depends on the link.
async fn create_recovery_alias(file: &Path, relative_dir: &Path, paths: &WatchPaths, moved: &Path) {
    let Some(name) = file.file_name() else {
        return;
    };
    let alias = paths.export_root.join(relative_dir).join(name);
    if let Err(e) = symlink(moved, &alias).await {
        tracing::warn!(
            alias = %alias.display(),
            target = %moved.display(),
            error = %e,
            "Failed to create recovery alias"
        );
    }
}

#[cfg(unix)]
async fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    tokio::fs::symlink(target, link).await
}

#[cfg(windows)]
async fn symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    tokio::fs::symlink_file(target, link).await
}
