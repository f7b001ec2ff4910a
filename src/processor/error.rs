//! Pipeline error types.

use std::path::PathBuf;

use crate::ocr::{FormatError, OcrError};

/// Failures that abort one file's pipeline.
///
/// Only the head of the pipeline (normalize, read, extract) aborts; the
/// stages after a successful extraction (writing output, relocating the
/// original, aliasing, recording history) are best-effort and logged
/// instead of propagated.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// The file has no submittable representation.
    #[error(transparent)]
    Normalization(#[from] FormatError),

    /// The file's bytes could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The extraction service call failed. The file is not retried and
    /// stays marked as dispatched until the watcher is reconfigured.
    #[error(transparent)]
    Extraction(#[from] OcrError),
}
