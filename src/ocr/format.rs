//! Format normalization for extraction requests.
//!
//! Decides whether a file is submitted as a document or an image and with
//! which MIME type. Files with no viable representation are rejected here,
//! before any network traffic.

use std::path::{Path, PathBuf};

use super::error::FormatError;

/// How a file is presented to the extraction service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Submitted as a `document_url` payload.
    Document,
    /// Submitted as an `image_url` payload.
    Image,
}

/// A file classified into a request-ready form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedInput {
    pub kind: InputKind,
    pub mime: &'static str,
    pub path: PathBuf,
}

/// Classify `path` by extension into a document or image submission.
///
/// # Errors
///
/// Returns `FormatError::Unsupported` when the extension is missing or maps
/// to neither a document nor an image format the service accepts.
pub fn normalize(path: &Path) -> Result<NormalizedInput, FormatError> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .ok_or_else(|| FormatError::Unsupported {
            path: path.to_path_buf(),
        })?;

    let (kind, mime) = match extension.as_str() {
        "pdf" => (InputKind::Document, "application/pdf"),
        "docx" => (
            InputKind::Document,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ),
        "pptx" => (
            InputKind::Document,
            "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        ),
        "png" => (InputKind::Image, "image/png"),
        "jpg" | "jpeg" => (InputKind::Image, "image/jpeg"),
        "avif" => (InputKind::Image, "image/avif"),
        "webp" => (InputKind::Image, "image/webp"),
        "gif" => (InputKind::Image, "image/gif"),
        "bmp" => (InputKind::Image, "image/bmp"),
        "tif" | "tiff" => (InputKind::Image, "image/tiff"),
        _ => {
            return Err(FormatError::Unsupported {
                path: path.to_path_buf(),
            })
        }
    };

    Ok(NormalizedInput {
        kind,
        mime,
        path: path.to_path_buf(),
    })
}
