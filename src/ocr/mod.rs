//! OCR extraction client and format normalization.

mod client;
mod error;
mod format;

pub use client::{ExtractionRequest, ExtractionResult, OcrClient, TextExtractor};
pub use error::{FormatError, OcrError};
pub use format::{normalize, InputKind, NormalizedInput};
