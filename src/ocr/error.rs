//! OCR error types.

use std::path::PathBuf;

/// Errors from extraction client operations.
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("API key not configured (env: {0})")]
    MissingApiKey(String),

    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Non-success status, carrying the server-provided message when available.
    #[error("API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Extraction request timed out")]
    Timeout,
}

/// Errors from format normalization.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// No viable document or image representation for this file.
    #[error("Unsupported format: {path}")]
    Unsupported { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_display() {
        let err = OcrError::MissingApiKey("MISTRAL_API_KEY".to_string());
        assert_eq!(
            err.to_string(),
            "API key not configured (env: MISTRAL_API_KEY)"
        );
    }

    #[test]
    fn test_api_error_display() {
        let err = OcrError::Api {
            status: 422,
            message: "document too large".to_string(),
        };
        assert_eq!(err.to_string(), "API returned HTTP 422: document too large");
    }

    #[test]
    fn test_unsupported_format_display() {
        let err = FormatError::Unsupported {
            path: PathBuf::from("/deposit/archive.zip"),
        };
        assert_eq!(err.to_string(), "Unsupported format: /deposit/archive.zip");
    }
}
