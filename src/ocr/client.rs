//! HTTP client for the OCR extraction service.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Client;
use serde::Deserialize;

use crate::config::OcrConfig;

use super::error::OcrError;
use super::format::InputKind;

/// Connection timeout for HTTP requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall request timeout. Document payloads upload as base64, so this is
/// sized for multi-megabyte bodies, not chat-style round trips.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Build an HTTP client with proper timeout configuration.
fn build_http_client() -> Client {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .expect("Failed to build HTTP client")
}

/// One file's content ready for submission.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub content: Vec<u8>,
    pub kind: InputKind,
    pub mime: String,
}

/// Extracted text plus the page count the service reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub text: String,
    pub page_count: u32,
}

/// Trait for extraction backends.
///
/// The deposit pipeline only depends on this seam, so tests can substitute
/// slow or failing extractors without any network involvement.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Convert one file's bytes into extracted text and a page count.
    async fn extract(&self, request: ExtractionRequest) -> Result<ExtractionResult, OcrError>;
}

/// Client for the Mistral OCR endpoint.
#[derive(Debug, Clone)]
pub struct OcrClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    include_images: bool,
}

/// Successful response body: one markdown fragment per page.
#[derive(Debug, Deserialize)]
struct OcrResponse {
    #[serde(default)]
    pages: Vec<OcrPage>,
}

#[derive(Debug, Deserialize)]
struct OcrPage {
    #[serde(default)]
    markdown: String,
}

/// Error response body; the service reports a `message` field on failure.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

impl OcrClient {
    /// Create a new client.
    #[must_use]
    pub fn new(base_url: String, api_key: String, model: String, include_images: bool) -> Self {
        Self {
            client: build_http_client(),
            base_url,
            api_key,
            model,
            include_images,
        }
    }

    /// Create a client from configuration, reading the API key from the
    /// configured environment variable.
    ///
    /// # Errors
    ///
    /// Returns `OcrError::MissingApiKey` if the environment variable is not
    /// set or is empty.
    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| OcrError::MissingApiKey(config.api_key_env.clone()))?;

        Ok(Self::new(
            config.base_url.clone(),
            api_key,
            config.model.clone(),
            config.include_images,
        ))
    }

    /// Get the configured model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextExtractor for OcrClient {
    async fn extract(&self, request: ExtractionRequest) -> Result<ExtractionResult, OcrError> {
        let url = format!("{}/v1/ocr", self.base_url.trim_end_matches('/'));
        let payload = data_url(&request.mime, &request.content);

        let document = match request.kind {
            InputKind::Document => serde_json::json!({
                "type": "document_url",
                "document_url": payload,
            }),
            InputKind::Image => serde_json::json!({
                "type": "image_url",
                "image_url": payload,
            }),
        };

        let body = serde_json::json!({
            "model": self.model,
            "document": document,
            "include_image_base64": self.include_images,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OcrError::Timeout
                } else {
                    OcrError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or(text);
            return Err(OcrError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: OcrResponse = response
            .json()
            .await
            .map_err(|e| OcrError::ParseError(e.to_string()))?;

        Ok(assemble(parsed))
    }
}

/// Encode raw bytes as an RFC 2397 data URL.
fn data_url(mime: &str, content: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(content))
}

/// Join per-page markdown into one document, blank line between pages.
fn assemble(response: OcrResponse) -> ExtractionResult {
    let page_count = u32::try_from(response.pages.len()).unwrap_or(u32::MAX);
    let text = response
        .pages
        .iter()
        .map(|p| p.markdown.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");
    ExtractionResult { text, page_count }
}
