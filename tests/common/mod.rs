//! Shared fixtures for integration tests.

// Not every test binary uses every fixture.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use deposit_ocr::ocr::{ExtractionRequest, ExtractionResult, OcrError, TextExtractor};

/// Extractor whose behavior is scripted by the submitted file's content.
///
/// - `sleep:<ms>` stalls the call before succeeding, for overlap tests.
/// - `fail` returns an API error, for partial-failure tests.
/// - anything else succeeds immediately.
///
/// Every call is counted, including failing ones.
#[derive(Default)]
pub struct MockExtractor {
    calls: AtomicUsize,
}

impl MockExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextExtractor for MockExtractor {
    async fn extract(&self, request: ExtractionRequest) -> Result<ExtractionResult, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let directive = String::from_utf8_lossy(&request.content).to_string();
        if let Some(ms) = directive.strip_prefix("sleep:") {
            let ms: u64 = ms.trim().parse().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(ms)).await;
        } else if directive.starts_with("fail") {
            return Err(OcrError::Api {
                status: 500,
                message: "injected failure".to_string(),
            });
        }

        Ok(ExtractionResult {
            text: format!("extracted: {directive}"),
            page_count: 1,
        })
    }
}

/// Poll `condition` until it holds or `timeout` elapses.
pub async fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
