//! Deposit watcher: poll scheduler and per-file task fan-out.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::config::{ConfigError, WatchConfig, WatchPaths};
use crate::history::HistoryStore;
use crate::ocr::TextExtractor;
use crate::processor::FileProcessor;

use super::dedup::DedupTracker;
use super::exclusion::ExclusionRule;
use super::scan;

/// Fixed period between deposit scans.
pub const SCAN_PERIOD: Duration = Duration::from_secs(5);

/// Handle to one armed poll loop.
#[derive(Debug)]
struct ActiveWatch {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Top-level scheduler for automatic ingestion.
///
/// Owns the lifecycle of the poll loop: either disabled, or armed over one
/// resolved configuration snapshot. The dedup tracker lives inside the
/// armed loop task and dies with it, so every reconfiguration starts from a
/// clean slate.
pub struct DepositWatcher {
    extractor: Arc<dyn TextExtractor>,
    history: HistoryStore,
    period: Duration,
    active: Option<ActiveWatch>,
}

impl DepositWatcher {
    /// Create a disabled watcher with the standard scan period.
    #[must_use]
    pub fn new(extractor: Arc<dyn TextExtractor>, history: HistoryStore) -> Self {
        Self::with_period(extractor, history, SCAN_PERIOD)
    }

    /// Create a disabled watcher with a custom scan period.
    #[must_use]
    pub fn with_period(
        extractor: Arc<dyn TextExtractor>,
        history: HistoryStore,
        period: Duration,
    ) -> Self {
        Self {
            extractor,
            history,
            period,
            active: None,
        }
    }

    /// Whether a poll loop is currently armed.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.active.is_some()
    }

    /// Replace the watched configuration.
    ///
    /// Idempotent: any running poll loop is cancelled and its dedup state
    /// discarded before the new configuration takes effect. With `Some`,
    /// output directories are created (creation failures are logged and
    /// swallowed, a later scan may succeed), one scan runs immediately, and
    /// scanning then repeats on the fixed period. With `None` the watcher is
    /// disabled entirely.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the new configuration resolves to an
    /// invalid directory layout; the watcher is left disabled.
    pub async fn reconfigure(&mut self, config: Option<WatchConfig>) -> Result<(), ConfigError> {
        self.disarm().await;

        let Some(config) = config else {
            tracing::info!("Deposit watcher disabled");
            return Ok(());
        };

        let paths = Arc::new(config.resolve()?);
        paths.ensure_directories().await;

        let processor = Arc::new(FileProcessor::new(
            Arc::clone(&self.extractor),
            self.history.clone(),
        ));
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_loop(
            Arc::clone(&paths),
            processor,
            self.period,
            cancel.clone(),
        ));

        tracing::info!(
            deposit = %paths.deposit_root.display(),
            export = %paths.export_root.display(),
            "Deposit watcher armed"
        );
        self.active = Some(ActiveWatch { cancel, handle });
        Ok(())
    }

    /// Cancel the running poll loop, if any, and wait for it to stop.
    async fn disarm(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
            if let Err(e) = active.handle.await {
                if !e.is_cancelled() {
                    tracing::warn!(error = %e, "Poll loop ended abnormally");
                }
            }
        }
    }
}

impl Drop for DepositWatcher {
    fn drop(&mut self) {
        if let Some(active) = &self.active {
            active.cancel.cancel();
        }
    }
}

/// Scheduler loop: one immediate scan, then one per period.
///
/// The tracker is owned by this task and only ever touched between awaits
/// on the single timer, which is what makes the mark-then-dispatch step
/// race-free without locks. In-flight file tasks from previous ticks may
/// still be running; ticks never overlap each other.
async fn poll_loop(
    paths: Arc<WatchPaths>,
    processor: Arc<FileProcessor>,
    period: Duration,
    cancel: CancellationToken,
) {
    let rule = ExclusionRule::from_paths(&paths);
    let mut tracker = DedupTracker::new();
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => tick(&paths, &rule, &mut tracker, &processor),
        }
    }
}

/// One scheduler tick: scan, then fan out one task per discovered file.
///
/// Never waits on processor completion.
fn tick(
    paths: &Arc<WatchPaths>,
    rule: &ExclusionRule,
    tracker: &mut DedupTracker,
    processor: &Arc<FileProcessor>,
) {
    let discovered = scan::scan(&paths.deposit_root, rule, tracker);
    if discovered.is_empty() {
        return;
    }

    tracing::debug!(count = discovered.len(), "Dispatching discovered files");
    for file in discovered {
        let processor = Arc::clone(processor);
        let paths = Arc::clone(paths);
        tokio::spawn(async move {
            processor.run(file, &paths).await;
        });
    }
}
