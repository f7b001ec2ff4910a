//! Persisted history store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

use super::error::HistoryError;
use super::types::{HistoryEntry, HistoryEvent};

/// Default capacity for the change notification channel.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Returns the default path for the history store.
///
/// This is `~/.local/share/deposit-ocr/history.json` on Unix systems.
#[must_use]
pub fn default_history_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("deposit-ocr")
        .join("history.json")
}

/// Durable, ordered record of processed documents.
///
/// Entries are kept newest-first in insertion order, which under concurrent
/// pipelines is completion order, not discovery order. Every mutation holds
/// one lock across the in-memory change, the full-document disk write, and
/// the observer notification, so concurrent writers never interleave
/// partial updates.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: Arc<Mutex<Vec<HistoryEntry>>>,
    path: PathBuf,
    events: broadcast::Sender<HistoryEvent>,
}

impl HistoryStore {
    /// Open a history store backed by `path`.
    ///
    /// Creates parent directories if they don't exist and loads any existing
    /// collection. A missing or unreadable document starts the store empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                tokio::fs::create_dir_all(parent).await.map_err(|source| {
                    HistoryError::CreateDir {
                        path: parent.to_path_buf(),
                        source,
                    }
                })?;
            }
        }

        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<Vec<HistoryEntry>>(&bytes) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Could not decode history document, starting empty"
                    );
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };

        let (events, _) = broadcast::channel(DEFAULT_EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            entries: Arc::new(Mutex::new(entries)),
            path,
            events,
        })
    }

    /// Returns the path of the persisted document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Subscribe to change notifications.
    ///
    /// Events are sent only after a mutation has been committed to disk.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<HistoryEvent> {
        self.events.subscribe()
    }

    /// Insert `entry` at the front (most-recent-first) and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written to disk.
    pub async fn insert(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let id = entry.id;
        let mut entries = self.entries.lock().await;
        entries.insert(0, entry);
        Self::persist(&entries, &self.path).await?;
        let _ = self.events.send(HistoryEvent::Inserted(id));
        Ok(())
    }

    /// Remove the entry with `id`, persist, and notify.
    ///
    /// Deleting a nonexistent id is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written to disk.
    pub async fn delete(&self, id: Uuid) -> Result<(), HistoryError> {
        let mut entries = self.entries.lock().await;
        let Some(index) = entries.iter().position(|e| e.id == id) else {
            return Ok(());
        };
        entries.remove(index);
        Self::persist(&entries, &self.path).await?;
        let _ = self.events.send(HistoryEvent::Deleted(id));
        Ok(())
    }

    /// Remove every entry, persist, and notify.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written to disk.
    pub async fn wipe_all(&self) -> Result<(), HistoryError> {
        let mut entries = self.entries.lock().await;
        entries.clear();
        Self::persist(&entries, &self.path).await?;
        let _ = self.events.send(HistoryEvent::Wiped);
        Ok(())
    }

    /// All entries, newest first.
    pub async fn fetch_all(&self) -> Vec<HistoryEntry> {
        self.entries.lock().await.clone()
    }

    /// The most recent `limit` entries.
    pub async fn fetch_last(&self, limit: usize) -> Vec<HistoryEntry> {
        let entries = self.entries.lock().await;
        entries.iter().take(limit).cloned().collect()
    }

    /// Look up one entry by id.
    pub async fn get(&self, id: Uuid) -> Option<HistoryEntry> {
        let entries = self.entries.lock().await;
        entries.iter().find(|e| e.id == id).cloned()
    }

    /// Write the full collection as a single JSON document.
    async fn persist(entries: &[HistoryEntry], path: &Path) -> Result<(), HistoryError> {
        let bytes = serde_json::to_vec_pretty(entries)?;
        tokio::fs::write(path, bytes)
            .await
            .map_err(|source| HistoryError::Persist {
                path: path.to_path_buf(),
                source,
            })
    }
}
