//! Persisted history of processed documents.

mod error;
mod store;
mod types;

pub use error::HistoryError;
pub use store::{default_history_path, HistoryStore, DEFAULT_EVENT_CHANNEL_CAPACITY};
pub use types::{HistoryEntry, HistoryEvent};
