//! Deposit watcher: poll scheduling, scanning, and dedup tracking.
//!
//! The watcher polls the deposit tree on a fixed interval rather than
//! subscribing to filesystem events; a simple scan every few seconds is
//! sufficient for typical deposit workflows.

mod dedup;
mod deposit;
mod exclusion;
mod scan;

pub use dedup::DedupTracker;
pub use deposit::{DepositWatcher, SCAN_PERIOD};
pub use exclusion::ExclusionRule;
pub use scan::scan;
