//! Scan orchestration for Beacon.
//!
//! Ties the pure crates (queries, detection, scoring) to the async world:
//! fanning out provider calls, persisting lifecycle transitions through
//! the [`ScanStore`] seam, and running scans either inline or through the
//! worker-pool queue.

pub mod error;
pub mod pipeline;
pub mod queue;
pub mod store;
mod strategy;
pub mod types;

pub use error::{ScanError, StoreError};
pub use pipeline::{run_scan, ScanDeps};
pub use queue::{QueueConfig, QueueError, ScanQueue};
pub use store::{MemoryScanStore, PgScanStore, ScanRecord, ScanStore};
pub use types::{
    CompetitorSnapshot, ScanPhase, ScanRequest, ScanResult, ScanStatus, PROGRESS_DONE,
    PROGRESS_SCORED, PROGRESS_STARTED, PROGRESS_STRATEGY,
};
