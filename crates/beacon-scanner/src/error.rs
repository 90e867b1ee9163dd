use thiserror::Error;
use uuid::Uuid;

use crate::types::ScanPhase;

/// Storage-layer failures seen by the pipeline.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] beacon_db::DbError),

    #[error("failed to encode breakdown: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("scan {0} not found")]
    MissingScan(Uuid),
}

/// Fatal scan failures. Enrichment steps (delta, share-of-voice, strategy)
/// never produce one of these; their failures surface as missing optional
/// fields on the result instead.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Query(#[from] beacon_queries::QueryError),

    #[error("no AI providers are configured")]
    NoProvidersConfigured,

    #[error("all provider calls failed ({attempted} attempted)")]
    AllProvidersFailed { attempted: usize },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("scan exceeded the {secs}s wall-clock ceiling")]
    Timeout { secs: u64 },
}

impl ScanError {
    /// The pipeline phase this error is attributed to in the scan record.
    #[must_use]
    pub fn phase(&self) -> ScanPhase {
        match self {
            ScanError::Query(_) => ScanPhase::GeneratingQueries,
            ScanError::NoProvidersConfigured
            | ScanError::AllProvidersFailed { .. }
            | ScanError::Timeout { .. } => ScanPhase::QueryingProviders,
            ScanError::Store(_) => ScanPhase::PersistingResults,
        }
    }

    /// Whether the queue should retry a run that ended with this error.
    ///
    /// Query validation failures are deterministic; rerunning the same
    /// profile yields the same rejection, so they are never retried.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        match self {
            ScanError::Query(_) | ScanError::NoProvidersConfigured => false,
            ScanError::AllProvidersFailed { .. }
            | ScanError::Store(_)
            | ScanError::Timeout { .. } => true,
        }
    }
}
