//! Storage seam for the scan pipeline.
//!
//! The pipeline only ever talks to a [`ScanStore`]; [`PgScanStore`] backs
//! it with Postgres through `beacon-db`, and [`MemoryScanStore`] keeps
//! everything in a mutex-guarded map for tests and the CLI's one-shot
//! mode.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use beacon_scoring::{ScoreSummary, ScoringBreakdown};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{CompetitorSnapshot, ScanPhase, ScanStatus};

#[async_trait]
pub trait ScanStore: Send + Sync {
    /// Record a new scan in the `queued` state.
    async fn create_scan(
        &self,
        id: Uuid,
        brand_id: i64,
        brand_name: &str,
    ) -> Result<(), StoreError>;

    /// Move a scan to `status`/`phase` at the given progress checkpoint.
    async fn set_status(
        &self,
        id: Uuid,
        status: ScanStatus,
        phase: Option<ScanPhase>,
        progress: u8,
    ) -> Result<(), StoreError>;

    /// Persist the computed score and breakdown.
    async fn set_result(
        &self,
        id: Uuid,
        score: f64,
        breakdown: &ScoringBreakdown,
    ) -> Result<(), StoreError>;

    /// Record a failure message without touching the status.
    async fn set_error(&self, id: Uuid, message: &str) -> Result<(), StoreError>;

    /// Persist the generated visibility strategy text.
    async fn set_strategy(&self, id: Uuid, strategy: &str) -> Result<(), StoreError>;

    /// Whether a score has already been persisted for this scan.
    async fn has_result(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Headline numbers of the brand's most recent completed scan,
    /// excluding `current_scan`. `None` for a first scan.
    async fn prior_summary(
        &self,
        brand_id: i64,
        current_scan: Uuid,
    ) -> Result<Option<ScoreSummary>, StoreError>;

    /// Write one snapshot row per tracked competitor. Rerun-safe: rows a
    /// previous attempt of the same scan wrote are overwritten, not
    /// duplicated.
    async fn insert_competitor_snapshots(
        &self,
        scan_id: Uuid,
        brand_id: i64,
        snapshots: &[CompetitorSnapshot],
    ) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// Postgres-backed store
// ---------------------------------------------------------------------------

pub struct PgScanStore {
    pool: PgPool,
}

impl PgScanStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScanStore for PgScanStore {
    async fn create_scan(
        &self,
        id: Uuid,
        brand_id: i64,
        brand_name: &str,
    ) -> Result<(), StoreError> {
        beacon_db::insert_scan(&self.pool, id, brand_id, brand_name).await?;
        Ok(())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: ScanStatus,
        phase: Option<ScanPhase>,
        progress: u8,
    ) -> Result<(), StoreError> {
        beacon_db::update_scan_status(
            &self.pool,
            id,
            status.as_str(),
            phase.map(ScanPhase::as_str),
            i16::from(progress),
        )
        .await?;
        Ok(())
    }

    async fn set_result(
        &self,
        id: Uuid,
        score: f64,
        breakdown: &ScoringBreakdown,
    ) -> Result<(), StoreError> {
        let breakdown = serde_json::to_value(breakdown)?;
        beacon_db::set_scan_result(&self.pool, id, score, breakdown).await?;
        Ok(())
    }

    async fn set_error(&self, id: Uuid, message: &str) -> Result<(), StoreError> {
        beacon_db::set_scan_error(&self.pool, id, message).await?;
        Ok(())
    }

    async fn set_strategy(&self, id: Uuid, strategy: &str) -> Result<(), StoreError> {
        beacon_db::set_scan_strategy(&self.pool, id, strategy).await?;
        Ok(())
    }

    async fn has_result(&self, id: Uuid) -> Result<bool, StoreError> {
        let row = beacon_db::get_scan(&self.pool, id).await?;
        Ok(row.is_some_and(|r| r.score.is_some()))
    }

    async fn prior_summary(
        &self,
        brand_id: i64,
        current_scan: Uuid,
    ) -> Result<Option<ScoreSummary>, StoreError> {
        let row = beacon_db::get_prior_completed_scan(&self.pool, brand_id, current_scan).await?;
        Ok(row.and_then(|r| {
            let score = r.score?;
            let mention_rate = r
                .breakdown
                .as_ref()
                .and_then(|b| b.get("mention_rate"))
                .and_then(serde_json::Value::as_f64)
                .unwrap_or(0.0);
            Some(ScoreSummary {
                score,
                mention_rate,
            })
        }))
    }

    async fn insert_competitor_snapshots(
        &self,
        scan_id: Uuid,
        brand_id: i64,
        snapshots: &[CompetitorSnapshot],
    ) -> Result<(), StoreError> {
        for snapshot in snapshots {
            beacon_db::insert_competitor_snapshot(
                &self.pool,
                scan_id,
                brand_id,
                &snapshot.name,
                i32::try_from(snapshot.mentions).unwrap_or(i32::MAX),
                snapshot.avg_confidence,
                snapshot
                    .best_position
                    .map(|p| i32::try_from(p).unwrap_or(i32::MAX)),
            )
            .await?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// One scan's record as kept by [`MemoryScanStore`].
#[derive(Debug, Clone)]
pub struct ScanRecord {
    pub brand_id: i64,
    pub brand_name: String,
    pub status: ScanStatus,
    pub phase: Option<ScanPhase>,
    pub progress: u8,
    pub score: Option<f64>,
    pub breakdown: Option<ScoringBreakdown>,
    pub strategy: Option<String>,
    pub error: Option<String>,
    seq: u64,
}

#[derive(Default)]
struct Inner {
    seq: u64,
    scans: HashMap<Uuid, ScanRecord>,
    snapshots: Vec<(Uuid, i64, CompetitorSnapshot)>,
}

/// In-memory [`ScanStore`] used by tests and the CLI's synchronous mode.
#[derive(Default)]
pub struct MemoryScanStore {
    inner: Mutex<Inner>,
}

impl MemoryScanStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current record for a scan, if one was created.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<ScanRecord> {
        self.lock().scans.get(&id).cloned()
    }

    /// All snapshots persisted for a brand, in insertion order.
    #[must_use]
    pub fn snapshots_for(&self, brand_id: i64) -> Vec<CompetitorSnapshot> {
        self.lock()
            .snapshots
            .iter()
            .filter(|(_, b, _)| *b == brand_id)
            .map(|(_, _, s)| s.clone())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means another test thread panicked; the
        // data itself is still coherent for our plain writes.
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn with_scan<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut ScanRecord) -> T,
    ) -> Result<T, StoreError> {
        let mut inner = self.lock();
        inner
            .scans
            .get_mut(&id)
            .map(f)
            .ok_or(StoreError::MissingScan(id))
    }
}

#[async_trait]
impl ScanStore for MemoryScanStore {
    async fn create_scan(
        &self,
        id: Uuid,
        brand_id: i64,
        brand_name: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.seq += 1;
        let seq = inner.seq;
        inner.scans.insert(
            id,
            ScanRecord {
                brand_id,
                brand_name: brand_name.to_string(),
                status: ScanStatus::Queued,
                phase: None,
                progress: 0,
                score: None,
                breakdown: None,
                strategy: None,
                error: None,
                seq,
            },
        );
        Ok(())
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: ScanStatus,
        phase: Option<ScanPhase>,
        progress: u8,
    ) -> Result<(), StoreError> {
        self.with_scan(id, |scan| {
            scan.status = status;
            scan.phase = phase;
            scan.progress = progress;
        })
    }

    async fn set_result(
        &self,
        id: Uuid,
        score: f64,
        breakdown: &ScoringBreakdown,
    ) -> Result<(), StoreError> {
        self.with_scan(id, |scan| {
            scan.score = Some(score);
            scan.breakdown = Some(breakdown.clone());
        })
    }

    async fn set_error(&self, id: Uuid, message: &str) -> Result<(), StoreError> {
        self.with_scan(id, |scan| {
            scan.error = Some(message.to_string());
        })
    }

    async fn set_strategy(&self, id: Uuid, strategy: &str) -> Result<(), StoreError> {
        self.with_scan(id, |scan| {
            scan.strategy = Some(strategy.to_string());
        })
    }

    async fn has_result(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.lock().scans.get(&id).is_some_and(|s| s.score.is_some()))
    }

    async fn prior_summary(
        &self,
        brand_id: i64,
        current_scan: Uuid,
    ) -> Result<Option<ScoreSummary>, StoreError> {
        let inner = self.lock();
        let prior = inner
            .scans
            .iter()
            .filter(|(id, scan)| {
                **id != current_scan
                    && scan.brand_id == brand_id
                    && matches!(
                        scan.status,
                        ScanStatus::Complete | ScanStatus::StrategyFailed
                    )
            })
            .max_by_key(|(_, scan)| scan.seq)
            .and_then(|(_, scan)| {
                Some(ScoreSummary {
                    score: scan.score?,
                    mention_rate: scan.breakdown.as_ref().map_or(0.0, |b| b.mention_rate),
                })
            });
        Ok(prior)
    }

    async fn insert_competitor_snapshots(
        &self,
        scan_id: Uuid,
        brand_id: i64,
        snapshots: &[CompetitorSnapshot],
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        // Mirror the Postgres upsert: a rerun replaces its own rows.
        inner.snapshots.retain(|(sid, _, _)| *sid != scan_id);
        for snapshot in snapshots {
            inner.snapshots.push((scan_id, brand_id, snapshot.clone()));
        }
        Ok(())
    }
}
