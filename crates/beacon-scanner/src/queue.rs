//! Async job queue: a fixed worker pool over an mpsc channel.
//!
//! `enqueue` is idempotent per scan id — an in-flight set guarantees at
//! most one worker ever runs a given scan at a time. Workers wrap each run
//! in the scan wall-clock timeout and retry retriable failures with
//! exponential backoff plus jitter; a job that exhausts its retries is
//! marked `failed`, never dropped silently.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use beacon_core::AppConfig;

use crate::error::ScanError;
use crate::pipeline::{run_scan, ScanDeps};
use crate::types::{ScanPhase, ScanRequest, ScanStatus, PROGRESS_STARTED, PROGRESS_STRATEGY};

const MAX_JITTER_MS: u64 = 250;

#[derive(Debug, Clone, Copy)]
pub struct QueueConfig {
    pub workers: usize,
    pub max_retries: u32,
    pub backoff_base_secs: u64,
    pub scan_timeout_secs: u64,
}

impl QueueConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            workers: config.queue_workers,
            max_retries: config.queue_max_retries,
            backoff_base_secs: config.queue_retry_backoff_base_secs,
            scan_timeout_secs: config.scan_timeout_secs,
        }
    }
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("scan queue is shut down")]
    Closed,
}

pub struct ScanQueue {
    tx: mpsc::UnboundedSender<ScanRequest>,
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
}

impl ScanQueue {
    /// Spawn the worker pool and return a handle for enqueueing. At least
    /// one worker always runs, even if `config.workers` is 0 — callers
    /// that want sync execution should not construct a queue at all.
    #[must_use]
    pub fn start(deps: Arc<ScanDeps>, config: QueueConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let in_flight: Arc<Mutex<HashSet<Uuid>>> = Arc::new(Mutex::new(HashSet::new()));

        for worker_id in 0..config.workers.max(1) {
            tokio::spawn(worker_loop(
                worker_id,
                Arc::clone(&deps),
                config,
                Arc::clone(&rx),
                Arc::clone(&in_flight),
            ));
        }

        Self { tx, in_flight }
    }

    /// Hand a scan to the worker pool.
    ///
    /// Returns `Ok(true)` if the job was accepted and `Ok(false)` if a job
    /// for the same scan id is already queued or running.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Closed`] if every worker has shut down.
    pub fn enqueue(&self, request: ScanRequest) -> Result<bool, QueueError> {
        let scan_id = request.scan_id;
        if !lock_set(&self.in_flight).insert(scan_id) {
            tracing::debug!(%scan_id, "scan already in flight — ignoring duplicate enqueue");
            return Ok(false);
        }
        if self.tx.send(request).is_err() {
            lock_set(&self.in_flight).remove(&scan_id);
            return Err(QueueError::Closed);
        }
        Ok(true)
    }
}

async fn worker_loop(
    worker_id: usize,
    deps: Arc<ScanDeps>,
    config: QueueConfig,
    rx: Arc<tokio::sync::Mutex<mpsc::UnboundedReceiver<ScanRequest>>>,
    in_flight: Arc<Mutex<HashSet<Uuid>>>,
) {
    loop {
        let request = {
            let mut rx = rx.lock().await;
            match rx.recv().await {
                Some(request) => request,
                None => break,
            }
        };
        let scan_id = request.scan_id;
        tracing::info!(worker_id, %scan_id, "worker picked up scan");
        run_with_retries(&deps, &request, config).await;
        lock_set(&in_flight).remove(&scan_id);
    }
}

/// Run a scan under the wall-clock ceiling, retrying retriable failures.
async fn run_with_retries(deps: &ScanDeps, request: &ScanRequest, config: QueueConfig) {
    let scan_id = request.scan_id;
    let ceiling = Duration::from_secs(config.scan_timeout_secs);
    let mut attempt = 0u32;

    loop {
        let err = match tokio::time::timeout(ceiling, run_scan(deps, request)).await {
            Ok(Ok(_)) => return,
            Ok(Err(e)) => e,
            Err(_) => ScanError::Timeout {
                secs: config.scan_timeout_secs,
            },
        };

        // A scan with a persisted score is past its processing phases.
        // Rerunning would redo every provider call for a result that is
        // already saved, and `failed` would discard a valid score, so a
        // late failure settles as `strategy_failed` instead.
        match deps.store.has_result(scan_id).await {
            Ok(true) => {
                settle_strategy_failed(deps, scan_id, &err).await;
                return;
            }
            Ok(false) => {}
            Err(check_err) => {
                tracing::warn!(%scan_id, error = %check_err, "could not check for a persisted score");
            }
        }

        if !err.is_retriable() || attempt >= config.max_retries {
            mark_failed(deps, scan_id, &err).await;
            return;
        }

        let delay_secs = config
            .backoff_base_secs
            .saturating_mul(1u64 << attempt.min(62));
        let jitter_ms = rand::rng().random_range(0..=MAX_JITTER_MS);
        tracing::warn!(
            %scan_id,
            attempt,
            max_retries = config.max_retries,
            delay_secs,
            error = %err,
            "scan attempt failed — retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs) + Duration::from_millis(jitter_ms))
            .await;
        attempt += 1;
    }
}

/// Best-effort marking for a failure that landed after the score write,
/// typically the wall-clock ceiling expiring during strategy generation.
/// The score stays on the row.
async fn settle_strategy_failed(deps: &ScanDeps, scan_id: Uuid, err: &ScanError) {
    tracing::warn!(%scan_id, error = %err, "scan failed after scoring — keeping the score");
    if let Err(store_err) = deps
        .store
        .set_status(
            scan_id,
            ScanStatus::StrategyFailed,
            Some(ScanPhase::GeneratingStrategy),
            PROGRESS_STRATEGY,
        )
        .await
    {
        tracing::error!(%scan_id, error = %store_err, "failed to mark scan strategy_failed");
    }
}

/// Best-effort terminal marking. The pipeline marks its own failures; this
/// also covers runs the timeout cancelled mid-flight, so a scan is never
/// left in `processing`.
async fn mark_failed(deps: &ScanDeps, scan_id: Uuid, err: &ScanError) {
    tracing::error!(%scan_id, error = %err, "scan failed permanently");
    if let Err(store_err) = deps.store.set_error(scan_id, &err.to_string()).await {
        tracing::error!(%scan_id, error = %store_err, "failed to record scan error");
    }
    if let Err(store_err) = deps
        .store
        .set_status(scan_id, ScanStatus::Failed, Some(err.phase()), PROGRESS_STARTED)
        .await
    {
        tracing::error!(%scan_id, error = %store_err, "failed to mark scan failed");
    }
}

fn lock_set(set: &Arc<Mutex<HashSet<Uuid>>>) -> std::sync::MutexGuard<'_, HashSet<Uuid>> {
    set.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
