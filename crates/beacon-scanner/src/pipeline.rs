//! The scan orchestrator.
//!
//! [`run_scan`] is the single entry point for executing one scan, used by
//! both the queue worker and the synchronous callers. It owns every
//! fatal/non-fatal decision: query validation and total provider failure
//! are fatal; snapshot persistence, delta, share-of-voice, and strategy
//! generation degrade to missing fields on the result.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use uuid::Uuid;

use beacon_detect::{detect, detect_all};
use beacon_providers::AiProvider;
use beacon_queries::generate_queries;
use beacon_scoring::{compute_delta, score, share_of_voice, CompetitorDetection, ResponseAnalysis};

use crate::error::ScanError;
use crate::store::ScanStore;
use crate::strategy::generate_strategy;
use crate::types::{
    CompetitorSnapshot, ScanPhase, ScanRequest, ScanResult, ScanStatus, PROGRESS_DONE,
    PROGRESS_SCORED, PROGRESS_STARTED, PROGRESS_STRATEGY,
};

/// Shared dependencies for scan execution. One instance serves the whole
/// process; the queue and the server clone the `Arc`s inside.
pub struct ScanDeps {
    pub store: Arc<dyn ScanStore>,
    pub providers: Vec<Arc<dyn AiProvider>>,
    /// Ceiling for one provider call, on top of the client's own timeout.
    pub provider_timeout: Duration,
}

/// Run one scan to a terminal state.
///
/// On `Ok` the scan is `complete` or `strategy_failed` with a persisted
/// score. On `Err` the scan has been marked `failed` where the store
/// allowed it, with the failing phase recorded.
///
/// # Errors
///
/// Returns [`ScanError`] when query validation fails, no provider call
/// succeeds, or the store rejects a required write.
pub async fn run_scan(deps: &ScanDeps, request: &ScanRequest) -> Result<ScanResult, ScanError> {
    let scan_id = request.scan_id;
    let store = &deps.store;
    let limits = request.tier.limits();

    store
        .set_status(
            scan_id,
            ScanStatus::Processing,
            Some(ScanPhase::GeneratingQueries),
            PROGRESS_STARTED,
        )
        .await?;

    let query_set = match generate_queries(
        &request.profile,
        &request.explicit_questions,
        limits.max_queries,
    ) {
        Ok(qs) => qs,
        Err(e) => return fail(store, scan_id, e.into(), PROGRESS_STARTED).await,
    };
    tracing::info!(%scan_id, queries = query_set.len(), "query set generated");

    // Plan tier decides how many providers the scan fans out to.
    let providers: Vec<Arc<dyn AiProvider>> = deps
        .providers
        .iter()
        .take(limits.max_providers)
        .cloned()
        .collect();
    if providers.is_empty() {
        return fail(
            store,
            scan_id,
            ScanError::NoProvidersConfigured,
            PROGRESS_STARTED,
        )
        .await;
    }

    store
        .set_status(
            scan_id,
            ScanStatus::Processing,
            Some(ScanPhase::QueryingProviders),
            PROGRESS_STARTED,
        )
        .await?;

    let responses = collect_responses(
        scan_id,
        &query_set.queries,
        &providers,
        limits.provider_concurrency,
        deps.provider_timeout,
    )
    .await;
    let attempted = query_set.len() * providers.len();
    if responses.is_empty() {
        return fail(
            store,
            scan_id,
            ScanError::AllProvidersFailed { attempted },
            PROGRESS_STARTED,
        )
        .await;
    }
    tracing::info!(
        %scan_id,
        received = responses.len(),
        attempted,
        "provider responses collected"
    );

    // Detection and scoring are pure; everything is in memory by now.
    let competitor_names = request.profile.all_competitors();
    let analyses: Vec<ResponseAnalysis> = responses
        .into_iter()
        .map(|(query, provider, text)| {
            let brand = detect(&text, &request.profile.brand_name, &request.profile.name_variations);
            let competitors = competitor_names
                .iter()
                .cloned()
                .zip(detect_all(&text, &competitor_names))
                .map(|(name, detection)| CompetitorDetection { name, detection })
                .collect();
            ResponseAnalysis {
                query_text: query.text,
                dedupe_key: query.dedupe_key,
                intent_weight: query.intent_weight,
                provider: provider.to_string(),
                response_text: text,
                brand,
                competitors,
            }
        })
        .collect();

    let breakdown = score(&analyses, query_set.len());
    if let Err(e) = store
        .set_result(scan_id, breakdown.final_score, &breakdown)
        .await
    {
        return fail(store, scan_id, e.into(), PROGRESS_STARTED).await;
    }
    store
        .set_status(
            scan_id,
            ScanStatus::Processing,
            Some(ScanPhase::Scoring),
            PROGRESS_SCORED,
        )
        .await?;

    // Snapshot persistence and the trend enrichments are best-effort from
    // here on: the score is already saved.
    store
        .set_status(
            scan_id,
            ScanStatus::Processing,
            Some(ScanPhase::PersistingResults),
            PROGRESS_SCORED,
        )
        .await?;
    let competitors = aggregate_competitors(&competitor_names, &analyses);
    if let Err(e) = store
        .insert_competitor_snapshots(scan_id, request.brand_id, &competitors)
        .await
    {
        tracing::warn!(%scan_id, error = %e, "failed to persist competitor snapshots");
    }

    let delta = match store.prior_summary(request.brand_id, scan_id).await {
        Ok(prior) => compute_delta(&breakdown, prior.as_ref()),
        Err(e) => {
            tracing::warn!(%scan_id, error = %e, "prior scan lookup failed — skipping delta");
            None
        }
    };
    let share = share_of_voice(
        &request.profile.brand_name,
        breakdown.detected_count,
        &competitors
            .iter()
            .map(|c| (c.name.clone(), c.mentions))
            .collect::<Vec<_>>(),
    );

    store
        .set_status(
            scan_id,
            ScanStatus::GeneratingStrategy,
            Some(ScanPhase::GeneratingStrategy),
            PROGRESS_STRATEGY,
        )
        .await?;
    let strategy = match tokio::time::timeout(
        deps.provider_timeout,
        generate_strategy(providers[0].as_ref(), &request.profile, &breakdown),
    )
    .await
    {
        Ok(Ok(text)) => {
            if let Err(e) = store.set_strategy(scan_id, &text).await {
                tracing::warn!(%scan_id, error = %e, "failed to persist strategy text");
            }
            store
                .set_status(scan_id, ScanStatus::Complete, None, PROGRESS_DONE)
                .await?;
            Some(text)
        }
        Ok(Err(e)) => {
            tracing::warn!(%scan_id, error = %e, "strategy generation failed");
            mark_strategy_failed(store, scan_id).await?;
            None
        }
        Err(_) => {
            tracing::warn!(%scan_id, "strategy generation timed out");
            mark_strategy_failed(store, scan_id).await?;
            None
        }
    };

    tracing::info!(%scan_id, score = breakdown.final_score, "scan finished");
    Ok(ScanResult {
        scan_id,
        score: breakdown.final_score,
        breakdown,
        competitors,
        delta,
        share_of_voice: Some(share),
        strategy,
    })
}

/// Fan out one provider call per (query, provider) pair, bounded by the
/// plan's concurrency cap. Failed or timed-out calls are logged and
/// dropped; callers decide what an empty result means.
async fn collect_responses(
    scan_id: Uuid,
    queries: &[beacon_queries::Query],
    providers: &[Arc<dyn AiProvider>],
    concurrency: usize,
    timeout: Duration,
) -> Vec<(beacon_queries::Query, &'static str, String)> {
    let mut calls = Vec::with_capacity(queries.len() * providers.len());
    for query in queries {
        for provider in providers {
            let provider = Arc::clone(provider);
            let query = query.clone();
            calls.push(async move {
                let name = provider.name();
                match tokio::time::timeout(timeout, provider.complete(&query.text)).await {
                    Ok(Ok(text)) => Some((query, name, text)),
                    Ok(Err(e)) => {
                        tracing::warn!(
                            %scan_id,
                            provider = name,
                            error = %e,
                            "provider call failed — excluding response"
                        );
                        None
                    }
                    Err(_) => {
                        tracing::warn!(
                            %scan_id,
                            provider = name,
                            timeout_secs = timeout.as_secs(),
                            "provider call timed out — excluding response"
                        );
                        None
                    }
                }
            });
        }
    }

    stream::iter(calls)
        .buffer_unordered(concurrency.max(1))
        .filter_map(futures::future::ready)
        .collect()
        .await
}

/// Per-competitor aggregation over all analyses, in tracked order.
fn aggregate_competitors(
    names: &[String],
    analyses: &[ResponseAnalysis],
) -> Vec<CompetitorSnapshot> {
    names
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let mut mentions = 0usize;
            let mut confidence_sum = 0.0;
            let mut best_position: Option<u32> = None;
            for analysis in analyses {
                let Some(hit) = analysis.competitors.get(idx) else {
                    continue;
                };
                if !hit.detection.detected {
                    continue;
                }
                mentions += 1;
                confidence_sum += hit.detection.confidence;
                if let Some(pos) = hit.detection.position {
                    best_position = Some(best_position.map_or(pos, |b| b.min(pos)));
                }
            }
            #[allow(clippy::cast_precision_loss)]
            let avg_confidence = if mentions == 0 {
                0.0
            } else {
                confidence_sum / mentions as f64
            };
            CompetitorSnapshot {
                name: name.clone(),
                mentions,
                avg_confidence,
                best_position,
            }
        })
        .collect()
}

/// Mark a scan failed and record why. Store failures here are logged, not
/// propagated: the original error is what the caller needs to see.
async fn fail(
    store: &Arc<dyn ScanStore>,
    scan_id: Uuid,
    err: ScanError,
    progress: u8,
) -> Result<ScanResult, ScanError> {
    let phase = err.phase();
    if let Err(store_err) = store.set_error(scan_id, &err.to_string()).await {
        tracing::error!(%scan_id, error = %store_err, "failed to record scan error");
    }
    if let Err(store_err) = store
        .set_status(scan_id, ScanStatus::Failed, Some(phase), progress)
        .await
    {
        tracing::error!(%scan_id, error = %store_err, "failed to mark scan failed");
    }
    Err(err)
}

async fn mark_strategy_failed(
    store: &Arc<dyn ScanStore>,
    scan_id: Uuid,
) -> Result<(), ScanError> {
    store
        .set_status(
            scan_id,
            ScanStatus::StrategyFailed,
            Some(ScanPhase::GeneratingStrategy),
            PROGRESS_STRATEGY,
        )
        .await?;
    Ok(())
}
