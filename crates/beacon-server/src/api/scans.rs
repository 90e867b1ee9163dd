//! Scan submission and status routes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use beacon_core::{PlanTier, ProductProfile, QuotaDecision, QuotaState};
use beacon_db::SubscriptionRow;
use beacon_scanner::{run_scan, ScanRequest, ScanResult, ScanStatus};

use crate::api::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct CreateScanBody {
    brand_id: i64,
    profile: ProductProfile,
    #[serde(default)]
    explicit_questions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateScanData {
    scan_id: Uuid,
    status: ScanStatus,
    /// Present only when the scan ran synchronously.
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<ScanResult>,
}

#[derive(Debug, Serialize)]
pub(super) struct ScanStatusData {
    scan_id: Uuid,
    status: String,
    phase: Option<String>,
    progress: i16,
    score: Option<f64>,
    breakdown: Option<serde_json::Value>,
    strategy: Option<String>,
    error: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Resolve the quota view for a brand. A brand with no subscription row is
/// on the free tier with nothing consumed.
fn quota_state(subscription: Option<&SubscriptionRow>) -> QuotaState {
    match subscription {
        Some(s) => QuotaState {
            tier: PlanTier::parse(&s.tier),
            whitelisted: s.whitelisted,
            free_scan_used: s.free_scan_used,
            scans_used: s.scans_used,
            scans_limit: s.scans_limit,
        },
        None => QuotaState {
            tier: PlanTier::Free,
            whitelisted: false,
            free_scan_used: false,
            scans_used: 0,
            scans_limit: 1,
        },
    }
}

pub(super) async fn create_scan(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateScanBody>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = req_id.0;

    if let Err(e) = body.profile.validate() {
        return Err(ApiError::new(request_id, "validation_error", e.to_string()));
    }

    let subscription = beacon_db::get_subscription(&state.pool, body.brand_id)
        .await
        .map_err(|e| map_db_error(request_id.clone(), &e))?;
    let quota = quota_state(subscription.as_ref());
    match quota.check() {
        QuotaDecision::Allowed => {}
        QuotaDecision::FreeScanUsed => {
            return Err(ApiError::new(
                request_id,
                "quota_exceeded",
                "the free scan for this brand has already been used",
            ));
        }
        QuotaDecision::LimitReached => {
            return Err(ApiError::new(
                request_id,
                "quota_exceeded",
                "the scan limit for this plan has been reached",
            ));
        }
    }

    let scan_id = Uuid::new_v4();
    state
        .deps
        .store
        .create_scan(scan_id, body.brand_id, &body.profile.brand_name)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to create scan record");
            ApiError::new(request_id.clone(), "internal_error", "failed to create scan")
        })?;
    beacon_db::record_scan_usage(&state.pool, body.brand_id)
        .await
        .map_err(|e| map_db_error(request_id.clone(), &e))?;

    let request = ScanRequest {
        scan_id,
        brand_id: body.brand_id,
        profile: body.profile,
        tier: quota.tier,
        explicit_questions: body.explicit_questions,
    };

    let meta = ResponseMeta::new(request_id.clone());
    if let Some(queue) = &state.queue {
        queue.enqueue(request).map_err(|e| {
            tracing::error!(error = %e, "scan queue rejected job");
            ApiError::new(request_id, "queue_unavailable", "scan queue is unavailable")
        })?;
        return Ok((
            StatusCode::ACCEPTED,
            Json(ApiResponse {
                data: CreateScanData {
                    scan_id,
                    status: ScanStatus::Queued,
                    result: None,
                },
                meta,
            }),
        ));
    }

    // Sync fallback: no queue configured, run inline.
    match run_scan(&state.deps, &request).await {
        Ok(result) => {
            let status = if result.strategy.is_some() {
                ScanStatus::Complete
            } else {
                ScanStatus::StrategyFailed
            };
            Ok((
                StatusCode::OK,
                Json(ApiResponse {
                    data: CreateScanData {
                        scan_id,
                        status,
                        result: Some(result),
                    },
                    meta,
                }),
            ))
        }
        Err(e) => Err(ApiError::new(request_id, "scan_failed", e.to_string())),
    }
}

pub(super) async fn get_scan(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(scan_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = req_id.0;

    let row = beacon_db::get_scan(&state.pool, scan_id)
        .await
        .map_err(|e| map_db_error(request_id.clone(), &e))?
        .ok_or_else(|| ApiError::new(request_id.clone(), "not_found", "no such scan"))?;

    Ok(Json(ApiResponse {
        data: ScanStatusData {
            scan_id: row.id,
            status: row.status,
            phase: row.phase,
            progress: row.progress,
            score: row.score,
            breakdown: row.breakdown,
            strategy: row.strategy,
            error: row.error,
            created_at: row.created_at,
            updated_at: row.updated_at,
        },
        meta: ResponseMeta::new(request_id),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(tier: &str) -> SubscriptionRow {
        SubscriptionRow {
            brand_id: 1,
            tier: tier.to_string(),
            scans_used: 0,
            scans_limit: 10,
            free_scan_used: false,
            whitelisted: false,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn missing_subscription_defaults_to_fresh_free_tier() {
        let quota = quota_state(None);
        assert_eq!(quota.tier, PlanTier::Free);
        assert_eq!(quota.check(), QuotaDecision::Allowed);
    }

    #[test]
    fn subscription_row_maps_onto_quota_state() {
        let mut row = subscription("starter");
        row.scans_used = 10;
        let quota = quota_state(Some(&row));
        assert_eq!(quota.tier, PlanTier::Starter);
        assert_eq!(quota.check(), QuotaDecision::LimitReached);
    }

    #[test]
    fn whitelist_overrides_spent_free_scan() {
        let mut row = subscription("free");
        row.free_scan_used = true;
        row.whitelisted = true;
        assert_eq!(quota_state(Some(&row)).check(), QuotaDecision::Allowed);
    }
}
