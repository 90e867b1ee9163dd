//! Competitor snapshot history route.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{map_db_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct HistoryParams {
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct CompetitorHistoryItem {
    scan_id: Uuid,
    competitor_name: String,
    mentions: i32,
    avg_confidence: f64,
    best_position: Option<i32>,
    created_at: DateTime<Utc>,
}

pub(super) async fn list_competitor_history(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(brand_id): Path<i64>,
    Query(params): Query<HistoryParams>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = req_id.0;
    let limit = normalize_limit(params.limit);

    let rows = beacon_db::list_competitor_history(&state.pool, brand_id, limit)
        .await
        .map_err(|e| map_db_error(request_id.clone(), &e))?;

    let items: Vec<CompetitorHistoryItem> = rows
        .into_iter()
        .map(|row| CompetitorHistoryItem {
            scan_id: row.scan_id,
            competitor_name: row.competitor_name,
            mentions: row.mentions,
            avg_confidence: row.avg_confidence,
            best_position: row.best_position,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data: items,
        meta: ResponseMeta::new(request_id),
    }))
}
