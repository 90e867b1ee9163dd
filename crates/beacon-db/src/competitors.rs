//! Database operations for the `competitor_snapshots` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `competitor_snapshots` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CompetitorSnapshotRow {
    pub id: i64,
    pub scan_id: Uuid,
    pub brand_id: i64,
    pub competitor_name: String,
    pub mentions: i32,
    pub avg_confidence: f64,
    pub best_position: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Upsert one competitor snapshot and return its id.
///
/// Keyed on `(scan_id, competitor_name)`: a retried scan overwrites the
/// rows its earlier attempt wrote instead of duplicating them.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the write fails.
pub async fn insert_competitor_snapshot(
    pool: &PgPool,
    scan_id: Uuid,
    brand_id: i64,
    competitor_name: &str,
    mentions: i32,
    avg_confidence: f64,
    best_position: Option<i32>,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO competitor_snapshots \
             (scan_id, brand_id, competitor_name, mentions, avg_confidence, best_position) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (scan_id, competitor_name) DO UPDATE SET \
             mentions = EXCLUDED.mentions, \
             avg_confidence = EXCLUDED.avg_confidence, \
             best_position = EXCLUDED.best_position \
         RETURNING id",
    )
    .bind(scan_id)
    .bind(brand_id)
    .bind(competitor_name)
    .bind(mentions)
    .bind(avg_confidence)
    .bind(best_position)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// List snapshot history for a brand, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_competitor_history(
    pool: &PgPool,
    brand_id: i64,
    limit: i64,
) -> Result<Vec<CompetitorSnapshotRow>, DbError> {
    let rows = sqlx::query_as::<_, CompetitorSnapshotRow>(
        "SELECT id, scan_id, brand_id, competitor_name, mentions, avg_confidence, \
                best_position, created_at \
         FROM competitor_snapshots \
         WHERE brand_id = $1 \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2",
    )
    .bind(brand_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
