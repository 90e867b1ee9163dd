//! Database operations for the `scans` table.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `scans` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScanRow {
    pub id: Uuid,
    pub brand_id: i64,
    pub brand_name: String,
    pub status: String,
    pub phase: Option<String>,
    pub progress: i16,
    pub score: Option<f64>,
    pub breakdown: Option<Value>,
    pub strategy: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const SCAN_COLUMNS: &str = "id, brand_id, brand_name, status, phase, progress, \
                            score, breakdown, strategy, error, created_at, updated_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert a new scan in the `queued` state.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_scan(
    pool: &PgPool,
    id: Uuid,
    brand_id: i64,
    brand_name: &str,
) -> Result<(), DbError> {
    sqlx::query("INSERT INTO scans (id, brand_id, brand_name) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(brand_id)
        .bind(brand_name)
        .execute(pool)
        .await?;
    Ok(())
}

/// Fetch a scan by id, or `None` if it does not exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_scan(pool: &PgPool, id: Uuid) -> Result<Option<ScanRow>, DbError> {
    let row = sqlx::query_as::<_, ScanRow>(&format!(
        "SELECT {SCAN_COLUMNS} FROM scans WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Update a scan's status, phase, and progress checkpoint.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no scan with `id` exists, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_scan_status(
    pool: &PgPool,
    id: Uuid,
    status: &str,
    phase: Option<&str>,
    progress: i16,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE scans \
         SET status = $2, phase = $3, progress = $4, updated_at = now() \
         WHERE id = $1",
    )
    .bind(id)
    .bind(status)
    .bind(phase)
    .bind(progress)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Store the computed score and breakdown for a scan.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no scan with `id` exists, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn set_scan_result(
    pool: &PgPool,
    id: Uuid,
    score: f64,
    breakdown: Value,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE scans SET score = $2, breakdown = $3, updated_at = now() WHERE id = $1",
    )
    .bind(id)
    .bind(score)
    .bind(breakdown)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Record a scan failure message. Does not change status; the caller
/// transitions status and error together via its own sequencing.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no scan with `id` exists, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn set_scan_error(pool: &PgPool, id: Uuid, error: &str) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE scans SET error = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(error)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Store the generated visibility strategy text for a scan.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no scan with `id` exists, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn set_scan_strategy(pool: &PgPool, id: Uuid, strategy: &str) -> Result<(), DbError> {
    let result = sqlx::query("UPDATE scans SET strategy = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(strategy)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Return the most recent completed scan for a brand, excluding `current_id`.
///
/// A scan counts as completed once it has a persisted score, so both the
/// `complete` and `strategy_failed` terminal states qualify.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_prior_completed_scan(
    pool: &PgPool,
    brand_id: i64,
    current_id: Uuid,
) -> Result<Option<ScanRow>, DbError> {
    let row = sqlx::query_as::<_, ScanRow>(&format!(
        "SELECT {SCAN_COLUMNS} FROM scans \
         WHERE brand_id = $1 AND id <> $2 AND status IN ('complete', 'strategy_failed') \
         ORDER BY created_at DESC, id DESC \
         LIMIT 1"
    ))
    .bind(brand_id)
    .bind(current_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
