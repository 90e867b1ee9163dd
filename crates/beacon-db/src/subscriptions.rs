//! Database operations for the `subscriptions` table.
//!
//! One row per brand; holds the plan tier and quota counters that feed the
//! pre-scan quota check. Missing row means the brand is on the free tier
//! with nothing consumed yet.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `subscriptions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SubscriptionRow {
    pub brand_id: i64,
    pub tier: String,
    pub scans_used: i32,
    pub scans_limit: i32,
    pub free_scan_used: bool,
    pub whitelisted: bool,
    pub updated_at: DateTime<Utc>,
}

/// Fetch the subscription for a brand, or `None` if it has never been set.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_subscription(
    pool: &PgPool,
    brand_id: i64,
) -> Result<Option<SubscriptionRow>, DbError> {
    let row = sqlx::query_as::<_, SubscriptionRow>(
        "SELECT brand_id, tier, scans_used, scans_limit, free_scan_used, whitelisted, updated_at \
         FROM subscriptions \
         WHERE brand_id = $1",
    )
    .bind(brand_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Create or update a brand's subscription tier and scan allowance.
///
/// Usage counters are preserved on update; changing tiers never forgives
/// scans already consumed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_subscription(
    pool: &PgPool,
    brand_id: i64,
    tier: &str,
    scans_limit: i32,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO subscriptions (brand_id, tier, scans_limit) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (brand_id) DO UPDATE \
         SET tier = EXCLUDED.tier, scans_limit = EXCLUDED.scans_limit, updated_at = now()",
    )
    .bind(brand_id)
    .bind(tier)
    .bind(scans_limit)
    .execute(pool)
    .await?;
    Ok(())
}

/// Consume one scan for a brand: bumps `scans_used` and latches
/// `free_scan_used` for free-tier rows. Inserts the row if absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn record_scan_usage(pool: &PgPool, brand_id: i64) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO subscriptions (brand_id, scans_used, free_scan_used) \
         VALUES ($1, 1, TRUE) \
         ON CONFLICT (brand_id) DO UPDATE \
         SET scans_used = subscriptions.scans_used + 1, \
             free_scan_used = subscriptions.free_scan_used OR subscriptions.tier = 'free', \
             updated_at = now()",
    )
    .bind(brand_id)
    .execute(pool)
    .await?;
    Ok(())
}
