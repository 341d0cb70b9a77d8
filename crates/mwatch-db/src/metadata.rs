//! Single-value scan metadata stored in `scan_metadata`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

const LAST_SCAN_KEY: &str = "last_scan";

/// Record when the last scan finished.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn set_last_scan(pool: &PgPool, at: DateTime<Utc>) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO scan_metadata (key, value) VALUES ($1, $2) \
         ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
    )
    .bind(LAST_SCAN_KEY)
    .bind(at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Read the last scan timestamp, `None` before the first scan.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_last_scan(pool: &PgPool) -> Result<Option<DateTime<Utc>>, DbError> {
    let value = sqlx::query_scalar::<_, DateTime<Utc>>(
        "SELECT value FROM scan_metadata WHERE key = $1",
    )
    .bind(LAST_SCAN_KEY)
    .fetch_optional(pool)
    .await?;
    Ok(value)
}
