//! Database operations for the `company_insights` table.

use chrono::{DateTime, Duration, Utc};
use mwatch_core::{CompanyInsight, InsightCategory};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{missing_parent_as_not_found, DbError};

/// A row from the `company_insights` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InsightRow {
    pub id: Uuid,
    pub entity_id: Uuid,
    pub category: String,
    pub insight: String,
    pub evidence: Vec<Uuid>,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl TryFrom<InsightRow> for CompanyInsight {
    type Error = DbError;

    fn try_from(row: InsightRow) -> Result<Self, Self::Error> {
        let category = row
            .category
            .parse::<InsightCategory>()
            .map_err(|e| DbError::CorruptRow {
                table: "company_insights",
                reason: e.to_string(),
            })?;
        Ok(CompanyInsight {
            id: row.id,
            entity_id: row.entity_id,
            category,
            insight: row.insight,
            evidence: row.evidence,
            first_seen_at: row.first_seen_at,
            last_seen_at: row.last_seen_at,
        })
    }
}

/// Insert an insight that expires `ttl` after now.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if `entity_id` does not reference an entity,
/// or [`DbError::Sqlx`] if the insert otherwise fails.
pub async fn insert_insight(
    pool: &PgPool,
    insight: &CompanyInsight,
    ttl: Duration,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO company_insights \
             (id, entity_id, category, insight, evidence, first_seen_at, last_seen_at, expires_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(insight.id)
    .bind(insight.entity_id)
    .bind(insight.category.as_str())
    .bind(&insight.insight)
    .bind(&insight.evidence)
    .bind(insight.first_seen_at)
    .bind(insight.last_seen_at)
    .bind(Utc::now() + ttl)
    .execute(pool)
    .await
    .map_err(missing_parent_as_not_found)?;

    Ok(())
}

/// Unexpired insights for one company, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_insights_by_entity(
    pool: &PgPool,
    entity_id: Uuid,
) -> Result<Vec<CompanyInsight>, DbError> {
    let rows = sqlx::query_as::<_, InsightRow>(
        "SELECT id, entity_id, category, insight, evidence, first_seen_at, last_seen_at \
         FROM company_insights \
         WHERE entity_id = $1 AND expires_at > NOW() \
         ORDER BY created_at DESC, last_seen_at DESC",
    )
    .bind(entity_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(CompanyInsight::try_from).collect()
}

/// Delete insights whose TTL has elapsed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_expired_insights(pool: &PgPool) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM company_insights WHERE expires_at <= NOW()")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
