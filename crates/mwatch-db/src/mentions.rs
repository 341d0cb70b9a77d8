//! Database operations for the `mentions` table.

use chrono::{DateTime, Duration, Utc};
use mwatch_core::{EntityType, Mention, Sentiment};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{missing_parent_as_not_found, DbError};

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `mentions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MentionRow {
    pub id: Uuid,
    pub entity_id: Uuid,
    pub entity_name: String,
    pub entity_type: String,
    pub source: String,
    pub platform: String,
    pub author: String,
    pub content: String,
    pub full_text: String,
    pub url: String,
    pub sentiment: String,
    pub sentiment_score: i16,
    pub published_at: DateTime<Utc>,
    pub collected_at: DateTime<Utc>,
    pub tags: Vec<String>,
}

fn corrupt(reason: impl ToString) -> DbError {
    DbError::CorruptRow {
        table: "mentions",
        reason: reason.to_string(),
    }
}

impl TryFrom<MentionRow> for Mention {
    type Error = DbError;

    fn try_from(row: MentionRow) -> Result<Self, Self::Error> {
        Ok(Mention {
            id: row.id,
            entity_id: row.entity_id,
            entity_name: row.entity_name,
            entity_type: row.entity_type.parse::<EntityType>().map_err(corrupt)?,
            source: row.source,
            platform: row.platform,
            author: row.author,
            content: row.content,
            full_text: row.full_text,
            url: row.url,
            sentiment: row.sentiment.parse::<Sentiment>().map_err(corrupt)?,
            sentiment_score: u8::try_from(row.sentiment_score).map_err(corrupt)?,
            published_at: row.published_at,
            collected_at: row.collected_at,
            tags: row.tags,
        })
    }
}

const MENTION_COLUMNS: &str = "id, entity_id, entity_name, entity_type, source, platform, \
     author, content, full_text, url, sentiment, sentiment_score, published_at, \
     collected_at, tags";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert a mention that expires `ttl` after now.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if `entity_id` does not reference an entity,
/// or [`DbError::Sqlx`] if the insert otherwise fails.
pub async fn insert_mention(pool: &PgPool, mention: &Mention, ttl: Duration) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO mentions \
             (id, entity_id, entity_name, entity_type, source, platform, author, content, \
              full_text, url, sentiment, sentiment_score, published_at, collected_at, tags, \
              expires_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
    )
    .bind(mention.id)
    .bind(mention.entity_id)
    .bind(&mention.entity_name)
    .bind(mention.entity_type.as_str())
    .bind(&mention.source)
    .bind(&mention.platform)
    .bind(&mention.author)
    .bind(&mention.content)
    .bind(&mention.full_text)
    .bind(&mention.url)
    .bind(mention.sentiment.as_str())
    .bind(i16::from(mention.sentiment_score))
    .bind(mention.published_at)
    .bind(mention.collected_at)
    .bind(&mention.tags)
    .bind(Utc::now() + ttl)
    .execute(pool)
    .await
    .map_err(missing_parent_as_not_found)?;

    Ok(())
}

/// Latest unexpired mention per URL for one entity, newest `published_at`
/// first. Deduplication happens before the limit is applied.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_mentions_by_entity(
    pool: &PgPool,
    entity_id: Uuid,
    limit: i64,
) -> Result<Vec<Mention>, DbError> {
    let rows = sqlx::query_as::<_, MentionRow>(&format!(
        "SELECT {MENTION_COLUMNS} FROM ( \
             SELECT DISTINCT ON (url) {MENTION_COLUMNS} \
             FROM mentions \
             WHERE entity_id = $1 AND expires_at > NOW() \
             ORDER BY url, collected_at DESC \
         ) latest \
         ORDER BY published_at DESC, collected_at DESC \
         LIMIT $2"
    ))
    .bind(entity_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Mention::try_from).collect()
}

/// Latest unexpired mention per URL across all entities, published at or
/// after `since`, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_mentions(
    pool: &PgPool,
    since: DateTime<Utc>,
) -> Result<Vec<Mention>, DbError> {
    let rows = sqlx::query_as::<_, MentionRow>(&format!(
        "SELECT {MENTION_COLUMNS} FROM ( \
             SELECT DISTINCT ON (url) {MENTION_COLUMNS} \
             FROM mentions \
             WHERE published_at >= $1 AND expires_at > NOW() \
             ORDER BY url, collected_at DESC \
         ) latest \
         ORDER BY published_at DESC, collected_at DESC"
    ))
    .bind(since)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Mention::try_from).collect()
}

/// Delete mentions whose TTL has elapsed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_expired_mentions(pool: &PgPool) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM mentions WHERE expires_at <= NOW()")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
