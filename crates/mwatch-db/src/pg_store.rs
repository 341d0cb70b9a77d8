use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mwatch_core::{CompanyInsight, Entity, Mention, NewEntity};
use sqlx::PgPool;
use uuid::Uuid;

use crate::store::{window_start, MentionStore};
use crate::{entities, insights, mentions, metadata, DbError};

/// [`MentionStore`] backed by Postgres. TTL is enforced through `expires_at`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
    ttl: Duration,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool, ttl: Duration) -> Self {
        Self { pool, ttl }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl MentionStore for PgStore {
    async fn create_entity(&self, input: NewEntity) -> Result<Entity, DbError> {
        entities::insert_entity(&self.pool, input).await
    }

    async fn get_entity(&self, id: Uuid) -> Result<Option<Entity>, DbError> {
        entities::get_entity(&self.pool, id).await
    }

    async fn get_all_entities(&self) -> Result<Vec<Entity>, DbError> {
        entities::list_entities(&self.pool).await
    }

    async fn set_entity_enabled(&self, id: Uuid, enabled: bool) -> Result<Entity, DbError> {
        entities::set_entity_enabled(&self.pool, id, enabled).await
    }

    async fn delete_entity(&self, id: Uuid) -> Result<(), DbError> {
        entities::delete_entity(&self.pool, id).await
    }

    async fn create_mention(&self, mention: &Mention) -> Result<(), DbError> {
        mentions::insert_mention(&self.pool, mention, self.ttl).await
    }

    async fn get_mentions_by_entity(
        &self,
        entity_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Mention>, DbError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        mentions::list_mentions_by_entity(&self.pool, entity_id, limit).await
    }

    async fn get_recent_mentions(&self, hours: u32) -> Result<Vec<Mention>, DbError> {
        let since = window_start(Utc::now(), hours);
        mentions::list_recent_mentions(&self.pool, since).await
    }

    async fn create_insight(&self, insight: &CompanyInsight) -> Result<(), DbError> {
        insights::insert_insight(&self.pool, insight, self.ttl).await
    }

    async fn get_insights_by_company(
        &self,
        entity_id: Uuid,
    ) -> Result<Vec<CompanyInsight>, DbError> {
        insights::list_insights_by_entity(&self.pool, entity_id).await
    }

    async fn set_last_scan(&self, at: DateTime<Utc>) -> Result<(), DbError> {
        metadata::set_last_scan(&self.pool, at).await
    }

    async fn get_last_scan(&self) -> Result<Option<DateTime<Utc>>, DbError> {
        metadata::get_last_scan(&self.pool).await
    }

    async fn clear_all_mentions(&self) -> Result<(), DbError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM company_insights")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM mentions").execute(&mut *tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, DbError> {
        let mentions = mentions::delete_expired_mentions(&self.pool).await?;
        let insights = insights::delete_expired_insights(&self.pool).await?;
        Ok(mentions + insights)
    }

    async fn health_check(&self) -> Result<(), DbError> {
        crate::ping(&self.pool).await?;
        Ok(())
    }
}
