//! Storage contract shared by the Postgres and in-memory backends.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mwatch_core::{CompanyInsight, Entity, Mention, NewEntity};
use uuid::Uuid;

use crate::DbError;

/// Persistence for entities, mentions, insights and scan metadata.
///
/// Mentions and insights expire after the store's TTL and are invisible to
/// every read once expired, whether or not they have been purged yet.
#[async_trait]
pub trait MentionStore: Send + Sync {
    /// Insert a new enabled entity.
    ///
    /// Fails with [`mwatch_core::CoreError::DuplicateEntity`] (wrapped in
    /// [`DbError::Validation`]) when the same name and type already exist,
    /// compared case-insensitively.
    async fn create_entity(&self, input: NewEntity) -> Result<Entity, DbError>;

    async fn get_entity(&self, id: Uuid) -> Result<Option<Entity>, DbError>;

    /// All entities, oldest first.
    async fn get_all_entities(&self) -> Result<Vec<Entity>, DbError>;

    /// Returns [`DbError::NotFound`] for an unknown id.
    async fn set_entity_enabled(&self, id: Uuid, enabled: bool) -> Result<Entity, DbError>;

    /// Delete an entity together with its mentions and insights.
    ///
    /// Returns [`DbError::NotFound`] for an unknown id.
    async fn delete_entity(&self, id: Uuid) -> Result<(), DbError>;

    /// Fails with [`DbError::NotFound`] when the mention's entity no longer
    /// exists.
    async fn create_mention(&self, mention: &Mention) -> Result<(), DbError>;

    /// Up to `limit` mentions for one entity, newest `published_at` first,
    /// one per URL (latest `collected_at` wins).
    async fn get_mentions_by_entity(
        &self,
        entity_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Mention>, DbError>;

    /// Mentions across all entities published within the trailing `hours`,
    /// one per URL (latest `collected_at` wins), newest first.
    async fn get_recent_mentions(&self, hours: u32) -> Result<Vec<Mention>, DbError>;

    /// Fails with [`DbError::NotFound`] when the insight's entity no longer
    /// exists.
    async fn create_insight(&self, insight: &CompanyInsight) -> Result<(), DbError>;

    /// Insights for one company, newest first.
    async fn get_insights_by_company(
        &self,
        entity_id: Uuid,
    ) -> Result<Vec<CompanyInsight>, DbError>;

    async fn set_last_scan(&self, at: DateTime<Utc>) -> Result<(), DbError>;

    async fn get_last_scan(&self) -> Result<Option<DateTime<Utc>>, DbError>;

    /// Remove every mention and insight. Entities are kept.
    async fn clear_all_mentions(&self) -> Result<(), DbError>;

    /// Physically remove expired mentions and insights; returns rows removed.
    async fn purge_expired(&self) -> Result<u64, DbError>;

    async fn health_check(&self) -> Result<(), DbError>;
}

/// Longest trailing window a read will honour: ten years.
pub const MAX_WINDOW_HOURS: u32 = 24 * 366 * 10;

/// Start of a trailing window of `hours` ending at `now`. Windows longer than
/// [`MAX_WINDOW_HOURS`] are capped.
#[must_use]
pub fn window_start(now: DateTime<Utc>, hours: u32) -> DateTime<Utc> {
    now - Duration::hours(i64::from(hours.min(MAX_WINDOW_HOURS)))
}

/// Collapse mentions sharing a URL to the one with the latest `collected_at`,
/// then order by `published_at` descending.
#[must_use]
pub fn dedupe_latest(mentions: Vec<Mention>) -> Vec<Mention> {
    let mut latest: HashMap<String, Mention> = HashMap::with_capacity(mentions.len());
    for mention in mentions {
        match latest.get(&mention.url) {
            Some(existing) if existing.collected_at >= mention.collected_at => {}
            _ => {
                latest.insert(mention.url.clone(), mention);
            }
        }
    }

    let mut out: Vec<Mention> = latest.into_values().collect();
    out.sort_by(|a, b| {
        b.published_at
            .cmp(&a.published_at)
            .then_with(|| b.collected_at.cmp(&a.collected_at))
    });
    out
}
