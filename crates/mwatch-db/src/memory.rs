//! Process-local [`MentionStore`], used when no database is configured and in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mwatch_core::{CompanyInsight, CoreError, Entity, Mention, NewEntity};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{dedupe_latest, window_start, MentionStore};
use crate::DbError;

#[derive(Debug, Clone)]
struct Expiring<T> {
    value: T,
    expires_at: DateTime<Utc>,
}

impl<T> Expiring<T> {
    fn live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

#[derive(Debug, Default)]
struct Inner {
    entities: Vec<Entity>,
    mentions: HashMap<Uuid, Expiring<Mention>>,
    insights: Vec<Expiring<CompanyInsight>>,
    last_scan: Option<DateTime<Utc>>,
}

/// In-memory store. Expired records are hidden on read and dropped by
/// [`MentionStore::purge_expired`].
#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
    ttl: Duration,
}

impl MemoryStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            ttl,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Duration::days(7))
    }
}

#[async_trait]
impl MentionStore for MemoryStore {
    async fn create_entity(&self, input: NewEntity) -> Result<Entity, DbError> {
        let mut inner = self.inner.write().await;
        let lower = input.name.to_lowercase();
        if inner
            .entities
            .iter()
            .any(|e| e.entity_type == input.entity_type && e.name.to_lowercase() == lower)
        {
            return Err(DbError::Validation(CoreError::DuplicateEntity {
                name: input.name,
                entity_type: input.entity_type,
            }));
        }
        let entity = Entity::new(input);
        inner.entities.push(entity.clone());
        Ok(entity)
    }

    async fn get_entity(&self, id: Uuid) -> Result<Option<Entity>, DbError> {
        let inner = self.inner.read().await;
        Ok(inner.entities.iter().find(|e| e.id == id).cloned())
    }

    async fn get_all_entities(&self) -> Result<Vec<Entity>, DbError> {
        Ok(self.inner.read().await.entities.clone())
    }

    async fn set_entity_enabled(&self, id: Uuid, enabled: bool) -> Result<Entity, DbError> {
        let mut inner = self.inner.write().await;
        let entity = inner
            .entities
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(DbError::NotFound)?;
        entity.enabled = enabled;
        Ok(entity.clone())
    }

    async fn delete_entity(&self, id: Uuid) -> Result<(), DbError> {
        let mut inner = self.inner.write().await;
        let before = inner.entities.len();
        inner.entities.retain(|e| e.id != id);
        if inner.entities.len() == before {
            return Err(DbError::NotFound);
        }
        inner.mentions.retain(|_, m| m.value.entity_id != id);
        inner.insights.retain(|i| i.value.entity_id != id);
        Ok(())
    }

    async fn create_mention(&self, mention: &Mention) -> Result<(), DbError> {
        let mut inner = self.inner.write().await;
        if !inner.entities.iter().any(|e| e.id == mention.entity_id) {
            return Err(DbError::NotFound);
        }
        inner.mentions.insert(
            mention.id,
            Expiring {
                value: mention.clone(),
                expires_at: Utc::now() + self.ttl,
            },
        );
        Ok(())
    }

    async fn get_mentions_by_entity(
        &self,
        entity_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Mention>, DbError> {
        let now = Utc::now();
        let inner = self.inner.read().await;
        let candidates = inner
            .mentions
            .values()
            .filter(|m| m.live(now) && m.value.entity_id == entity_id)
            .map(|m| m.value.clone())
            .collect();
        let mut out = dedupe_latest(candidates);
        out.truncate(limit);
        Ok(out)
    }

    async fn get_recent_mentions(&self, hours: u32) -> Result<Vec<Mention>, DbError> {
        let now = Utc::now();
        let since = window_start(now, hours);
        let inner = self.inner.read().await;
        let candidates = inner
            .mentions
            .values()
            .filter(|m| m.live(now) && m.value.published_at >= since)
            .map(|m| m.value.clone())
            .collect();
        Ok(dedupe_latest(candidates))
    }

    async fn create_insight(&self, insight: &CompanyInsight) -> Result<(), DbError> {
        let mut inner = self.inner.write().await;
        if !inner.entities.iter().any(|e| e.id == insight.entity_id) {
            return Err(DbError::NotFound);
        }
        inner.insights.push(Expiring {
            value: insight.clone(),
            expires_at: Utc::now() + self.ttl,
        });
        Ok(())
    }

    async fn get_insights_by_company(
        &self,
        entity_id: Uuid,
    ) -> Result<Vec<CompanyInsight>, DbError> {
        let now = Utc::now();
        let inner = self.inner.read().await;
        // Stored in insertion order; newest first on read.
        Ok(inner
            .insights
            .iter()
            .rev()
            .filter(|i| i.live(now) && i.value.entity_id == entity_id)
            .map(|i| i.value.clone())
            .collect())
    }

    async fn set_last_scan(&self, at: DateTime<Utc>) -> Result<(), DbError> {
        self.inner.write().await.last_scan = Some(at);
        Ok(())
    }

    async fn get_last_scan(&self) -> Result<Option<DateTime<Utc>>, DbError> {
        Ok(self.inner.read().await.last_scan)
    }

    async fn clear_all_mentions(&self) -> Result<(), DbError> {
        let mut inner = self.inner.write().await;
        inner.mentions.clear();
        inner.insights.clear();
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, DbError> {
        let now = Utc::now();
        let mut inner = self.inner.write().await;
        let before = inner.mentions.len() + inner.insights.len();
        inner.mentions.retain(|_, m| m.live(now));
        inner.insights.retain(|i| i.live(now));
        let removed = before - (inner.mentions.len() + inner.insights.len());
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }

    async fn health_check(&self) -> Result<(), DbError> {
        Ok(())
    }
}
