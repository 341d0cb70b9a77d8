//! Scan controller: one sequential pass over every enabled entity.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use mwatch_core::{CompanyInsight, Entity, Mention, ScanResult};
use mwatch_db::{DbError, MentionStore};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::ScanError;
use crate::filter::{dedupe, filter_recent};
use crate::insight::classify_insight;
use crate::orchestrator::collect_for_entity;
use crate::registry::SourceRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanState {
    Idle,
    Running,
    Completed,
    Failed,
}

/// Snapshot of the most recent scan in this process.
#[derive(Debug, Clone, Serialize)]
pub struct ScanStatus {
    pub state: ScanState,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub last_result: Option<ScanResult>,
    pub last_error: Option<String>,
}

impl Default for ScanStatus {
    fn default() -> Self {
        Self {
            state: ScanState::Idle,
            started_at: None,
            finished_at: None,
            last_result: None,
            last_error: None,
        }
    }
}

/// Per-entity counters folded into the [`ScanResult`].
struct EntityPass {
    stored: usize,
    sources: BTreeSet<String>,
}

#[derive(Clone)]
pub struct Scanner {
    store: Arc<dyn MentionStore>,
    registry: Arc<SourceRegistry>,
    ingest_window: Duration,
    status: Arc<RwLock<ScanStatus>>,
}

impl Scanner {
    #[must_use]
    pub fn new(
        store: Arc<dyn MentionStore>,
        registry: Arc<SourceRegistry>,
        ingest_window: Duration,
    ) -> Self {
        Self {
            store,
            registry,
            ingest_window,
            status: Arc::new(RwLock::new(ScanStatus::default())),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub async fn status(&self) -> ScanStatus {
        self.status.read().await.clone()
    }

    /// Run one full scan and record its outcome in [`Scanner::status`].
    ///
    /// Entities are processed one at a time; sources for a single entity
    /// run concurrently. Collector failures are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Store`] when persistence fails. Mentions written
    /// before the failure stay written.
    pub async fn run(&self) -> Result<ScanResult, ScanError> {
        let started_at = Utc::now();
        {
            let mut status = self.status.write().await;
            status.state = ScanState::Running;
            status.started_at = Some(started_at);
            status.finished_at = None;
            status.last_error = None;
        }
        tracing::info!(sources = ?self.registry.names(), "scan started");

        let outcome = self.scan_all().await;

        let mut status = self.status.write().await;
        status.finished_at = Some(Utc::now());
        match &outcome {
            Ok(result) => {
                status.state = ScanState::Completed;
                status.last_result = Some(result.clone());
                tracing::info!(
                    entities = result.entities_scanned,
                    mentions = result.mentions_collected,
                    sources = result.sources.len(),
                    "scan completed"
                );
            }
            Err(e) => {
                status.state = ScanState::Failed;
                status.last_error = Some(e.to_string());
                tracing::error!(error = %e, "scan failed");
            }
        }
        drop(status);

        outcome.map_err(ScanError::from)
    }

    async fn scan_all(&self) -> Result<ScanResult, DbError> {
        let purged = self.store.purge_expired().await?;
        if purged > 0 {
            tracing::debug!(purged, "expired records removed");
        }

        let entities: Vec<Entity> = self
            .store
            .get_all_entities()
            .await?
            .into_iter()
            .filter(|e| e.enabled)
            .collect();

        let mut mentions_collected = 0;
        let mut sources = BTreeSet::new();
        for entity in &entities {
            let pass = self.scan_entity(entity).await?;
            mentions_collected += pass.stored;
            sources.extend(pass.sources);
        }

        let timestamp = Utc::now();
        self.store.set_last_scan(timestamp).await?;

        Ok(ScanResult {
            entities_scanned: entities.len(),
            mentions_collected,
            sources: sources.into_iter().collect(),
            timestamp,
        })
    }

    async fn scan_entity(&self, entity: &Entity) -> Result<EntityPass, DbError> {
        let mentions = self.preview_entity(entity).await;
        let mut pass = EntityPass {
            stored: 0,
            sources: BTreeSet::new(),
        };

        for mention in &mentions {
            match self.store_mention(entity, mention).await {
                Ok(()) => {}
                // Entity deleted while its sources were running.
                Err(DbError::NotFound) => {
                    tracing::warn!(
                        entity = %entity.name,
                        entity_id = %entity.id,
                        stored = pass.stored,
                        "entity removed during scan; skipping remaining mentions"
                    );
                    return Ok(pass);
                }
                Err(e) => return Err(e),
            }
            pass.stored += 1;
            pass.sources.insert(mention.source.clone());
        }

        tracing::info!(entity = %entity.name, stored = pass.stored, "entity scanned");
        Ok(pass)
    }

    async fn store_mention(&self, entity: &Entity, mention: &Mention) -> Result<(), DbError> {
        self.store.create_mention(mention).await?;

        if entity.is_company() {
            let score = classify_insight(&mention.full_text);
            if score.qualifies() {
                let insight = CompanyInsight::from_mention(mention, score.category);
                self.store.create_insight(&insight).await?;
            }
        }
        Ok(())
    }

    /// Collect, dedupe and window-filter mentions for `entity` without
    /// persisting anything.
    pub async fn preview_entity(&self, entity: &Entity) -> Vec<Mention> {
        let collected = collect_for_entity(&self.registry, entity).await;
        filter_recent(dedupe(collected), self.ingest_window, Utc::now())
    }
}
