//! Scan controller tests with in-process fake collectors and the memory store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mwatch_collect::{
    collect_for_entity, probe_sources, CollectError, Collector, ScanError, ScanState, Scanner,
    SourceRegistry,
};
use mwatch_core::{CompanyInsight, Entity, EntityType, Mention, NewEntity, Sentiment};
use mwatch_db::{DbError, MemoryStore, MentionStore};
use uuid::Uuid;

/// Returns `per_entity` mentions for every entity, URLs unique per source.
struct FakeCollector {
    name: &'static str,
    per_entity: usize,
    text: &'static str,
    age: Duration,
}

impl FakeCollector {
    fn new(name: &'static str, per_entity: usize) -> Self {
        Self {
            name,
            per_entity,
            text: "a neutral note",
            age: Duration::hours(1),
        }
    }
}

fn mention(entity: &Entity, source: &str, url: String, text: &str, age: Duration) -> Mention {
    let now = Utc::now();
    Mention {
        id: Uuid::new_v4(),
        entity_id: entity.id,
        entity_name: entity.name.clone(),
        entity_type: entity.entity_type,
        source: source.to_string(),
        platform: "test".to_string(),
        author: "tester".to_string(),
        content: text.to_string(),
        full_text: text.to_string(),
        url,
        sentiment: Sentiment::Neutral,
        sentiment_score: 50,
        published_at: now - age,
        collected_at: now,
        tags: vec![entity.name.to_lowercase()],
    }
}

#[async_trait]
impl Collector for FakeCollector {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self, entity: &Entity) -> Result<Vec<Mention>, CollectError> {
        Ok((0..self.per_entity)
            .map(|i| {
                mention(
                    entity,
                    self.name,
                    format!("https://{}.test/{}/{i}", self.name, entity.name),
                    self.text,
                    self.age,
                )
            })
            .collect())
    }
}

struct FailingCollector;

#[async_trait]
impl Collector for FailingCollector {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn fetch(&self, _entity: &Entity) -> Result<Vec<Mention>, CollectError> {
        Err(CollectError::Status {
            source_name: "failing",
            status: 502,
        })
    }
}

struct PanickingCollector;

#[async_trait]
impl Collector for PanickingCollector {
    fn name(&self) -> &'static str {
        "panicking"
    }

    async fn fetch(&self, _entity: &Entity) -> Result<Vec<Mention>, CollectError> {
        panic!("collector bug");
    }
}

/// Deletes `target` from the store while its sources are running, then
/// returns mentions for it like any other collector.
struct DeletingCollector {
    store: Arc<MemoryStore>,
    target: Uuid,
}

#[async_trait]
impl Collector for DeletingCollector {
    fn name(&self) -> &'static str {
        "deleting"
    }

    async fn fetch(&self, entity: &Entity) -> Result<Vec<Mention>, CollectError> {
        if entity.id == self.target {
            self.store
                .delete_entity(entity.id)
                .await
                .expect("target exists");
        }
        Ok((0..2)
            .map(|i| {
                mention(
                    entity,
                    "deleting",
                    format!("https://deleting.test/{}/{i}", entity.name),
                    "a neutral note",
                    Duration::hours(1),
                )
            })
            .collect())
    }
}

/// Memory store whose `create_mention` starts failing after `allowed` writes.
struct FlakyStore {
    inner: MemoryStore,
    allowed: usize,
    writes: AtomicUsize,
}

impl FlakyStore {
    fn new(allowed: usize) -> Self {
        Self {
            inner: MemoryStore::default(),
            allowed,
            writes: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl MentionStore for FlakyStore {
    async fn create_entity(&self, input: NewEntity) -> Result<Entity, DbError> {
        self.inner.create_entity(input).await
    }

    async fn get_entity(&self, id: Uuid) -> Result<Option<Entity>, DbError> {
        self.inner.get_entity(id).await
    }

    async fn get_all_entities(&self) -> Result<Vec<Entity>, DbError> {
        self.inner.get_all_entities().await
    }

    async fn set_entity_enabled(&self, id: Uuid, enabled: bool) -> Result<Entity, DbError> {
        self.inner.set_entity_enabled(id, enabled).await
    }

    async fn delete_entity(&self, id: Uuid) -> Result<(), DbError> {
        self.inner.delete_entity(id).await
    }

    async fn create_mention(&self, mention: &Mention) -> Result<(), DbError> {
        if self.writes.fetch_add(1, Ordering::SeqCst) >= self.allowed {
            return Err(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        self.inner.create_mention(mention).await
    }

    async fn get_mentions_by_entity(
        &self,
        entity_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Mention>, DbError> {
        self.inner.get_mentions_by_entity(entity_id, limit).await
    }

    async fn get_recent_mentions(&self, hours: u32) -> Result<Vec<Mention>, DbError> {
        self.inner.get_recent_mentions(hours).await
    }

    async fn create_insight(&self, insight: &CompanyInsight) -> Result<(), DbError> {
        self.inner.create_insight(insight).await
    }

    async fn get_insights_by_company(
        &self,
        entity_id: Uuid,
    ) -> Result<Vec<CompanyInsight>, DbError> {
        self.inner.get_insights_by_company(entity_id).await
    }

    async fn set_last_scan(&self, at: DateTime<Utc>) -> Result<(), DbError> {
        self.inner.set_last_scan(at).await
    }

    async fn get_last_scan(&self) -> Result<Option<DateTime<Utc>>, DbError> {
        self.inner.get_last_scan().await
    }

    async fn clear_all_mentions(&self) -> Result<(), DbError> {
        self.inner.clear_all_mentions().await
    }

    async fn purge_expired(&self) -> Result<u64, DbError> {
        self.inner.purge_expired().await
    }

    async fn health_check(&self) -> Result<(), DbError> {
        self.inner.health_check().await
    }
}

fn new_entity(name: &str, entity_type: EntityType) -> NewEntity {
    NewEntity {
        name: name.to_string(),
        entity_type,
    }
}

fn scanner(store: Arc<dyn MentionStore>, collectors: Vec<Arc<dyn Collector>>) -> Scanner {
    Scanner::new(
        store,
        Arc::new(SourceRegistry::new(collectors)),
        Duration::days(7),
    )
}

#[tokio::test]
async fn failing_collector_does_not_block_scan() {
    let store = Arc::new(MemoryStore::default());
    let rust = store
        .create_entity(new_entity("rust", EntityType::Keyword))
        .await
        .unwrap();
    let go = store
        .create_entity(new_entity("golang", EntityType::Keyword))
        .await
        .unwrap();

    let scanner = scanner(
        store.clone(),
        vec![
            Arc::new(FakeCollector::new("alpha", 2)),
            Arc::new(FailingCollector),
            Arc::new(FakeCollector::new("beta", 1)),
            Arc::new(FakeCollector::new("gamma", 3)),
        ],
    );

    let result = scanner.run().await.expect("scan should complete");

    assert_eq!(result.entities_scanned, 2);
    assert_eq!(result.mentions_collected, 12);
    assert_eq!(result.sources, vec!["alpha", "beta", "gamma"]);
    assert_eq!(scanner.status().await.state, ScanState::Completed);

    for id in [rust.id, go.id] {
        let stored = store.get_mentions_by_entity(id, 50).await.unwrap();
        assert_eq!(stored.len(), 6);
    }
    assert_eq!(store.get_last_scan().await.unwrap(), Some(result.timestamp));
}

#[tokio::test]
async fn panicking_collector_is_isolated() {
    let store = Arc::new(MemoryStore::default());
    let rust = store
        .create_entity(new_entity("rust", EntityType::Keyword))
        .await
        .unwrap();
    let registry = SourceRegistry::new(vec![
        Arc::new(PanickingCollector),
        Arc::new(FakeCollector::new("alpha", 2)),
    ]);

    let mentions = collect_for_entity(&registry, &rust).await;
    assert_eq!(mentions.len(), 2);
}

#[tokio::test]
async fn disabled_entities_are_skipped() {
    let store = Arc::new(MemoryStore::default());
    store
        .create_entity(new_entity("rust", EntityType::Keyword))
        .await
        .unwrap();
    let off = store
        .create_entity(new_entity("cobol", EntityType::Keyword))
        .await
        .unwrap();
    store.set_entity_enabled(off.id, false).await.unwrap();

    let scanner = scanner(store.clone(), vec![Arc::new(FakeCollector::new("alpha", 1))]);
    let result = scanner.run().await.unwrap();

    assert_eq!(result.entities_scanned, 1);
    assert!(store
        .get_mentions_by_entity(off.id, 10)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn stale_mentions_are_filtered_before_persisting() {
    let store = Arc::new(MemoryStore::default());
    let rust = store
        .create_entity(new_entity("rust", EntityType::Keyword))
        .await
        .unwrap();
    let stale = FakeCollector {
        age: Duration::days(10),
        ..FakeCollector::new("old", 3)
    };

    let scanner = scanner(
        store.clone(),
        vec![Arc::new(stale), Arc::new(FakeCollector::new("fresh", 1))],
    );
    let result = scanner.run().await.unwrap();

    assert_eq!(result.mentions_collected, 1);
    assert_eq!(result.sources, vec!["fresh"]);
    assert_eq!(
        store.get_mentions_by_entity(rust.id, 10).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn company_mentions_produce_qualifying_insights() {
    let store = Arc::new(MemoryStore::default());
    let company = store
        .create_entity(new_entity("Acme", EntityType::Company))
        .await
        .unwrap();
    let keyword = store
        .create_entity(new_entity("acme-lib", EntityType::Keyword))
        .await
        .unwrap();
    let collector = FakeCollector {
        text: "Their culture and team values make the workplace great",
        ..FakeCollector::new("alpha", 2)
    };

    let scanner = scanner(store.clone(), vec![Arc::new(collector)]);
    scanner.run().await.unwrap();

    let insights = store.get_insights_by_company(company.id).await.unwrap();
    assert_eq!(insights.len(), 2);
    assert!(store
        .get_insights_by_company(keyword.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn deleting_entity_after_scan_removes_its_data() {
    let store = Arc::new(MemoryStore::default());
    let company = store
        .create_entity(new_entity("Acme", EntityType::Company))
        .await
        .unwrap();
    let scanner = scanner(store.clone(), vec![Arc::new(FakeCollector::new("alpha", 2))]);
    scanner.run().await.unwrap();
    assert!(!store
        .get_mentions_by_entity(company.id, 10)
        .await
        .unwrap()
        .is_empty());

    store.delete_entity(company.id).await.unwrap();

    assert!(store
        .get_mentions_by_entity(company.id, 10)
        .await
        .unwrap()
        .is_empty());
    assert!(store
        .get_insights_by_company(company.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn empty_scan_still_records_last_scan() {
    let store = Arc::new(MemoryStore::default());
    let scanner = scanner(store.clone(), vec![Arc::new(FakeCollector::new("alpha", 1))]);

    let result = scanner.run().await.unwrap();

    assert_eq!(result.entities_scanned, 0);
    assert_eq!(result.mentions_collected, 0);
    assert!(store.get_last_scan().await.unwrap().is_some());
}

#[tokio::test]
async fn probe_reports_every_source() {
    let registry = SourceRegistry::new(vec![
        Arc::new(FakeCollector::new("alpha", 2)),
        Arc::new(FailingCollector),
    ]);

    let reports = probe_sources(&registry, "rust").await;

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].source, "alpha");
    assert_eq!(reports[0].count, 2);
    assert!(reports[0].sample_url.is_some());
    assert_eq!(reports[1].source, "failing");
    assert!(reports[1].error.is_some());
}

#[tokio::test]
async fn entity_deleted_mid_scan_is_skipped() {
    let store = Arc::new(MemoryStore::default());
    let first = store
        .create_entity(new_entity("first", EntityType::Company))
        .await
        .unwrap();
    let second = store
        .create_entity(new_entity("second", EntityType::Keyword))
        .await
        .unwrap();

    let collector = DeletingCollector {
        store: store.clone(),
        target: first.id,
    };
    let scanner = scanner(store.clone(), vec![Arc::new(collector)]);

    let result = scanner.run().await.expect("deletion is not a store failure");

    assert_eq!(scanner.status().await.state, ScanState::Completed);
    assert_eq!(result.mentions_collected, 2);
    assert!(store.get_entity(first.id).await.unwrap().is_none());
    assert!(store
        .get_mentions_by_entity(first.id, 10)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        store.get_mentions_by_entity(second.id, 10).await.unwrap().len(),
        2
    );
    assert_eq!(store.get_last_scan().await.unwrap(), Some(result.timestamp));
}

#[tokio::test]
async fn store_failure_fails_scan_and_keeps_earlier_writes() {
    let store = Arc::new(FlakyStore::new(2));
    let rust = store
        .create_entity(new_entity("rust", EntityType::Keyword))
        .await
        .unwrap();
    let go = store
        .create_entity(new_entity("golang", EntityType::Keyword))
        .await
        .unwrap();

    let scanner = scanner(store.clone(), vec![Arc::new(FakeCollector::new("alpha", 3))]);

    let err = scanner.run().await.expect_err("third write fails");
    assert!(matches!(err, ScanError::Store(DbError::Sqlx(_))));

    let status = scanner.status().await;
    assert_eq!(status.state, ScanState::Failed);
    assert!(status.last_error.is_some());
    assert!(status.finished_at.is_some());

    assert_eq!(
        store.get_mentions_by_entity(rust.id, 10).await.unwrap().len(),
        2
    );
    assert!(store
        .get_mentions_by_entity(go.id, 10)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(store.get_last_scan().await.unwrap(), None);
}
