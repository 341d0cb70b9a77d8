//! Store-contract tests run against the in-memory backend.

use chrono::{Duration, Utc};
use mwatch_core::{
    CompanyInsight, CoreError, Entity, EntityConfig, EntityType, InsightCategory, Mention,
    NewEntity, Sentiment,
};
use mwatch_db::{seed_entities, DbError, MemoryStore, MentionStore};
use uuid::Uuid;

fn new_entity(name: &str, entity_type: EntityType) -> NewEntity {
    NewEntity {
        name: name.to_string(),
        entity_type,
    }
}

fn mention_for(entity: &Entity, url: &str, published_ago: Duration, collected_ago: Duration) -> Mention {
    let now = Utc::now();
    Mention {
        id: Uuid::new_v4(),
        entity_id: entity.id,
        entity_name: entity.name.clone(),
        entity_type: entity.entity_type,
        source: "GitHub".to_string(),
        platform: "acme/widgets".to_string(),
        author: "octocat".to_string(),
        content: "content".to_string(),
        full_text: "content".to_string(),
        url: url.to_string(),
        sentiment: Sentiment::Neutral,
        sentiment_score: 50,
        published_at: now - published_ago,
        collected_at: now - collected_ago,
        tags: vec![entity.name.to_lowercase()],
    }
}

#[tokio::test]
async fn create_entity_rejects_case_insensitive_duplicate() {
    let store = MemoryStore::default();
    store
        .create_entity(new_entity("Acme", EntityType::Company))
        .await
        .unwrap();

    let err = store
        .create_entity(new_entity("ACME", EntityType::Company))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DbError::Validation(CoreError::DuplicateEntity { .. })
    ));

    // Same name under another type is a distinct entity.
    store
        .create_entity(new_entity("acme", EntityType::Keyword))
        .await
        .unwrap();
    assert_eq!(store.get_all_entities().await.unwrap().len(), 2);
}

#[tokio::test]
async fn mentions_by_entity_keep_latest_collection_per_url() {
    let store = MemoryStore::default();
    let entity = store
        .create_entity(new_entity("rust", EntityType::Keyword))
        .await
        .unwrap();

    let older = mention_for(&entity, "https://x/1", Duration::hours(2), Duration::hours(1));
    let newer = mention_for(&entity, "https://x/1", Duration::hours(2), Duration::minutes(1));
    store.create_mention(&newer).await.unwrap();
    store.create_mention(&older).await.unwrap();

    let got = store.get_mentions_by_entity(entity.id, 100).await.unwrap();
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].id, newer.id);
}

#[tokio::test]
async fn mentions_by_entity_dedupe_before_limit() {
    let store = MemoryStore::default();
    let entity = store
        .create_entity(new_entity("rust", EntityType::Keyword))
        .await
        .unwrap();

    for _ in 0..3 {
        let m = mention_for(&entity, "https://dup", Duration::minutes(5), Duration::minutes(1));
        store.create_mention(&m).await.unwrap();
    }
    let other = mention_for(&entity, "https://other", Duration::hours(1), Duration::minutes(1));
    store.create_mention(&other).await.unwrap();

    let got = store.get_mentions_by_entity(entity.id, 2).await.unwrap();
    let urls: Vec<&str> = got.iter().map(|m| m.url.as_str()).collect();
    assert_eq!(urls, vec!["https://dup", "https://other"]);
}

#[tokio::test]
async fn recent_mentions_respect_window_across_entities() {
    let store = MemoryStore::default();
    let a = store
        .create_entity(new_entity("rust", EntityType::Keyword))
        .await
        .unwrap();
    let b = store
        .create_entity(new_entity("Acme", EntityType::Company))
        .await
        .unwrap();

    store
        .create_mention(&mention_for(&a, "https://a", Duration::hours(1), Duration::zero()))
        .await
        .unwrap();
    store
        .create_mention(&mention_for(&b, "https://b", Duration::hours(3), Duration::zero()))
        .await
        .unwrap();
    store
        .create_mention(&mention_for(&b, "https://stale", Duration::hours(72), Duration::zero()))
        .await
        .unwrap();

    let got = store.get_recent_mentions(48).await.unwrap();
    let urls: Vec<&str> = got.iter().map(|m| m.url.as_str()).collect();
    assert_eq!(urls, vec!["https://a", "https://b"]);
}

#[tokio::test]
async fn recent_mentions_accept_oversized_window() {
    let store = MemoryStore::default();
    let entity = store
        .create_entity(new_entity("rust", EntityType::Keyword))
        .await
        .unwrap();
    store
        .create_mention(&mention_for(&entity, "https://old", Duration::days(400), Duration::zero()))
        .await
        .unwrap();

    let got = store.get_recent_mentions(u32::MAX).await.unwrap();
    assert_eq!(got.len(), 1);
}

#[tokio::test]
async fn mention_for_unknown_entity_is_not_found() {
    let store = MemoryStore::default();
    let ghost = Entity::new(new_entity("ghost", EntityType::Keyword));

    let err = store
        .create_mention(&mention_for(&ghost, "https://ghost", Duration::hours(1), Duration::zero()))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::NotFound));
}

#[tokio::test]
async fn delete_entity_cascades_to_mentions_and_insights() {
    let store = MemoryStore::default();
    let entity = store
        .create_entity(new_entity("Acme", EntityType::Company))
        .await
        .unwrap();
    let mention = mention_for(&entity, "https://acme", Duration::hours(1), Duration::zero());
    store.create_mention(&mention).await.unwrap();
    store
        .create_insight(&CompanyInsight::from_mention(&mention, InsightCategory::Culture))
        .await
        .unwrap();

    store.delete_entity(entity.id).await.unwrap();

    assert!(store.get_entity(entity.id).await.unwrap().is_none());
    assert!(store
        .get_mentions_by_entity(entity.id, 100)
        .await
        .unwrap()
        .is_empty());
    assert!(store
        .get_insights_by_company(entity.id)
        .await
        .unwrap()
        .is_empty());
    assert!(matches!(
        store.delete_entity(entity.id).await,
        Err(DbError::NotFound)
    ));
}

#[tokio::test]
async fn expired_records_are_hidden_and_purged() {
    let store = MemoryStore::new(Duration::zero());
    let entity = store
        .create_entity(new_entity("Acme", EntityType::Company))
        .await
        .unwrap();
    let mention = mention_for(&entity, "https://acme", Duration::hours(1), Duration::zero());
    store.create_mention(&mention).await.unwrap();
    store
        .create_insight(&CompanyInsight::from_mention(&mention, InsightCategory::Opinion))
        .await
        .unwrap();

    assert!(store
        .get_mentions_by_entity(entity.id, 10)
        .await
        .unwrap()
        .is_empty());
    assert!(store
        .get_insights_by_company(entity.id)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(store.purge_expired().await.unwrap(), 2);
    // Entities never expire.
    assert!(store.get_entity(entity.id).await.unwrap().is_some());
}

#[tokio::test]
async fn clear_all_mentions_keeps_entities() {
    let store = MemoryStore::default();
    let entity = store
        .create_entity(new_entity("rust", EntityType::Keyword))
        .await
        .unwrap();
    store
        .create_mention(&mention_for(&entity, "https://r", Duration::hours(1), Duration::zero()))
        .await
        .unwrap();

    store.clear_all_mentions().await.unwrap();

    assert!(store.get_recent_mentions(168).await.unwrap().is_empty());
    assert_eq!(store.get_all_entities().await.unwrap().len(), 1);
}

#[tokio::test]
async fn last_scan_round_trips() {
    let store = MemoryStore::default();
    assert!(store.get_last_scan().await.unwrap().is_none());
    let at = Utc::now();
    store.set_last_scan(at).await.unwrap();
    assert_eq!(store.get_last_scan().await.unwrap(), Some(at));
}

#[tokio::test]
async fn set_entity_enabled_unknown_id_is_not_found() {
    let store = MemoryStore::default();
    assert!(matches!(
        store.set_entity_enabled(Uuid::new_v4(), false).await,
        Err(DbError::NotFound)
    ));
}

#[tokio::test]
async fn seed_is_idempotent_and_honors_enabled_flag() {
    let store = MemoryStore::default();
    let configs = vec![
        EntityConfig {
            name: "rust".to_string(),
            entity_type: EntityType::Keyword,
            enabled: true,
        },
        EntityConfig {
            name: "Acme".to_string(),
            entity_type: EntityType::Company,
            enabled: false,
        },
    ];

    let first = seed_entities(&store, &configs).await.unwrap();
    assert_eq!(first.created, 2);
    assert_eq!(first.existing, 0);

    let second = seed_entities(&store, &configs).await.unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.existing, 2);

    let entities = store.get_all_entities().await.unwrap();
    let acme = entities.iter().find(|e| e.name == "Acme").unwrap();
    assert!(!acme.enabled);
}
