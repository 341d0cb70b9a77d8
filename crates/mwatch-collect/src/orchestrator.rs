//! Concurrent fan-out of one entity across every registered collector.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use mwatch_core::{Entity, EntityType, Mention, NewEntity};
use serde::Serialize;
use tokio::task::JoinSet;

use crate::error::CollectError;
use crate::registry::SourceRegistry;

/// Result of one collector for one entity.
#[derive(Debug)]
pub struct SourceOutcome {
    pub source: &'static str,
    pub result: Result<Vec<Mention>, CollectError>,
    pub elapsed: Duration,
}

/// Run every collector for `entity` concurrently and wait for all of them.
///
/// A collector that errors or panics contributes an `Err` outcome; the
/// others are unaffected.
pub async fn fetch_all(registry: &SourceRegistry, entity: &Entity) -> Vec<SourceOutcome> {
    let started = Instant::now();
    let mut set = JoinSet::new();
    let mut names: HashMap<tokio::task::Id, &'static str> = HashMap::new();

    for collector in registry.iter() {
        let collector = collector.clone();
        let entity = entity.clone();
        let name = collector.name();
        let handle = set.spawn(async move {
            let begun = Instant::now();
            let result = collector.fetch(&entity).await;
            (result, begun.elapsed())
        });
        names.insert(handle.id(), name);
    }

    let mut outcomes = Vec::with_capacity(names.len());
    while let Some(joined) = set.join_next_with_id().await {
        match joined {
            Ok((id, (result, elapsed))) => outcomes.push(SourceOutcome {
                source: names.get(&id).copied().unwrap_or("unknown"),
                result,
                elapsed,
            }),
            Err(join_err) => {
                let source_name = names.get(&join_err.id()).copied().unwrap_or("unknown");
                outcomes.push(SourceOutcome {
                    source: source_name,
                    result: Err(CollectError::Panicked { source_name }),
                    elapsed: started.elapsed(),
                });
            }
        }
    }
    outcomes
}

/// Concatenate every successful collector's mentions for `entity`.
///
/// Failures are logged with their source and dropped.
pub async fn collect_for_entity(registry: &SourceRegistry, entity: &Entity) -> Vec<Mention> {
    let mut mentions = Vec::new();
    for outcome in fetch_all(registry, entity).await {
        match outcome.result {
            Ok(found) => {
                tracing::debug!(
                    entity = %entity.name,
                    source = outcome.source,
                    count = found.len(),
                    "collected mentions"
                );
                mentions.extend(found);
            }
            Err(e) => tracing::warn!(
                entity = %entity.name,
                source = outcome.source,
                error = %e,
                "collector failed"
            ),
        }
    }
    mentions
}

/// Diagnostic result of querying one source for a keyword.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub source: String,
    pub count: usize,
    pub sample_url: Option<String>,
    pub sample_text: Option<String>,
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl From<SourceOutcome> for ProbeReport {
    fn from(outcome: SourceOutcome) -> Self {
        let elapsed_ms = u64::try_from(outcome.elapsed.as_millis()).unwrap_or(u64::MAX);
        match outcome.result {
            Ok(found) => Self {
                source: outcome.source.to_string(),
                count: found.len(),
                sample_url: found.first().map(|m| m.url.clone()),
                sample_text: found.first().map(|m| m.content.clone()),
                error: None,
                elapsed_ms,
            },
            Err(e) => Self {
                source: outcome.source.to_string(),
                count: 0,
                sample_url: None,
                sample_text: None,
                error: Some(e.to_string()),
                elapsed_ms,
            },
        }
    }
}

/// Query every source for `keyword` without persisting anything.
pub async fn probe_sources(registry: &SourceRegistry, keyword: &str) -> Vec<ProbeReport> {
    let entity = Entity::new(NewEntity {
        name: keyword.to_string(),
        entity_type: EntityType::Keyword,
    });
    let mut reports: Vec<ProbeReport> = fetch_all(registry, &entity)
        .await
        .into_iter()
        .map(ProbeReport::from)
        .collect();
    reports.sort_by(|a, b| a.source.cmp(&b.source));
    reports
}
