//! Scan, listing, export and probe commands.

use std::path::Path;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use mwatch_collect::{build_http_client, probe_sources, Scanner, SourceRegistry};
use mwatch_core::{mentions_to_csv, AppConfig, Entity, ExportBundle, Mention};
use mwatch_db::{MemoryStore, MentionStore};
use uuid::Uuid;

use crate::ExportFormat;

const ENTITY_EXPORT_LIMIT: usize = 10_000;

fn registry(config: &AppConfig) -> anyhow::Result<Arc<SourceRegistry>> {
    let client = build_http_client(config)?;
    Ok(Arc::new(SourceRegistry::from_config(config, &client)))
}

pub(crate) async fn run_scan(
    config: &AppConfig,
    store: Arc<dyn MentionStore>,
) -> anyhow::Result<()> {
    let scanner = Scanner::new(store, registry(config)?, config.ingest_window());
    let result = scanner.run().await?;
    println!(
        "scan complete: {} entities, {} mentions, sources [{}]",
        result.entities_scanned,
        result.mentions_collected,
        result.sources.join(", ")
    );
    Ok(())
}

/// Collect for every enabled entity from the entities file and print the
/// results without touching any store.
pub(crate) async fn run_dry_scan(config: &AppConfig) -> anyhow::Result<()> {
    let file = mwatch_core::load_entities(&config.entities_path)?;
    let scanner = Scanner::new(
        Arc::new(MemoryStore::new(config.mention_ttl())),
        registry(config)?,
        config.ingest_window(),
    );

    let mut total = 0;
    for cfg in file.entities.iter().filter(|e| e.enabled) {
        let entity = Entity::new(mwatch_core::NewEntity {
            name: cfg.name.clone(),
            entity_type: cfg.entity_type,
        });
        let mentions = scanner.preview_entity(&entity).await;
        println!(
            "dry-run: {} ({}) -> {} mention(s)",
            entity.name,
            entity.entity_type,
            mentions.len()
        );
        for m in mentions.iter().take(5) {
            println!("    {}", format_mention(m));
        }
        total += mentions.len();
    }
    println!("dry-run: {total} mention(s) would be stored");
    Ok(())
}

pub(crate) async fn run_list_mentions(
    config: &AppConfig,
    store: &dyn MentionStore,
    entity: Option<Uuid>,
    hours: Option<u32>,
    limit: usize,
) -> anyhow::Result<()> {
    let mentions = match entity {
        Some(id) => store.get_mentions_by_entity(id, limit).await?,
        None => {
            let hours = hours.unwrap_or(config.dashboard_window_hours);
            let mut recent = store.get_recent_mentions(hours).await?;
            recent.truncate(limit);
            recent
        }
    };

    if mentions.is_empty() {
        println!("no mentions found");
    }
    for m in &mentions {
        println!("{}", format_mention(m));
    }
    Ok(())
}

pub(crate) async fn run_export(
    config: &AppConfig,
    store: &dyn MentionStore,
    format: ExportFormat,
    entity: Option<Uuid>,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let mentions = match entity {
        Some(id) => store.get_mentions_by_entity(id, ENTITY_EXPORT_LIMIT).await?,
        None => store.get_recent_mentions(config.export_window_hours).await?,
    };
    let count = mentions.len();

    let body = match format {
        ExportFormat::Csv => mentions_to_csv(&mentions)?,
        ExportFormat::Json => {
            let entities = store.get_all_entities().await?;
            let mut insights = Vec::new();
            for e in entities.iter().filter(|e| e.is_company()) {
                insights.extend(store.get_insights_by_company(e.id).await?);
            }
            let bundle = ExportBundle {
                exported_at: Utc::now(),
                entities,
                mentions,
                insights,
            };
            serde_json::to_string_pretty(&bundle)?
        }
    };

    match out {
        Some(path) => {
            tokio::fs::write(path, body).await?;
            eprintln!("wrote {count} mention(s) to {}", path.display());
        }
        None => print!("{body}"),
    }
    Ok(())
}

pub(crate) async fn run_probe(config: &AppConfig, keyword: &str) -> anyhow::Result<()> {
    let reports = probe_sources(&*registry(config)?, keyword).await;
    for r in &reports {
        match &r.error {
            Some(err) => println!("{:<14} ERROR {err} ({} ms)", r.source, r.elapsed_ms),
            None => println!(
                "{:<14} {:>3} result(s) ({} ms) {}",
                r.source,
                r.count,
                r.elapsed_ms,
                r.sample_url.as_deref().unwrap_or("")
            ),
        }
    }
    Ok(())
}

fn format_mention(m: &Mention) -> String {
    format!(
        "{} [{} {:>3}] {} / {}: {}",
        m.published_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        m.sentiment,
        m.sentiment_score,
        m.source,
        m.entity_name,
        m.url
    )
}
