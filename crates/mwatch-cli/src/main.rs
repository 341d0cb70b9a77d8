mod entity;
mod scan;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use mwatch_core::AppConfig;
use mwatch_db::{MentionStore, PgStore};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::entity::EntityCommands;

#[derive(Debug, Parser)]
#[command(name = "mwatch-cli")]
#[command(about = "Entity mention watcher command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Manage tracked keywords and companies
    Entity {
        #[command(subcommand)]
        command: EntityCommands,
    },
    /// Run one scan over every enabled entity
    Scan {
        /// Collect and print what would be stored without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// List stored mentions
    Mentions {
        /// Restrict to one entity
        #[arg(long)]
        entity: Option<Uuid>,

        /// Trailing window in hours (default: dashboard window)
        #[arg(long)]
        hours: Option<u32>,

        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Export mentions as CSV or JSON
    Export {
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Restrict to one entity
        #[arg(long)]
        entity: Option<Uuid>,

        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Delete all mentions and insights, keeping entities
    Clear,
    /// Query every configured source for a keyword and report what comes back
    Probe { keyword: String },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    Migrate,
    Ping,
    /// Insert entities from the entities YAML file
    Seed {
        /// Override `MWATCH_ENTITIES_PATH`
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    let config = mwatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        println!("mwatch-cli ready; run with --help for commands");
        return Ok(());
    };

    match command {
        Commands::Db { command } => run_db(&config, command).await,
        Commands::Entity { command } => {
            let store = open_store(&config).await?;
            entity::run_entity(store.as_ref(), command).await
        }
        Commands::Scan { dry_run } => {
            if dry_run {
                scan::run_dry_scan(&config).await
            } else {
                let store = open_store(&config).await?;
                scan::run_scan(&config, store).await
            }
        }
        Commands::Mentions {
            entity,
            hours,
            limit,
        } => {
            let store = open_store(&config).await?;
            scan::run_list_mentions(&config, store.as_ref(), entity, hours, limit).await
        }
        Commands::Export {
            format,
            entity,
            out,
        } => {
            let store = open_store(&config).await?;
            scan::run_export(&config, store.as_ref(), format, entity, out.as_deref()).await
        }
        Commands::Clear => {
            let store = open_store(&config).await?;
            store.clear_all_mentions().await?;
            println!("all mentions and insights cleared; entities kept");
            Ok(())
        }
        Commands::Probe { keyword } => scan::run_probe(&config, &keyword).await,
    }
}

async fn run_db(config: &AppConfig, command: DbCommands) -> anyhow::Result<()> {
    let pool = mwatch_db::connect_from_config(config).await?;
    match command {
        DbCommands::Migrate => {
            let applied = mwatch_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        DbCommands::Ping => {
            mwatch_db::ping(&pool).await?;
            println!("database reachable");
        }
        DbCommands::Seed { file } => {
            let path = file.unwrap_or_else(|| config.entities_path.clone());
            let entities = mwatch_core::load_entities(&path)?;
            let store = PgStore::new(pool, config.mention_ttl());
            let report = mwatch_db::seed_entities(&store, &entities.entities).await?;
            println!(
                "seeded {} from {}: {} created, {} already present",
                entities.entities.len(),
                path.display(),
                report.created,
                report.existing
            );
        }
    }
    Ok(())
}

/// The CLI always works against Postgres; an in-memory store would not
/// survive the process.
async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn MentionStore>> {
    let pool = mwatch_db::connect_from_config(config).await?;
    tracing::debug!(env = %config.env, "connected to database");
    Ok(Arc::new(PgStore::new(pool, config.mention_ttl())))
}

#[cfg(test)]
mod tests;
