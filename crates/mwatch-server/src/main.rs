mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use mwatch_collect::{build_http_client, Scanner, SourceRegistry};
use mwatch_core::AppConfig;
use mwatch_db::{MemoryStore, MentionStore, PgStore};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, default_rate_limit_state, AppState, RouteSecrets};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(mwatch_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let store = open_store(&config).await?;

    let client = build_http_client(&config)?;
    let registry = Arc::new(SourceRegistry::from_config(&config, &client));
    tracing::info!(sources = ?registry.names(), "collectors registered");
    let scanner = Scanner::new(Arc::clone(&store), registry, config.ingest_window());

    let _scheduler = scheduler::build_scheduler(scanner.clone(), config.scan_cron.as_deref()).await?;

    let secrets = RouteSecrets::from_config(&config);
    if !secrets.scan.enabled() {
        tracing::warn!("SCAN_PASSWORD not set; scan and clear endpoints are unauthenticated");
    }
    let state = AppState {
        store,
        scanner,
        config: Arc::clone(&config),
    };
    let app = build_app(state, secrets, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Postgres when `DATABASE_URL` is set, otherwise an in-memory store seeded
/// from the entities file.
async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn MentionStore>> {
    if config.database_url.is_some() {
        let pool = mwatch_db::connect_from_config(config).await?;
        mwatch_db::run_migrations(&pool).await?;
        return Ok(Arc::new(PgStore::new(pool, config.mention_ttl())));
    }

    tracing::warn!("DATABASE_URL not set; using in-memory store (data is lost on restart)");
    let store = Arc::new(MemoryStore::new(config.mention_ttl()));
    match mwatch_core::load_entities(&config.entities_path) {
        Ok(file) => {
            let report = mwatch_db::seed_entities(store.as_ref(), &file.entities).await?;
            tracing::info!(
                created = report.created,
                existing = report.existing,
                "seeded entities"
            );
        }
        Err(e) => tracing::warn!(
            path = %config.entities_path.display(),
            error = %e,
            "entities file not loaded; starting empty"
        ),
    }
    Ok(store)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
