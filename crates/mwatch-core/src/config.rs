use crate::app_config::{AppConfig, Environment, SourceKind};
use crate::ConfigError;

const DEFAULT_SOURCES: &str = "hackernews,reddit,gdelt,github";
const DEFAULT_SCAN_CRON: &str = "0 0 */12 * * *";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it from a
/// plain `HashMap`.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    // Empty values are treated as unset so `.env` templates can leave
    // optional credentials blank.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default =
        |var: &str, default: &str| -> String { optional(var).unwrap_or_else(|| default.to_string()) };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_hours = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let hours = parse_u32(var, default)?;
        if hours == 0 {
            return Err(invalid(var, "window must be at least one hour".to_string()));
        }
        Ok(hours)
    };

    let database_url = optional("DATABASE_URL");
    let env = parse_environment(&or_default("MWATCH_ENV", "development"))?;

    let bind_addr = parse_addr("MWATCH_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("MWATCH_LOG_LEVEL", "info");
    let entities_path = PathBuf::from(or_default(
        "MWATCH_ENTITIES_PATH",
        "./config/entities.yaml",
    ));

    let db_max_connections = parse_u32("MWATCH_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("MWATCH_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("MWATCH_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let collector_timeout_secs = parse_u64("MWATCH_COLLECTOR_TIMEOUT_SECS", "15")?;
    if collector_timeout_secs == 0 {
        return Err(invalid(
            "MWATCH_COLLECTOR_TIMEOUT_SECS",
            "timeout must be positive".to_string(),
        ));
    }
    let collector_user_agent = or_default(
        "MWATCH_COLLECTOR_USER_AGENT",
        "mwatch/0.1 (mention-tracking)",
    );
    let sources = parse_sources(&or_default("MWATCH_SOURCES", DEFAULT_SOURCES))?;

    let ingest_window_hours = parse_hours("MWATCH_INGEST_WINDOW_HOURS", "168")?;
    let dashboard_window_hours = parse_hours("MWATCH_DASHBOARD_WINDOW_HOURS", "48")?;
    let export_window_hours = parse_hours("MWATCH_EXPORT_WINDOW_HOURS", "168")?;
    let mention_ttl_hours = parse_hours("MWATCH_MENTION_TTL_HOURS", "168")?;

    // Unset means the default schedule; an explicitly empty value disables it.
    let scan_cron = match lookup("MWATCH_SCAN_CRON") {
        Ok(raw) if raw.trim().is_empty() => None,
        Ok(raw) => Some(raw.trim().to_string()),
        Err(_) => Some(DEFAULT_SCAN_CRON.to_string()),
    };

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        entities_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        collector_timeout_secs,
        collector_user_agent,
        sources,
        ingest_window_hours,
        dashboard_window_hours,
        export_window_hours,
        mention_ttl_hours,
        scan_cron,
        scan_password: optional("SCAN_PASSWORD"),
        cron_secret: optional("CRON_SECRET"),
        github_token: optional("GITHUB_TOKEN"),
        bluesky_identifier: optional("BLUESKY_IDENTIFIER"),
        bluesky_app_password: optional("BLUESKY_APP_PASSWORD"),
        x_bearer_token: optional("X_BEARER_TOKEN").or_else(|| optional("TWITTER_BEARER_TOKEN")),
        google_api_key: optional("GOOGLE_API_KEY"),
        google_search_engine_id: optional("GOOGLE_SEARCH_ENGINE_ID"),
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "MWATCH_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Parse a comma-separated source list, dropping duplicates while keeping order.
fn parse_sources(raw: &str) -> Result<Vec<SourceKind>, ConfigError> {
    let mut sources = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let kind = part
            .parse::<SourceKind>()
            .map_err(|reason| ConfigError::InvalidEnvVar {
                var: "MWATCH_SOURCES".to_string(),
                reason,
            })?;
        if !sources.contains(&kind) {
            sources.push(kind);
        }
    }
    Ok(sources)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
