use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Identifies one external source collector. The key is what appears in
/// `MWATCH_SOURCES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    HackerNews,
    Reddit,
    Gdelt,
    GitHub,
    DevTo,
    Mastodon,
    Bluesky,
    X,
    LinkedIn,
    Rss,
}

impl SourceKind {
    pub const ALL: [SourceKind; 10] = [
        SourceKind::HackerNews,
        SourceKind::Reddit,
        SourceKind::Gdelt,
        SourceKind::GitHub,
        SourceKind::DevTo,
        SourceKind::Mastodon,
        SourceKind::Bluesky,
        SourceKind::X,
        SourceKind::LinkedIn,
        SourceKind::Rss,
    ];

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            SourceKind::HackerNews => "hackernews",
            SourceKind::Reddit => "reddit",
            SourceKind::Gdelt => "gdelt",
            SourceKind::GitHub => "github",
            SourceKind::DevTo => "devto",
            SourceKind::Mastodon => "mastodon",
            SourceKind::Bluesky => "bluesky",
            SourceKind::X => "x",
            SourceKind::LinkedIn => "linkedin",
            SourceKind::Rss => "rss",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        SourceKind::ALL
            .into_iter()
            .find(|kind| kind.key() == needle)
            .ok_or_else(|| format!("unknown source '{s}'"))
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub entities_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub collector_timeout_secs: u64,
    pub collector_user_agent: String,
    pub sources: Vec<SourceKind>,
    pub ingest_window_hours: u32,
    pub dashboard_window_hours: u32,
    pub export_window_hours: u32,
    pub mention_ttl_hours: u32,
    /// `None` disables the scheduled scan.
    pub scan_cron: Option<String>,
    pub scan_password: Option<String>,
    pub cron_secret: Option<String>,
    pub github_token: Option<String>,
    pub bluesky_identifier: Option<String>,
    pub bluesky_app_password: Option<String>,
    pub x_bearer_token: Option<String>,
    pub google_api_key: Option<String>,
    pub google_search_engine_id: Option<String>,
}

impl AppConfig {
    #[must_use]
    pub fn ingest_window(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.ingest_window_hours))
    }

    #[must_use]
    pub fn mention_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.mention_ttl_hours))
    }
}

fn redact(value: Option<&String>) -> Option<&'static str> {
    value.map(|_| "[redacted]")
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("entities_path", &self.entities_path)
            .field("database_url", &redact(self.database_url.as_ref()))
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("collector_timeout_secs", &self.collector_timeout_secs)
            .field("collector_user_agent", &self.collector_user_agent)
            .field("sources", &self.sources)
            .field("ingest_window_hours", &self.ingest_window_hours)
            .field("dashboard_window_hours", &self.dashboard_window_hours)
            .field("export_window_hours", &self.export_window_hours)
            .field("mention_ttl_hours", &self.mention_ttl_hours)
            .field("scan_cron", &self.scan_cron)
            .field("scan_password", &redact(self.scan_password.as_ref()))
            .field("cron_secret", &redact(self.cron_secret.as_ref()))
            .field("github_token", &redact(self.github_token.as_ref()))
            .field("bluesky_identifier", &self.bluesky_identifier)
            .field(
                "bluesky_app_password",
                &redact(self.bluesky_app_password.as_ref()),
            )
            .field("x_bearer_token", &redact(self.x_bearer_token.as_ref()))
            .field("google_api_key", &redact(self.google_api_key.as_ref()))
            .field("google_search_engine_id", &self.google_search_engine_id)
            .finish()
    }
}
