//! The set of collectors a scan runs against.

use std::sync::Arc;
use std::time::Duration;

use mwatch_core::{AppConfig, SourceKind};
use reqwest::Client;

use crate::error::CollectError;
use crate::sources::{
    BlueskyCollector, Collector, DevToCollector, GdeltCollector, GitHubCollector,
    HackerNewsCollector, LinkedInCollector, MastodonCollector, RedditCollector, RssCollector,
    XCollector,
};

/// Build the shared HTTP client used by every collector.
///
/// # Errors
///
/// Returns [`CollectError::Http`] if the client cannot be constructed.
pub fn build_http_client(config: &AppConfig) -> Result<Client, CollectError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.collector_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(&config.collector_user_agent)
        .build()?;
    Ok(client)
}

#[derive(Clone, Default)]
pub struct SourceRegistry {
    collectors: Vec<Arc<dyn Collector>>,
}

impl SourceRegistry {
    #[must_use]
    pub fn new(collectors: Vec<Arc<dyn Collector>>) -> Self {
        Self { collectors }
    }

    /// Register one collector per enabled source, in configuration order.
    #[must_use]
    pub fn from_config(config: &AppConfig, client: &Client) -> Self {
        let collectors = config
            .sources
            .iter()
            .map(|kind| build_collector(*kind, config, client.clone()))
            .collect();
        Self { collectors }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Collector>> {
        self.collectors.iter()
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.collectors.iter().map(|c| c.name()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("collectors", &self.names())
            .finish()
    }
}

fn build_collector(kind: SourceKind, config: &AppConfig, client: Client) -> Arc<dyn Collector> {
    match kind {
        SourceKind::HackerNews => Arc::new(HackerNewsCollector::new(client)),
        SourceKind::Reddit => Arc::new(RedditCollector::new(client)),
        SourceKind::Gdelt => Arc::new(GdeltCollector::new(client)),
        SourceKind::GitHub => Arc::new(GitHubCollector::new(client, config.github_token.clone())),
        SourceKind::DevTo => Arc::new(DevToCollector::new(client)),
        SourceKind::Mastodon => Arc::new(MastodonCollector::new(client)),
        SourceKind::Bluesky => Arc::new(BlueskyCollector::new(
            client,
            config.bluesky_identifier.clone(),
            config.bluesky_app_password.clone(),
        )),
        SourceKind::X => Arc::new(XCollector::new(client, config.x_bearer_token.clone())),
        SourceKind::LinkedIn => Arc::new(LinkedInCollector::new(
            client,
            config.google_api_key.clone(),
            config.google_search_engine_id.clone(),
        )),
        SourceKind::Rss => Arc::new(RssCollector::new(client)),
    }
}
