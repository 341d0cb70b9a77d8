//! Fixed RSS/Atom feeds filtered locally by entity name.

use async_trait::async_trait;
use chrono::Utc;
use feed_rs::model::Entry;
use mwatch_core::{Entity, Mention};
use reqwest::Client;

use super::{check_status, Collector};
use crate::draft::MentionDraft;
use crate::error::CollectError;
use crate::query::entity_matches_text;

const SOURCE: &str = "RSS";

/// One feed: display label, URL and the platform recorded on its mentions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSpec {
    pub label: String,
    pub url: String,
    pub platform: String,
}

impl FeedSpec {
    #[must_use]
    pub fn new(label: &str, url: &str, platform: &str) -> Self {
        Self {
            label: label.to_string(),
            url: url.to_string(),
            platform: platform.to_string(),
        }
    }
}

/// `(label, url, platform)` of the feeds polled by default.
pub const DEFAULT_FEEDS: &[(&str, &str, &str)] = &[
    ("TechCrunch", "https://techcrunch.com/feed/", "techcrunch.com"),
    (
        "The Verge",
        "https://www.theverge.com/rss/index.xml",
        "theverge.com",
    ),
    (
        "Cloud Native Now",
        "https://www.cloudnativenow.com/feed/",
        "cloudnativenow.com",
    ),
];

fn entry_text(entry: &Entry) -> (String, String) {
    let title = entry
        .title
        .as_ref()
        .map(|t| t.content.clone())
        .unwrap_or_default();
    let summary = entry
        .summary
        .as_ref()
        .map(|s| s.content.clone())
        .or_else(|| entry.content.as_ref().and_then(|c| c.body.clone()))
        .unwrap_or_default();
    (title, summary)
}

fn entry_to_draft(entry: Entry, feed: &FeedSpec) -> MentionDraft {
    let (title, summary) = entry_text(&entry);
    MentionDraft {
        full_text: format!("{title} {summary}"),
        author: entry
            .authors
            .first()
            .map_or_else(|| "Unknown".to_string(), |p| p.name.clone()),
        platform: feed.platform.clone(),
        url: entry
            .links
            .first()
            .map(|l| l.href.clone())
            .unwrap_or_default(),
        published_at: entry.published.or(entry.updated),
    }
}

pub struct RssCollector {
    client: Client,
    feeds: Vec<FeedSpec>,
}

impl RssCollector {
    #[must_use]
    pub fn new(client: Client) -> Self {
        let feeds = DEFAULT_FEEDS
            .iter()
            .map(|(label, url, platform)| FeedSpec::new(label, url, platform))
            .collect();
        Self::with_feeds(client, feeds)
    }

    #[must_use]
    pub fn with_feeds(client: Client, feeds: Vec<FeedSpec>) -> Self {
        Self { client, feeds }
    }

    async fn fetch_feed(
        &self,
        feed: &FeedSpec,
        entity: &Entity,
    ) -> Result<Vec<Mention>, CollectError> {
        let response = check_status(SOURCE, self.client.get(&feed.url).send().await?)?;
        let bytes = response.bytes().await?;
        let parsed = feed_rs::parser::parse(bytes.as_ref()).map_err(|e| CollectError::Feed {
            feed: feed.label.clone(),
            reason: e.to_string(),
        })?;

        let collected_at = Utc::now();
        Ok(parsed
            .entries
            .into_iter()
            .filter(|entry| {
                let (title, summary) = entry_text(entry);
                entity_matches_text(&entity.name, &title)
                    || entity_matches_text(&entity.name, &summary)
            })
            .map(|entry| entry_to_draft(entry, feed))
            .filter(|d| !d.url.trim().is_empty())
            .map(|d| d.into_mention(entity, &feed.label, collected_at))
            .collect())
    }
}

#[async_trait]
impl Collector for RssCollector {
    fn name(&self) -> &'static str {
        SOURCE
    }

    /// Feeds are independent: a failing feed is logged and skipped.
    async fn fetch(&self, entity: &Entity) -> Result<Vec<Mention>, CollectError> {
        let mut mentions = Vec::new();
        for feed in &self.feeds {
            match self.fetch_feed(feed, entity).await {
                Ok(found) => mentions.extend(found),
                Err(e) => tracing::warn!(
                    entity = %entity.name,
                    feed = %feed.label,
                    error = %e,
                    "feed fetch failed"
                ),
            }
        }
        Ok(mentions)
    }
}
