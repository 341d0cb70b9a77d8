//! Hacker News stories via the Algolia search API.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use mwatch_core::{Entity, Mention};
use reqwest::Client;
use serde::Deserialize;

use super::{check_status, decode_json, trim_base, Collector, LOOKBACK_DAYS};
use crate::draft::{finish, MentionDraft};
use crate::error::CollectError;
use crate::query::plain_query;
use crate::timestamps::parse_rfc3339;

const SOURCE: &str = "Hacker News";
const DEFAULT_BASE_URL: &str = "https://hn.algolia.com";
const HITS_PER_PAGE: &str = "20";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "objectID")]
    object_id: String,
    title: Option<String>,
    author: Option<String>,
    url: Option<String>,
    created_at: Option<String>,
    story_text: Option<String>,
}

impl Hit {
    fn into_draft(self) -> MentionDraft {
        let full_text = self
            .story_text
            .filter(|t| !t.trim().is_empty())
            .or(self.title)
            .unwrap_or_default();
        let url = self
            .url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| format!("https://news.ycombinator.com/item?id={}", self.object_id));

        MentionDraft {
            full_text,
            author: self.author.unwrap_or_else(|| "unknown".to_string()),
            platform: "news.ycombinator.com".to_string(),
            url,
            published_at: self.created_at.as_deref().and_then(parse_rfc3339),
        }
    }
}

pub struct HackerNewsCollector {
    client: Client,
    base_url: String,
}

impl HackerNewsCollector {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE_URL)
    }

    #[must_use]
    pub fn with_base_url(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
        }
    }
}

#[async_trait]
impl Collector for HackerNewsCollector {
    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self, entity: &Entity) -> Result<Vec<Mention>, CollectError> {
        let since = (Utc::now() - Duration::days(LOOKBACK_DAYS)).timestamp();
        let response = self
            .client
            .get(format!("{}/api/v1/search", self.base_url))
            .query(&[
                ("query", plain_query(&entity.name)),
                ("tags", "story".to_string()),
                ("numericFilters", format!("created_at_i>{since}")),
                ("hitsPerPage", HITS_PER_PAGE.to_string()),
            ])
            .send()
            .await?;

        let body: SearchResponse = decode_json(SOURCE, check_status(SOURCE, response)?).await?;
        tracing::debug!(entity = %entity.name, hits = body.hits.len(), "hacker news search");

        Ok(finish(
            body.hits.into_iter().map(Hit::into_draft),
            entity,
            SOURCE,
        ))
    }
}
