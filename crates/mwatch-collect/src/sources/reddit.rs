//! Reddit search via the public `search.json` listing.

use async_trait::async_trait;
use mwatch_core::{Entity, Mention};
use reqwest::Client;
use serde::Deserialize;

use super::{check_status, decode_json, trim_base, Collector};
use crate::draft::{finish, MentionDraft};
use crate::error::CollectError;
use crate::timestamps::from_epoch_secs;

const SOURCE: &str = "Reddit";
const DEFAULT_BASE_URL: &str = "https://old.reddit.com";
// Reddit throttles obvious bot user agents on the unauthenticated endpoint.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    title: Option<String>,
    selftext: Option<String>,
    author: Option<String>,
    subreddit: Option<String>,
    permalink: Option<String>,
    created_utc: Option<f64>,
}

impl Post {
    fn into_draft(self) -> MentionDraft {
        let full_text = format!(
            "{} {}",
            self.title.unwrap_or_default(),
            self.selftext.unwrap_or_default()
        );
        MentionDraft {
            full_text,
            author: self.author.unwrap_or_else(|| "unknown".to_string()),
            platform: format!("r/{}", self.subreddit.unwrap_or_default()),
            url: self
                .permalink
                .map(|p| format!("https://reddit.com{p}"))
                .unwrap_or_default(),
            published_at: self.created_utc.and_then(from_epoch_secs),
        }
    }
}

pub struct RedditCollector {
    client: Client,
    base_url: String,
}

impl RedditCollector {
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
impl Collector for RedditCollector {
    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self, entity: &Entity) -> Result<Vec<Mention>, CollectError> {
        // Reddit search understands AND / OR / NOT natively.
        let response = self
            .client
            .get(format!("{}/search.json", self.base_url))
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .query(&[
                ("q", entity.name.as_str()),
                ("sort", "new"),
                ("t", "week"),
                ("limit", "20"),
            ])
            .send()
            .await?;

        let listing: Listing = decode_json(SOURCE, check_status(SOURCE, response)?).await?;

        Ok(finish(
            listing.data.children.into_iter().map(|c| c.data.into_draft()),
            entity,
            SOURCE,
        ))
    }
}
