//! GDELT document API article list.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use mwatch_core::{Entity, Mention};
use reqwest::Client;
use serde::Deserialize;

use super::{check_status, decode_json, trim_base, Collector, LOOKBACK_DAYS};
use crate::draft::{finish, MentionDraft};
use crate::error::CollectError;
use crate::query::implicit_and_query;
use crate::timestamps::{format_compact, parse_compact};

const SOURCE: &str = "GDELT News";
const DEFAULT_BASE_URL: &str = "https://api.gdeltproject.org";
const MAX_RECORDS: &str = "20";

#[derive(Debug, Deserialize)]
struct GdeltResponse {
    #[serde(default)]
    articles: Vec<GdeltArticle>,
}

#[derive(Debug, Deserialize)]
struct GdeltArticle {
    url: Option<String>,
    title: Option<String>,
    #[serde(rename = "seendate")]
    seen_date: Option<String>,
    domain: Option<String>,
}

impl GdeltArticle {
    fn into_draft(self) -> MentionDraft {
        let domain = self.domain.filter(|d| !d.is_empty());
        MentionDraft {
            full_text: self.title.unwrap_or_default(),
            author: domain.clone().unwrap_or_else(|| "unknown".to_string()),
            platform: domain.unwrap_or_else(|| "news".to_string()),
            url: self.url.unwrap_or_default(),
            published_at: self.seen_date.as_deref().and_then(parse_compact),
        }
    }
}

pub struct GdeltCollector {
    client: Client,
    base_url: String,
}

impl GdeltCollector {
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
impl Collector for GdeltCollector {
    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self, entity: &Entity) -> Result<Vec<Mention>, CollectError> {
        let start = format_compact(Utc::now() - Duration::days(LOOKBACK_DAYS));
        let response = self
            .client
            .get(format!("{}/api/v2/doc/doc", self.base_url))
            .query(&[
                ("query", implicit_and_query(&entity.name)),
                ("mode", "artlist".to_string()),
                ("startdatetime", start),
                ("maxrecords", MAX_RECORDS.to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await?;

        // GDELT answers some bad queries with 200 and a plain-text body; that
        // surfaces as a decode error.
        let body: GdeltResponse = decode_json(SOURCE, check_status(SOURCE, response)?).await?;

        Ok(finish(
            body.articles.into_iter().map(GdeltArticle::into_draft),
            entity,
            SOURCE,
        ))
    }
}
