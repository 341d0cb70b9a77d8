//! Mastodon status search on a single instance.

use std::sync::LazyLock;

use async_trait::async_trait;
use mwatch_core::{Entity, Mention};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

use super::{check_status, decode_json, trim_base, Collector};
use crate::draft::{finish, MentionDraft};
use crate::error::CollectError;
use crate::query::plain_query;
use crate::timestamps::parse_rfc3339;

const SOURCE: &str = "Mastodon";
const DEFAULT_BASE_URL: &str = "https://mastodon.social";

static HTML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    statuses: Vec<Status>,
}

#[derive(Debug, Deserialize)]
struct Status {
    content: Option<String>,
    url: Option<String>,
    created_at: Option<String>,
    account: Option<Account>,
}

#[derive(Debug, Deserialize)]
struct Account {
    acct: String,
}

fn strip_html(html: &str) -> String {
    HTML_TAG_RE.replace_all(html, " ").split_whitespace().collect::<Vec<_>>().join(" ")
}

impl Status {
    fn into_draft(self) -> MentionDraft {
        MentionDraft {
            full_text: strip_html(self.content.as_deref().unwrap_or_default()),
            author: self
                .account
                .map_or_else(|| "unknown".to_string(), |a| format!("@{}", a.acct)),
            platform: "mastodon.social".to_string(),
            url: self.url.unwrap_or_default(),
            published_at: self.created_at.as_deref().and_then(parse_rfc3339),
        }
    }
}

pub struct MastodonCollector {
    client: Client,
    base_url: String,
}

impl MastodonCollector {
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
impl Collector for MastodonCollector {
    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self, entity: &Entity) -> Result<Vec<Mention>, CollectError> {
        let response = self
            .client
            .get(format!("{}/api/v2/search", self.base_url))
            .query(&[
                ("q", plain_query(&entity.name).as_str()),
                ("type", "statuses"),
                ("limit", "20"),
            ])
            .send()
            .await?;

        let body: SearchResponse = decode_json(SOURCE, check_status(SOURCE, response)?).await?;

        Ok(finish(
            body.statuses.into_iter().map(Status::into_draft),
            entity,
            SOURCE,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::strip_html;

    #[test]
    fn strip_html_removes_tags_and_collapses_space() {
        assert_eq!(
            strip_html("<p>Loving <a href=\"x\">#rust</a></p><p>today</p>"),
            "Loving #rust today"
        );
    }
}
