//! LinkedIn posts found through Google Custom Search restricted to
//! `site:linkedin.com`.

use std::sync::LazyLock;

use async_trait::async_trait;
use mwatch_core::{Entity, Mention};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

use super::{check_status, decode_json, log_missing_credentials, trim_base, Collector};
use crate::draft::{finish, MentionDraft};
use crate::error::CollectError;
use crate::query::implicit_and_query;

const SOURCE: &str = "LinkedIn";
const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

static PROFILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"linkedin\.com/in/([^/?#]+)").expect("valid regex"));

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    title: Option<String>,
    snippet: Option<String>,
    link: Option<String>,
}

fn author_from_link(link: &str) -> String {
    PROFILE_RE
        .captures(link)
        .map_or_else(|| "LinkedIn User".to_string(), |c| c[1].replace('-', " "))
}

impl SearchItem {
    fn into_draft(self) -> MentionDraft {
        let link = self.link.unwrap_or_default();
        MentionDraft {
            full_text: format!(
                "{} {}",
                self.title.unwrap_or_default(),
                self.snippet.unwrap_or_default()
            ),
            author: author_from_link(&link),
            platform: "linkedin.com".to_string(),
            url: link,
            // Search results carry no reliable post date.
            published_at: None,
        }
    }
}

pub struct LinkedInCollector {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    search_engine_id: Option<String>,
}

impl LinkedInCollector {
    #[must_use]
    pub fn new(client: Client, api_key: Option<String>, search_engine_id: Option<String>) -> Self {
        Self::with_base_url(client, api_key, search_engine_id, DEFAULT_BASE_URL)
    }

    #[must_use]
    pub fn with_base_url(
        client: Client,
        api_key: Option<String>,
        search_engine_id: Option<String>,
        base_url: &str,
    ) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
            api_key,
            search_engine_id,
        }
    }
}

#[async_trait]
impl Collector for LinkedInCollector {
    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self, entity: &Entity) -> Result<Vec<Mention>, CollectError> {
        let (Some(key), Some(cx)) = (&self.api_key, &self.search_engine_id) else {
            log_missing_credentials(SOURCE, "GOOGLE_API_KEY, GOOGLE_SEARCH_ENGINE_ID");
            return Ok(Vec::new());
        };

        let q = format!("site:linkedin.com {}", implicit_and_query(&entity.name));
        let response = self
            .client
            .get(format!("{}/customsearch/v1", self.base_url))
            .query(&[
                ("key", key.as_str()),
                ("cx", cx.as_str()),
                ("q", q.as_str()),
                ("num", "10"),
                ("dateRestrict", "w1"),
            ])
            .send()
            .await?;

        let body: SearchResponse = decode_json(SOURCE, check_status(SOURCE, response)?).await?;

        Ok(finish(
            body.items.into_iter().map(SearchItem::into_draft),
            entity,
            SOURCE,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::author_from_link;

    #[test]
    fn author_is_derived_from_profile_slug() {
        assert_eq!(
            author_from_link("https://www.linkedin.com/in/jane-doe/recent-activity"),
            "jane doe"
        );
    }

    #[test]
    fn non_profile_links_use_placeholder_author() {
        assert_eq!(
            author_from_link("https://www.linkedin.com/posts/acme_launch-123"),
            "LinkedIn User"
        );
    }
}
