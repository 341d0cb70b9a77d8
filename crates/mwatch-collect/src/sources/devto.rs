//! Dev.to articles by tag.

use async_trait::async_trait;
use mwatch_core::{Entity, Mention};
use reqwest::Client;
use serde::Deserialize;

use super::{check_status, decode_json, trim_base, Collector};
use crate::draft::{finish, MentionDraft};
use crate::error::CollectError;
use crate::query::tag_slug;
use crate::timestamps::parse_rfc3339;

const SOURCE: &str = "Dev.to";
const DEFAULT_BASE_URL: &str = "https://dev.to";

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
    user: Option<ArticleUser>,
}

#[derive(Debug, Deserialize)]
struct ArticleUser {
    name: Option<String>,
    username: Option<String>,
}

impl Article {
    fn into_draft(self) -> MentionDraft {
        let author = self
            .user
            .and_then(|u| u.name.filter(|n| !n.is_empty()).or(u.username))
            .unwrap_or_else(|| "unknown".to_string());
        MentionDraft {
            full_text: format!(
                "{} {}",
                self.title.unwrap_or_default(),
                self.description.unwrap_or_default()
            ),
            author,
            platform: "dev.to".to_string(),
            url: self.url.unwrap_or_default(),
            published_at: self.published_at.as_deref().and_then(parse_rfc3339),
        }
    }
}

pub struct DevToCollector {
    client: Client,
    base_url: String,
}

impl DevToCollector {
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
impl Collector for DevToCollector {
    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self, entity: &Entity) -> Result<Vec<Mention>, CollectError> {
        let slug = tag_slug(&entity.name);
        if slug.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .get(format!("{}/api/articles", self.base_url))
            .query(&[("tag", slug.as_str()), ("per_page", "20")])
            .send()
            .await?;

        let articles: Vec<Article> = decode_json(SOURCE, check_status(SOURCE, response)?).await?;

        Ok(finish(
            articles.into_iter().map(Article::into_draft),
            entity,
            SOURCE,
        ))
    }
}
