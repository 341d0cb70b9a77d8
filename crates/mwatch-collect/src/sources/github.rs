//! GitHub issue and pull request search.

use std::sync::LazyLock;

use async_trait::async_trait;
use mwatch_core::{Entity, Mention};
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::{check_status, decode_json, trim_base, Collector};
use crate::draft::{finish, MentionDraft};
use crate::error::CollectError;
use crate::timestamps::parse_rfc3339;

const SOURCE: &str = "GitHub";
const DEFAULT_BASE_URL: &str = "https://api.github.com";

static REPO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"repos/(.+)$").expect("valid regex"));

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Issue>,
}

#[derive(Debug, Deserialize)]
struct Issue {
    title: Option<String>,
    body: Option<String>,
    user: Option<User>,
    html_url: Option<String>,
    created_at: Option<String>,
    repository_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct User {
    login: String,
}

impl Issue {
    fn into_draft(self) -> MentionDraft {
        let full_text = format!(
            "{} {}",
            self.title.unwrap_or_default(),
            self.body.unwrap_or_default()
        );
        let platform = self
            .repository_url
            .as_deref()
            .and_then(|u| REPO_RE.captures(u))
            .map_or_else(|| "github.com".to_string(), |c| c[1].to_string());

        MentionDraft {
            full_text,
            author: self.user.map_or_else(|| "unknown".to_string(), |u| u.login),
            platform,
            url: self.html_url.unwrap_or_default(),
            published_at: self.created_at.as_deref().and_then(parse_rfc3339),
        }
    }
}

pub struct GitHubCollector {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubCollector {
    #[must_use]
    pub fn new(client: Client, token: Option<String>) -> Self {
        Self::with_base_url(client, token, DEFAULT_BASE_URL)
    }

    #[must_use]
    pub fn with_base_url(client: Client, token: Option<String>, base_url: &str) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
            token,
        }
    }
}

#[async_trait]
impl Collector for GitHubCollector {
    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self, entity: &Entity) -> Result<Vec<Mention>, CollectError> {
        // GitHub search supports AND / OR / NOT natively.
        let mut request = self
            .client
            .get(format!("{}/search/issues", self.base_url))
            .header(reqwest::header::ACCEPT, "application/vnd.github.v3+json")
            .query(&[
                ("q", entity.name.as_str()),
                ("sort", "created"),
                ("order", "desc"),
                ("per_page", "20"),
            ]);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        // Unauthenticated search quota exhaustion is reported as 403.
        if response.status() == StatusCode::FORBIDDEN {
            return Err(CollectError::RateLimited {
                source_name: SOURCE,
            });
        }

        let body: SearchResponse = decode_json(SOURCE, check_status(SOURCE, response)?).await?;

        Ok(finish(
            body.items.into_iter().map(Issue::into_draft),
            entity,
            SOURCE,
        ))
    }
}
