//! X (Twitter) v2 recent search. Requires a bearer token.

use std::collections::HashMap;

use async_trait::async_trait;
use mwatch_core::{Entity, Mention};
use reqwest::Client;
use serde::Deserialize;

use super::{check_status, decode_json, log_missing_credentials, trim_base, Collector};
use crate::draft::{finish, MentionDraft};
use crate::error::CollectError;
use crate::query::implicit_and_query;
use crate::timestamps::parse_rfc3339;

const SOURCE: &str = "X (Twitter)";
const DEFAULT_BASE_URL: &str = "https://api.twitter.com";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Tweet>,
    includes: Option<Includes>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    id: String,
    text: String,
    author_id: Option<String>,
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Includes {
    #[serde(default)]
    users: Vec<XUser>,
}

#[derive(Debug, Deserialize)]
struct XUser {
    id: String,
    name: String,
    username: String,
}

fn to_drafts(body: SearchResponse) -> Vec<MentionDraft> {
    let users: HashMap<String, XUser> = body
        .includes
        .map(|i| i.users)
        .unwrap_or_default()
        .into_iter()
        .map(|u| (u.id.clone(), u))
        .collect();

    body.data
        .into_iter()
        .map(|tweet| {
            let author = tweet
                .author_id
                .as_ref()
                .and_then(|id| users.get(id))
                .map_or_else(
                    || "Unknown".to_string(),
                    |u| format!("{} (@{})", u.name, u.username),
                );
            MentionDraft {
                url: format!("https://x.com/i/web/status/{}", tweet.id),
                full_text: tweet.text,
                author,
                platform: "x.com".to_string(),
                published_at: tweet.created_at.as_deref().and_then(parse_rfc3339),
            }
        })
        .collect()
}

pub struct XCollector {
    client: Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl XCollector {
    #[must_use]
    pub fn new(client: Client, bearer_token: Option<String>) -> Self {
        Self::with_base_url(client, bearer_token, DEFAULT_BASE_URL)
    }

    #[must_use]
    pub fn with_base_url(client: Client, bearer_token: Option<String>, base_url: &str) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
            bearer_token,
        }
    }
}

#[async_trait]
impl Collector for XCollector {
    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self, entity: &Entity) -> Result<Vec<Mention>, CollectError> {
        let Some(token) = &self.bearer_token else {
            log_missing_credentials(SOURCE, "X_BEARER_TOKEN");
            return Ok(Vec::new());
        };

        let response = self
            .client
            .get(format!("{}/2/tweets/search/recent", self.base_url))
            .bearer_auth(token)
            .query(&[
                ("query", implicit_and_query(&entity.name).as_str()),
                ("max_results", "25"),
                ("tweet.fields", "created_at,public_metrics,author_id"),
                ("expansions", "author_id"),
                ("user.fields", "name,username"),
            ])
            .send()
            .await?;

        let body: SearchResponse = decode_json(SOURCE, check_status(SOURCE, response)?).await?;

        Ok(finish(to_drafts(body), entity, SOURCE))
    }
}
