//! Bluesky post search. Requires an app password session.

use async_trait::async_trait;
use mwatch_core::{Entity, Mention};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{check_status, decode_json, log_missing_credentials, trim_base, Collector};
use crate::draft::{finish, MentionDraft};
use crate::error::CollectError;
use crate::query::plain_query;
use crate::timestamps::parse_rfc3339;

const SOURCE: &str = "Bluesky";
const DEFAULT_AUTH_BASE_URL: &str = "https://bsky.social";
const DEFAULT_SEARCH_BASE_URL: &str = "https://public.api.bsky.app";

#[derive(Debug, Serialize)]
struct CreateSession<'a> {
    identifier: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Session {
    access_jwt: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    posts: Vec<Post>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Post {
    uri: String,
    author: PostAuthor,
    record: Option<PostRecord>,
    indexed_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostAuthor {
    handle: String,
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostRecord {
    text: Option<String>,
    created_at: Option<String>,
}

impl Post {
    fn into_draft(self) -> MentionDraft {
        let post_id = self.uri.rsplit('/').next().unwrap_or_default();
        let url = if post_id.is_empty() {
            String::new()
        } else {
            format!("https://bsky.app/profile/{}/post/{post_id}", self.author.handle)
        };
        let (text, created_at) = self
            .record
            .map(|r| (r.text.unwrap_or_default(), r.created_at))
            .unwrap_or_default();
        let published_at = created_at
            .or(self.indexed_at)
            .as_deref()
            .and_then(parse_rfc3339);

        MentionDraft {
            full_text: text,
            author: self
                .author
                .display_name
                .filter(|n| !n.is_empty())
                .unwrap_or(self.author.handle),
            platform: "bsky.app".to_string(),
            url,
            published_at,
        }
    }
}

pub struct BlueskyCollector {
    client: Client,
    auth_base_url: String,
    search_base_url: String,
    identifier: Option<String>,
    app_password: Option<String>,
}

impl BlueskyCollector {
    #[must_use]
    pub fn new(client: Client, identifier: Option<String>, app_password: Option<String>) -> Self {
        Self::with_base_urls(
            client,
            identifier,
            app_password,
            DEFAULT_AUTH_BASE_URL,
            DEFAULT_SEARCH_BASE_URL,
        )
    }

    #[must_use]
    pub fn with_base_urls(
        client: Client,
        identifier: Option<String>,
        app_password: Option<String>,
        auth_base_url: &str,
        search_base_url: &str,
    ) -> Self {
        Self {
            client,
            auth_base_url: trim_base(auth_base_url),
            search_base_url: trim_base(search_base_url),
            identifier,
            app_password,
        }
    }

    async fn create_session(&self, identifier: &str, password: &str) -> Result<String, CollectError> {
        let response = self
            .client
            .post(format!(
                "{}/xrpc/com.atproto.server.createSession",
                self.auth_base_url
            ))
            .json(&CreateSession {
                identifier,
                password,
            })
            .send()
            .await?;
        let session: Session = decode_json(SOURCE, check_status(SOURCE, response)?).await?;
        Ok(session.access_jwt)
    }
}

#[async_trait]
impl Collector for BlueskyCollector {
    fn name(&self) -> &'static str {
        SOURCE
    }

    async fn fetch(&self, entity: &Entity) -> Result<Vec<Mention>, CollectError> {
        let (Some(identifier), Some(password)) = (&self.identifier, &self.app_password) else {
            log_missing_credentials(SOURCE, "BLUESKY_IDENTIFIER, BLUESKY_APP_PASSWORD");
            return Ok(Vec::new());
        };

        let token = self.create_session(identifier, password).await?;
        let response = self
            .client
            .get(format!(
                "{}/xrpc/app.bsky.feed.searchPosts",
                self.search_base_url
            ))
            .bearer_auth(token)
            .query(&[("q", plain_query(&entity.name).as_str()), ("limit", "25")])
            .send()
            .await?;

        let body: SearchResponse = decode_json(SOURCE, check_status(SOURCE, response)?).await?;

        Ok(finish(
            body.posts.into_iter().map(Post::into_draft),
            entity,
            SOURCE,
        ))
    }
}
