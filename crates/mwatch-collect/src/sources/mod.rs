//! External source collectors.
//!
//! Each collector owns its query syntax, response shape and timestamp
//! encoding, and returns normalized [`Mention`]s. Missing credentials are
//! not an error: the collector logs and returns nothing.

mod bluesky;
mod devto;
mod gdelt;
mod github;
mod hackernews;
mod linkedin;
mod mastodon;
mod reddit;
mod rss;
mod x;

pub use bluesky::BlueskyCollector;
pub use devto::DevToCollector;
pub use gdelt::GdeltCollector;
pub use github::GitHubCollector;
pub use hackernews::HackerNewsCollector;
pub use linkedin::LinkedInCollector;
pub use mastodon::MastodonCollector;
pub use reddit::RedditCollector;
pub use rss::{FeedSpec, RssCollector, DEFAULT_FEEDS};
pub use x::XCollector;

use async_trait::async_trait;
use mwatch_core::{Entity, Mention};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::CollectError;

/// Collector fetch window, applied as a query parameter where the source
/// supports one.
pub(crate) const LOOKBACK_DAYS: i64 = 7;

#[async_trait]
pub trait Collector: Send + Sync {
    /// Human-readable source name, e.g. "Hacker News".
    fn name(&self) -> &'static str;

    /// Fetch and normalize mentions of `entity`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError`] on network, status or decode failures.
    async fn fetch(&self, entity: &Entity) -> Result<Vec<Mention>, CollectError>;
}

/// Map non-success statuses onto [`CollectError`] variants.
pub(crate) fn check_status(
    source_name: &'static str,
    response: Response,
) -> Result<Response, CollectError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(match status {
        StatusCode::UNAUTHORIZED => CollectError::Unauthorized { source_name },
        StatusCode::TOO_MANY_REQUESTS => CollectError::RateLimited { source_name },
        other => CollectError::Status {
            source_name,
            status: other.as_u16(),
        },
    })
}

/// Decode a JSON body, reporting shape mismatches as [`CollectError::Decode`].
pub(crate) async fn decode_json<T: DeserializeOwned>(
    source_name: &'static str,
    response: Response,
) -> Result<T, CollectError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| CollectError::Decode {
        source_name,
        reason: e.to_string(),
    })
}

pub(crate) fn trim_base(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

fn log_missing_credentials(source_name: &'static str, vars: &str) {
    tracing::info!(
        source = source_name,
        vars,
        "credentials not configured; skipping source"
    );
}
