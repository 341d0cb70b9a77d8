use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::EntityType;
use crate::CoreError;

/// Maximum number of characters kept in [`Mention::content`].
pub const MENTION_PREVIEW_CHARS: usize = 200;

/// Maximum number of tags attached to a mention.
pub const MAX_TAGS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            other => Err(CoreError::UnknownSentiment(other.to_string())),
        }
    }
}

/// One normalized sighting of an entity on an external source.
///
/// `entity_name` and `entity_type` are a snapshot taken at collection time.
/// Two mentions sharing a `url` describe the same real-world item; readers
/// keep the one with the later `collected_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    pub id: Uuid,
    pub entity_id: Uuid,
    pub entity_name: String,
    pub entity_type: EntityType,
    pub source: String,
    pub platform: String,
    pub author: String,
    pub content: String,
    pub full_text: String,
    pub url: String,
    pub sentiment: Sentiment,
    pub sentiment_score: u8,
    pub published_at: DateTime<Utc>,
    pub collected_at: DateTime<Utc>,
    pub tags: Vec<String>,
}

/// Truncate `text` to at most [`MENTION_PREVIEW_CHARS`] characters.
#[must_use]
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(MENTION_PREVIEW_CHARS) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightCategory {
    Culture,
    Opinion,
    Challenge,
    Sentiment,
}

impl InsightCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            InsightCategory::Culture => "culture",
            InsightCategory::Opinion => "opinion",
            InsightCategory::Challenge => "challenge",
            InsightCategory::Sentiment => "sentiment",
        }
    }
}

impl std::fmt::Display for InsightCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InsightCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "culture" => Ok(InsightCategory::Culture),
            "opinion" => Ok(InsightCategory::Opinion),
            "challenge" => Ok(InsightCategory::Challenge),
            "sentiment" => Ok(InsightCategory::Sentiment),
            other => Err(CoreError::UnknownInsightCategory(other.to_string())),
        }
    }
}

/// A categorized note about a company derived from a single mention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyInsight {
    pub id: Uuid,
    pub entity_id: Uuid,
    pub category: InsightCategory,
    pub insight: String,
    pub evidence: Vec<Uuid>,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl CompanyInsight {
    /// Derive an insight backed by exactly one mention.
    #[must_use]
    pub fn from_mention(mention: &Mention, category: InsightCategory) -> Self {
        Self {
            id: Uuid::new_v4(),
            entity_id: mention.entity_id,
            category,
            insight: mention.content.clone(),
            evidence: vec![mention.id],
            first_seen_at: mention.published_at,
            last_seen_at: mention.published_at,
        }
    }
}

/// Summary of one scan pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub entities_scanned: usize,
    pub mentions_collected: usize,
    pub sources: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl ScanResult {
    #[must_use]
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            entities_scanned: 0,
            mentions_collected: 0,
            sources: Vec::new(),
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_keeps_short_text() {
        assert_eq!(preview("hello"), "hello");
        assert_eq!(preview(""), "");
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let text = "é".repeat(250);
        let short = preview(&text);
        assert_eq!(short.chars().count(), MENTION_PREVIEW_CHARS);
    }

    #[test]
    fn sentiment_round_trips_through_str() {
        for s in [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral] {
            assert_eq!(s.as_str().parse::<Sentiment>().unwrap(), s);
        }
        assert!("mixed".parse::<Sentiment>().is_err());
    }

    #[test]
    fn insight_category_rejects_unknown() {
        assert!(matches!(
            "gossip".parse::<InsightCategory>(),
            Err(CoreError::UnknownInsightCategory(_))
        ));
    }
}
