use chrono::{DateTime, Utc};
use mwatch_core::{preview, Entity, Mention};
use uuid::Uuid;

use crate::scorer::score_sentiment;
use crate::tags::extract_tags;

/// Source-specific fields of a mention before scoring.
#[derive(Debug, Clone)]
pub(crate) struct MentionDraft {
    pub full_text: String,
    pub author: String,
    pub platform: String,
    pub url: String,
    /// `None` when the source gave no usable timestamp; collection time is used.
    pub published_at: Option<DateTime<Utc>>,
}

impl MentionDraft {
    pub(crate) fn into_mention(
        self,
        entity: &Entity,
        source: &str,
        collected_at: DateTime<Utc>,
    ) -> Mention {
        let full_text = self.full_text.trim().to_string();
        let sentiment = score_sentiment(&full_text);
        let tags = extract_tags(&full_text, &entity.name);

        Mention {
            id: Uuid::new_v4(),
            entity_id: entity.id,
            entity_name: entity.name.clone(),
            entity_type: entity.entity_type,
            source: source.to_string(),
            platform: self.platform,
            author: self.author,
            content: preview(&full_text),
            full_text,
            url: self.url,
            sentiment: sentiment.label,
            sentiment_score: sentiment.score,
            published_at: self.published_at.unwrap_or(collected_at),
            collected_at,
            tags,
        }
    }
}

/// Turn drafts into mentions, dropping any without a URL since the URL is the
/// dedup key.
pub(crate) fn finish(
    drafts: impl IntoIterator<Item = MentionDraft>,
    entity: &Entity,
    source: &str,
) -> Vec<Mention> {
    let collected_at = Utc::now();
    drafts
        .into_iter()
        .filter(|d| !d.url.trim().is_empty())
        .map(|d| d.into_mention(entity, source, collected_at))
        .collect()
}
