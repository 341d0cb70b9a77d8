use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{Entity, EntityType};
use crate::mentions::{Mention, Sentiment};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

/// Dashboard summary for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMetrics {
    pub entity_id: Uuid,
    pub entity_name: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub total_mentions: usize,
    pub sentiment: SentimentDistribution,
    /// Mean `sentiment_score`, `None` when there are no mentions.
    pub average_score: Option<f64>,
    pub platforms: BTreeMap<String, usize>,
}

/// Summarize the mentions that belong to `entity`; others are ignored.
#[must_use]
pub fn entity_metrics(entity: &Entity, mentions: &[Mention]) -> EntityMetrics {
    let mut sentiment = SentimentDistribution::default();
    let mut platforms = BTreeMap::new();
    let mut score_sum = 0u64;
    let mut total = 0usize;

    for m in mentions.iter().filter(|m| m.entity_id == entity.id) {
        total += 1;
        score_sum += u64::from(m.sentiment_score);
        match m.sentiment {
            Sentiment::Positive => sentiment.positive += 1,
            Sentiment::Negative => sentiment.negative += 1,
            Sentiment::Neutral => sentiment.neutral += 1,
        }
        *platforms.entry(m.platform.clone()).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    let average_score = (total > 0).then(|| score_sum as f64 / total as f64);

    EntityMetrics {
        entity_id: entity.id,
        entity_name: entity.name.clone(),
        entity_type: entity.entity_type,
        total_mentions: total,
        sentiment,
        average_score,
        platforms,
    }
}
