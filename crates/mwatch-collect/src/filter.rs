use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use mwatch_core::Mention;

/// Keep the first mention seen for each URL, preserving order.
#[must_use]
pub fn dedupe(mut mentions: Vec<Mention>) -> Vec<Mention> {
    let mut seen: HashSet<String> = HashSet::with_capacity(mentions.len());
    mentions.retain(|m| seen.insert(m.url.clone()));
    mentions
}

/// Keep mentions published at or after `now - window`.
#[must_use]
pub fn filter_recent(mut mentions: Vec<Mention>, window: Duration, now: DateTime<Utc>) -> Vec<Mention> {
    let horizon = now - window;
    mentions.retain(|m| m.published_at >= horizon);
    mentions
}

#[cfg(test)]
mod tests {
    use mwatch_core::{EntityType, Sentiment};
    use uuid::Uuid;

    use super::*;

    fn mention(url: &str, published_at: DateTime<Utc>) -> Mention {
        Mention {
            id: Uuid::new_v4(),
            entity_id: Uuid::nil(),
            entity_name: "rust".to_string(),
            entity_type: EntityType::Keyword,
            source: "Reddit".to_string(),
            platform: "r/rust".to_string(),
            author: "a".to_string(),
            content: String::new(),
            full_text: String::new(),
            url: url.to_string(),
            sentiment: Sentiment::Neutral,
            sentiment_score: 50,
            published_at,
            collected_at: published_at,
            tags: vec![],
        }
    }

    #[test]
    fn dedupe_keeps_first_per_url() {
        let now = Utc::now();
        let first = mention("https://a", now);
        let first_id = first.id;
        let out = dedupe(vec![
            first,
            mention("https://b", now),
            mention("https://a", now),
        ]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, first_id);
        assert_eq!(out[1].url, "https://b");
    }

    #[test]
    fn filter_recent_drops_old_and_keeps_boundary() {
        let now = Utc::now();
        let window = Duration::days(7);
        let out = filter_recent(
            vec![
                mention("https://fresh", now - Duration::hours(1)),
                mention("https://edge", now - window),
                mention("https://stale", now - window - Duration::seconds(1)),
            ],
            window,
            now,
        );
        let urls: Vec<&str> = out.iter().map(|m| m.url.as_str()).collect();
        assert_eq!(urls, vec!["https://fresh", "https://edge"]);
    }

    #[test]
    fn filter_recent_is_idempotent() {
        let now = Utc::now();
        let window = Duration::hours(48);
        let input = vec![
            mention("https://1", now - Duration::hours(3)),
            mention("https://2", now - Duration::hours(72)),
            mention("https://3", now - Duration::hours(47)),
        ];
        let once = filter_recent(input, window, now);
        let twice = filter_recent(once.clone(), window, now);
        assert_eq!(once, twice);
    }
}
