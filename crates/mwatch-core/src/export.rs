use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Entity;
use crate::mentions::{CompanyInsight, Mention};
use crate::CoreError;

pub const CSV_HEADERS: [&str; 11] = [
    "Entity",
    "Type",
    "Source",
    "Platform",
    "Author",
    "Sentiment",
    "Score",
    "Content",
    "URL",
    "Published",
    "Tags",
];

/// Full data dump served by the JSON export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportBundle {
    pub exported_at: DateTime<Utc>,
    pub entities: Vec<Entity>,
    pub mentions: Vec<Mention>,
    pub insights: Vec<CompanyInsight>,
}

/// Render mentions as CSV with a header row.
///
/// # Errors
///
/// Returns [`CoreError::Export`] if the writer fails.
pub fn mentions_to_csv(mentions: &[Mention]) -> Result<String, CoreError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(CSV_HEADERS)
        .map_err(|e| CoreError::Export(e.to_string()))?;

    for m in mentions {
        let score = m.sentiment_score.to_string();
        let published = m.published_at.to_rfc3339_opts(SecondsFormat::Secs, true);
        let tags = m.tags.join(", ");
        writer
            .write_record([
                m.entity_name.as_str(),
                m.entity_type.as_str(),
                m.source.as_str(),
                m.platform.as_str(),
                m.author.as_str(),
                m.sentiment.as_str(),
                score.as_str(),
                m.content.as_str(),
                m.url.as_str(),
                published.as_str(),
                tags.as_str(),
            ])
            .map_err(|e| CoreError::Export(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CoreError::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;
    use crate::entities::EntityType;
    use crate::mentions::Sentiment;

    fn mention(content: &str) -> Mention {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        Mention {
            id: Uuid::new_v4(),
            entity_id: Uuid::new_v4(),
            entity_name: "Acme".to_string(),
            entity_type: EntityType::Company,
            source: "GitHub".to_string(),
            platform: "acme/widgets".to_string(),
            author: "octocat".to_string(),
            content: content.to_string(),
            full_text: content.to_string(),
            url: "https://github.com/acme/widgets/issues/1".to_string(),
            sentiment: Sentiment::Positive,
            sentiment_score: 70,
            published_at: at,
            collected_at: at,
            tags: vec!["acme".to_string(), "api".to_string()],
        }
    }

    #[test]
    fn csv_has_header_and_rows() {
        let out = mentions_to_csv(&[mention("great api")]).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Entity,Type,Source,Platform,Author,Sentiment,Score,Content,URL,Published,Tags"
        );
        assert_eq!(
            lines.next().unwrap(),
            "Acme,company,GitHub,acme/widgets,octocat,positive,70,great api,https://github.com/acme/widgets/issues/1,2026-03-01T12:00:00Z,\"acme, api\""
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn csv_quotes_embedded_quotes_and_commas() {
        let out = mentions_to_csv(&[mention("he said \"hi\", then left")]).unwrap();
        assert!(out.contains("\"he said \"\"hi\"\", then left\""));
    }

    #[test]
    fn csv_empty_input_is_header_only() {
        let out = mentions_to_csv(&[]).unwrap();
        assert_eq!(out.lines().count(), 1);
    }
}
