pub mod app_config;
pub mod config;
pub mod entities;
pub mod export;
pub mod mentions;
pub mod metrics;

pub use app_config::{AppConfig, Environment, SourceKind};
pub use config::{build_app_config, load_app_config, load_app_config_from_env};
pub use entities::{load_entities, sanitize_entity_name, Entity, EntityConfig, EntityType, EntitiesFile, NewEntity};
pub use export::{mentions_to_csv, ExportBundle, CSV_HEADERS};
pub use mentions::{
    preview, CompanyInsight, InsightCategory, Mention, ScanResult, Sentiment, MAX_TAGS,
    MENTION_PREVIEW_CHARS,
};
pub use metrics::{entity_metrics, EntityMetrics, SentimentDistribution};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read entities file {path}: {source}")]
    EntitiesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse entities file: {0}")]
    EntitiesFileParse(#[from] serde_yaml::Error),

    #[error("entities file validation failed: {0}")]
    Validation(String),
}

/// Validation failures reported to callers of the write API.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("unknown entity type: {0} (expected keyword or company)")]
    UnknownEntityType(String),

    #[error("entity '{name}' of type {entity_type} already exists")]
    DuplicateEntity {
        name: String,
        entity_type: EntityType,
    },

    #[error("unknown sentiment label: {0}")]
    UnknownSentiment(String),

    #[error("unknown insight category: {0}")]
    UnknownInsightCategory(String),

    #[error("export failed: {0}")]
    Export(String),
}
