//! Mention collection and classification pipeline.
//!
//! Fetches entity mentions from public sources, normalizes them into
//! [`mwatch_core::Mention`]s, scores sentiment and tags lexically, and drives
//! full scan passes that persist mentions and company insights through a
//! [`mwatch_db::MentionStore`].

pub mod error;
pub mod filter;
pub mod insight;
pub mod orchestrator;
pub mod query;
pub mod registry;
pub mod scan;
pub mod scorer;
pub mod sources;
pub mod tags;

mod draft;
mod timestamps;

pub use error::{CollectError, ScanError};
pub use filter::{dedupe, filter_recent};
pub use insight::{classify_insight, InsightScore, INSIGHT_CONFIDENCE_THRESHOLD};
pub use orchestrator::{collect_for_entity, fetch_all, probe_sources, ProbeReport, SourceOutcome};
pub use registry::{build_http_client, SourceRegistry};
pub use scan::{ScanState, ScanStatus, Scanner};
pub use scorer::{score_sentiment, SentimentScore};
pub use sources::Collector;
pub use tags::extract_tags;
