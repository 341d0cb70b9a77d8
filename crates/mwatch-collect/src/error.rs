use mwatch_db::DbError;
use thiserror::Error;

/// Failure inside a single source collector. Never aborts a scan.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{source_name} returned HTTP {status}")]
    Status { source_name: &'static str, status: u16 },

    #[error("{source_name} rejected credentials")]
    Unauthorized { source_name: &'static str },

    #[error("{source_name} rate limit exceeded")]
    RateLimited { source_name: &'static str },

    #[error("{source_name} payload could not be decoded: {reason}")]
    Decode {
        source_name: &'static str,
        reason: String,
    },

    #[error("feed {feed} could not be parsed: {reason}")]
    Feed { feed: String, reason: String },

    #[error("{source_name} collector panicked")]
    Panicked { source_name: &'static str },
}

/// Failure that aborts a scan pass. Only persistence errors qualify.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("persistence failed: {0}")]
    Store(#[from] DbError),
}
