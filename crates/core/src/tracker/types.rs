//! Types for the remote tracker search collaborator.

use async_trait::async_trait;
use thiserror::Error;

use crate::matching::RemoteGroup;

/// Errors that can occur while searching the tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Tracker HTTP request failed: {0}")]
    Http(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Rate limited, retry in {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("Tracker API error (status {status}): {message}")]
    Api { status: String, message: String },

    #[error("Failed to parse tracker response: {0}")]
    ParseError(String),
}

/// Remote catalog search.
///
/// `Ok(vec![])` means the search ran and found nothing; any failure to run
/// the search must come back as `Err`.
#[async_trait]
pub trait TrackerSearch: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Search the e-book category for `query`.
    async fn search_ebooks(&self, query: &str) -> Result<Vec<RemoteGroup>, TrackerError>;
}
