//! Types for the local book catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matching::{LocalItem, MatchStatus, VerificationRecord};

/// A book from the local catalog, keyed by its detail page URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalBook {
    /// Detail page URL (unique key).
    pub detail_url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co_author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_name: Option<String>,
    /// File types as listed locally (e.g., "epub pdf").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filetypes: Option<String>,
    /// Human-readable size (e.g., "2.3 MiB").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// .torrent download URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub torrent_url: Option<String>,
}

impl LocalBook {
    pub fn new(detail_url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            detail_url: detail_url.into(),
            title: title.into(),
            author: None,
            co_author: None,
            series_name: None,
            filetypes: None,
            size: None,
            tags: None,
            torrent_url: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// The title/author pair the matcher looks at.
    pub fn item(&self) -> LocalItem {
        LocalItem::new(self.title.clone(), self.author.as_deref())
    }
}

/// A book with its latest verification, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredBook {
    #[serde(flatten)]
    pub book: LocalBook,
    #[serde(flatten)]
    pub verification: Option<VerificationRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
}

impl StoredBook {
    pub fn status(&self) -> Option<MatchStatus> {
        self.verification.as_ref().map(|v| v.status)
    }
}

/// Filter for listing stored books.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MatchStatus>,
    /// Exact series name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    /// Substring of the local file types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Substring of title or author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl BookFilter {
    pub fn with_status(status: MatchStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Result of importing a batch of books.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Books not seen before.
    pub imported: u32,
    /// Existing books whose details were refreshed.
    pub updated: u32,
    /// Entries rejected for a blank detail URL.
    pub skipped: u32,
}

/// Catalog statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total: u64,
    pub unverified: u64,
    pub matched: u64,
    pub no_match: u64,
    pub ambiguous: u64,
    pub error: u64,
}

impl CatalogStats {
    pub fn count(&self, status: MatchStatus) -> u64 {
        match status {
            MatchStatus::Match => self.matched,
            MatchStatus::NoMatch => self.no_match,
            MatchStatus::Ambiguous => self.ambiguous,
            MatchStatus::Error => self.error,
        }
    }

    pub(crate) fn add(&mut self, status: MatchStatus, n: u64) {
        match status {
            MatchStatus::Match => self.matched += n,
            MatchStatus::NoMatch => self.no_match += n,
            MatchStatus::Ambiguous => self.ambiguous += n,
            MatchStatus::Error => self.error += n,
        }
    }
}

/// Errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for CatalogError {
    fn from(e: rusqlite::Error) -> Self {
        CatalogError::Database(e.to_string())
    }
}
