//! CSV export of stored verification results.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::catalog::{BookFilter, BookStore, CatalogError, StoredBook};
use crate::matching::MatchStatus;

/// Which slice of the catalog to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    /// Books the tracker does not have yet.
    Candidates,
    Matches,
    Ambiguous,
    All,
}

impl ExportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::Candidates => "candidates",
            ExportKind::Matches => "matches",
            ExportKind::Ambiguous => "ambiguous",
            ExportKind::All => "all",
        }
    }

    /// Header row for this kind.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            ExportKind::Candidates => &[
                "title",
                "author",
                "filetypes",
                "size",
                "series_name",
                "tags",
                "detail_url",
                "torrent_url",
            ],
            ExportKind::Matches => &[
                "title",
                "author",
                "group_name",
                "formats",
                "seeders_total",
                "snatched_total",
            ],
            ExportKind::Ambiguous => &["title", "author", "group_ids", "group_name"],
            ExportKind::All => &[
                "title",
                "author",
                "filetypes",
                "size",
                "series_name",
                "match_status",
                "group_name",
                "formats",
            ],
        }
    }

    fn status(&self) -> Option<MatchStatus> {
        match self {
            ExportKind::Candidates => Some(MatchStatus::NoMatch),
            ExportKind::Matches => Some(MatchStatus::Match),
            ExportKind::Ambiguous => Some(MatchStatus::Ambiguous),
            ExportKind::All => None,
        }
    }

    fn row(&self, stored: &StoredBook) -> Vec<String> {
        let book = &stored.book;
        let verification = stored.verification.as_ref();
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let number = |v: Option<u64>| v.map(|n| n.to_string()).unwrap_or_default();

        match self {
            ExportKind::Candidates => vec![
                book.title.clone(),
                text(&book.author),
                text(&book.filetypes),
                text(&book.size),
                text(&book.series_name),
                text(&book.tags),
                book.detail_url.clone(),
                text(&book.torrent_url),
            ],
            ExportKind::Matches => vec![
                book.title.clone(),
                text(&book.author),
                verification.map(|v| text(&v.group_name)).unwrap_or_default(),
                verification.map(|v| text(&v.formats)).unwrap_or_default(),
                number(verification.and_then(|v| v.seeders_total)),
                number(verification.and_then(|v| v.snatched_total)),
            ],
            ExportKind::Ambiguous => vec![
                book.title.clone(),
                text(&book.author),
                verification.map(|v| text(&v.group_ids)).unwrap_or_default(),
                verification.map(|v| text(&v.group_name)).unwrap_or_default(),
            ],
            ExportKind::All => vec![
                book.title.clone(),
                text(&book.author),
                text(&book.filetypes),
                text(&book.size),
                text(&book.series_name),
                verification
                    .map(|v| v.status.as_str().to_string())
                    .unwrap_or_default(),
                verification.map(|v| text(&v.group_name)).unwrap_or_default(),
                verification.map(|v| text(&v.formats)).unwrap_or_default(),
            ],
        }
    }

    fn sort(&self, books: &mut [StoredBook]) {
        match self {
            // Store order (series, then title) already fits
            ExportKind::Candidates => {}
            ExportKind::Matches | ExportKind::Ambiguous => {
                books.sort_by(|a, b| a.book.title.cmp(&b.book.title))
            }
            // Unverified first, then by status; stable sort keeps series/title order
            ExportKind::All => books.sort_by_key(|b| b.status().map(|s| s.as_str())),
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "candidates" => Ok(ExportKind::Candidates),
            "matches" => Ok(ExportKind::Matches),
            "ambiguous" => Ok(ExportKind::Ambiguous),
            "all" => Ok(ExportKind::All),
            other => Err(format!("unknown export kind: {}", other)),
        }
    }
}

/// Errors during export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Write the requested slice of the catalog as CSV. Returns the number of
/// data rows written.
pub fn export_csv<W: Write>(
    store: &dyn BookStore,
    kind: ExportKind,
    writer: W,
) -> Result<usize, ExportError> {
    let filter = BookFilter {
        status: kind.status(),
        ..BookFilter::default()
    };
    let mut books = store.list(&filter)?;
    kind.sort(&mut books);

    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(writer);

    writer.write_record(kind.columns())?;
    for book in &books {
        writer.write_record(kind.row(book))?;
    }
    writer.flush()?;

    info!(kind = %kind, rows = books.len(), "Exported catalog");
    Ok(books.len())
}
