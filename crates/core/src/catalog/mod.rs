//! Local book catalog - the master list of books and their latest verification.
//!
//! Books are imported from the local source and keyed by detail URL. Each
//! verification overwrites the previous one for that book.

mod sqlite;
mod types;

pub use sqlite::SqliteBookStore;
pub use types::*;

use chrono::{DateTime, Utc};

use crate::matching::VerificationRecord;

/// Trait for book catalog storage.
pub trait BookStore: Send + Sync {
    /// Insert new books and refresh the details of known ones.
    ///
    /// Existing verification results are kept.
    fn upsert_books(&self, books: &[LocalBook]) -> Result<ImportSummary, CatalogError>;

    /// Books awaiting verification, ordered by title.
    ///
    /// With `force`, every book is returned regardless of prior results.
    fn books_to_verify(
        &self,
        force: bool,
        limit: Option<usize>,
    ) -> Result<Vec<LocalBook>, CatalogError>;

    /// Replace the stored verification for a book.
    fn record_verification(
        &self,
        detail_url: &str,
        record: &VerificationRecord,
        verified_at: DateTime<Utc>,
    ) -> Result<(), CatalogError>;

    /// Get a specific book by detail URL.
    fn get(&self, detail_url: &str) -> Result<StoredBook, CatalogError>;

    /// List books matching a filter, ordered by series then title.
    fn list(&self, filter: &BookFilter) -> Result<Vec<StoredBook>, CatalogError>;

    /// Get catalog statistics.
    fn stats(&self) -> Result<CatalogStats, CatalogError>;

    /// Forget every verification result. Returns the number of books reset.
    fn clear_verifications(&self) -> Result<u64, CatalogError>;
}
