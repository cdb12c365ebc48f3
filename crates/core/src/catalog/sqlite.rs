//! SQLite-backed book catalog implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::debug;

use super::{
    BookFilter, BookStore, CatalogError, CatalogStats, ImportSummary, LocalBook, StoredBook,
};
use crate::matching::{MatchStatus, VerificationRecord};

const BOOK_COLUMNS: &str = "detail_url, title, author, co_author, series_name, filetypes, size,
     tags, torrent_url, match_status, group_ids, group_name, formats, seeders_total,
     snatched_total, verified_at";

/// SQLite-backed book catalog.
pub struct SqliteBookStore {
    conn: Mutex<Connection>,
}

impl SqliteBookStore {
    /// Open (or create) the database file and its tables.
    pub fn new(path: &Path) -> Result<Self, CatalogError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite catalog (useful for testing).
    pub fn in_memory() -> Result<Self, CatalogError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), CatalogError> {
        conn.execute_batch(
            r#"
            -- One row per local book; verification columns hold the latest result
            CREATE TABLE IF NOT EXISTS master_books (
                detail_url TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                author TEXT,
                co_author TEXT,
                series_name TEXT,
                filetypes TEXT,
                size TEXT,
                tags TEXT,
                torrent_url TEXT,
                imported_at TEXT NOT NULL,

                match_status TEXT,
                group_ids TEXT,
                group_name TEXT,
                formats TEXT,
                seeders_total INTEGER,
                snatched_total INTEGER,
                verified_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_master_books_status ON master_books(match_status);
            CREATE INDEX IF NOT EXISTS idx_master_books_series ON master_books(series_name);
            CREATE INDEX IF NOT EXISTS idx_master_books_title ON master_books(title);
            "#,
        )?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, CatalogError> {
        self.conn
            .lock()
            .map_err(|_| CatalogError::Internal("connection lock poisoned".to_string()))
    }

    fn row_to_book(row: &rusqlite::Row) -> rusqlite::Result<LocalBook> {
        Ok(LocalBook {
            detail_url: row.get(0)?,
            title: row.get(1)?,
            author: row.get(2)?,
            co_author: row.get(3)?,
            series_name: row.get(4)?,
            filetypes: row.get(5)?,
            size: row.get(6)?,
            tags: row.get(7)?,
            torrent_url: row.get(8)?,
        })
    }

    fn row_to_stored_book(row: &rusqlite::Row) -> rusqlite::Result<StoredBook> {
        let book = Self::row_to_book(row)?;

        let status: Option<String> = row.get(9)?;
        let verification = status
            .and_then(|s| s.parse::<MatchStatus>().ok())
            .map(|status| -> rusqlite::Result<VerificationRecord> {
                Ok(VerificationRecord {
                    status,
                    group_ids: row.get(10)?,
                    group_name: row.get(11)?,
                    formats: row.get(12)?,
                    seeders_total: row.get::<_, Option<i64>>(13)?.map(|n| n.max(0) as u64),
                    snatched_total: row.get::<_, Option<i64>>(14)?.map(|n| n.max(0) as u64),
                })
            })
            .transpose()?;

        let verified_at = row
            .get::<_, Option<String>>(15)?
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Ok(StoredBook {
            book,
            verification,
            verified_at,
        })
    }
}

/// Substring pattern for `LIKE ... ESCAPE '\'`; user text never acts as a wildcard.
fn like_pattern(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len() + 2);
    escaped.push('%');
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn counter_to_sql(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl BookStore for SqliteBookStore {
    fn upsert_books(&self, books: &[LocalBook]) -> Result<ImportSummary, CatalogError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let now_str = Utc::now().to_rfc3339();
        let mut summary = ImportSummary::default();

        for book in books {
            if book.detail_url.trim().is_empty() {
                summary.skipped += 1;
                continue;
            }

            let exists = tx
                .query_row(
                    "SELECT 1 FROM master_books WHERE detail_url = ?",
                    params![&book.detail_url],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();

            tx.execute(
                "INSERT INTO master_books (detail_url, title, author, co_author, series_name,
                                           filetypes, size, tags, torrent_url, imported_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(detail_url) DO UPDATE SET
                    title = excluded.title,
                    author = excluded.author,
                    co_author = excluded.co_author,
                    series_name = excluded.series_name,
                    filetypes = excluded.filetypes,
                    size = excluded.size,
                    tags = excluded.tags,
                    torrent_url = excluded.torrent_url",
                params![
                    &book.detail_url,
                    &book.title,
                    &book.author,
                    &book.co_author,
                    &book.series_name,
                    &book.filetypes,
                    &book.size,
                    &book.tags,
                    &book.torrent_url,
                    &now_str,
                ],
            )?;

            if exists {
                summary.updated += 1;
            } else {
                summary.imported += 1;
            }
        }

        tx.commit()?;
        debug!(
            imported = summary.imported,
            updated = summary.updated,
            skipped = summary.skipped,
            "Books upserted"
        );
        Ok(summary)
    }

    fn books_to_verify(
        &self,
        force: bool,
        limit: Option<usize>,
    ) -> Result<Vec<LocalBook>, CatalogError> {
        let conn = self.conn()?;
        let filter = if force {
            ""
        } else {
            "WHERE match_status IS NULL"
        };
        let limit = limit.map(|n| n as i64).unwrap_or(-1);

        let sql = format!(
            "SELECT {} FROM master_books {} ORDER BY title, detail_url LIMIT ?",
            BOOK_COLUMNS, filter
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![limit], Self::row_to_book)?;

        let mut books = Vec::new();
        for row in rows {
            books.push(row?);
        }
        Ok(books)
    }

    fn record_verification(
        &self,
        detail_url: &str,
        record: &VerificationRecord,
        verified_at: DateTime<Utc>,
    ) -> Result<(), CatalogError> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE master_books SET
                match_status = ?, group_ids = ?, group_name = ?, formats = ?,
                seeders_total = ?, snatched_total = ?, verified_at = ?
             WHERE detail_url = ?",
            params![
                record.status.as_str(),
                &record.group_ids,
                &record.group_name,
                &record.formats,
                record.seeders_total.map(counter_to_sql),
                record.snatched_total.map(counter_to_sql),
                verified_at.to_rfc3339(),
                detail_url,
            ],
        )?;

        if changed == 0 {
            return Err(CatalogError::NotFound(detail_url.to_string()));
        }
        Ok(())
    }

    fn get(&self, detail_url: &str) -> Result<StoredBook, CatalogError> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM master_books WHERE detail_url = ?", BOOK_COLUMNS);

        conn.query_row(&sql, params![detail_url], Self::row_to_stored_book)
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    CatalogError::NotFound(detail_url.to_string())
                }
                _ => CatalogError::Database(e.to_string()),
            })
    }

    fn list(&self, filter: &BookFilter) -> Result<Vec<StoredBook>, CatalogError> {
        let conn = self.conn()?;
        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();

        if let Some(status) = filter.status {
            clauses.push("match_status = ?");
            values.push(SqlValue::Text(status.as_str().to_string()));
        }
        if let Some(series) = &filter.series {
            clauses.push("series_name = ?");
            values.push(SqlValue::Text(series.clone()));
        }
        if let Some(format) = &filter.format {
            clauses.push("filetypes LIKE ? ESCAPE '\\'");
            values.push(SqlValue::Text(like_pattern(format)));
        }
        if let Some(search) = &filter.search {
            clauses.push("(title LIKE ? ESCAPE '\\' OR author LIKE ? ESCAPE '\\')");
            values.push(SqlValue::Text(like_pattern(search)));
            values.push(SqlValue::Text(like_pattern(search)));
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };
        values.push(SqlValue::Integer(
            filter.limit.map(i64::from).unwrap_or(-1),
        ));

        let sql = format!(
            "SELECT {} FROM master_books {} ORDER BY series_name, title LIMIT ?",
            BOOK_COLUMNS, where_clause
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), Self::row_to_stored_book)?;

        let mut books = Vec::new();
        for row in rows {
            books.push(row?);
        }
        Ok(books)
    }

    fn stats(&self) -> Result<CatalogStats, CatalogError> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT match_status, COUNT(*) FROM master_books GROUP BY match_status")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, Option<String>>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut stats = CatalogStats::default();
        for row in rows {
            let (status, count) = row?;
            let count = count.max(0) as u64;
            stats.total += count;
            match status.and_then(|s| s.parse::<MatchStatus>().ok()) {
                Some(status) => stats.add(status, count),
                None => stats.unverified += count,
            }
        }
        Ok(stats)
    }

    fn clear_verifications(&self) -> Result<u64, CatalogError> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE master_books SET
                match_status = NULL, group_ids = NULL, group_name = NULL, formats = NULL,
                seeders_total = NULL, snatched_total = NULL, verified_at = NULL
             WHERE match_status IS NOT NULL",
            [],
        )?;
        Ok(changed as u64)
    }
}
