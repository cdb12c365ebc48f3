//! Testing utilities and mock implementations.
//!
//! This module provides a mock tracker plus fixtures for building remote
//! groups and local books, so verification can be tested without network
//! access.
//!
//! # Example
//!
//! ```rust,ignore
//! use shelfcheck_core::testing::{MockTracker, fixtures};
//!
//! let tracker = MockTracker::new();
//! tracker.set_groups(vec![fixtures::ebook_group(1, "Dune", "Frank Herbert")]).await;
//!
//! // Hand it to a Verifier...
//! ```

mod mock_tracker;

pub use mock_tracker::{MockTracker, RecordedSearch};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::LocalBook;
    use crate::matching::{ArtistRef, RemoteGroup, RemoteTorrent};

    /// E-book category id used by the fixtures.
    pub const EBOOK_CATEGORY: u32 = 3;

    /// Create a torrent with an explicit format.
    pub fn torrent(format: &str, release_title: &str, seeders: u64, snatched: u64) -> RemoteTorrent {
        RemoteTorrent {
            format: Some(format.to_string()),
            release_title: Some(release_title.to_string()),
            torrent_name: None,
            seeders,
            snatched,
        }
    }

    /// Create a plain artist entry.
    pub fn artist(name: &str) -> ArtistRef {
        ArtistRef::Plain(name.to_string())
    }

    /// Create an e-book group with one author and a single EPUB torrent.
    pub fn ebook_group(group_id: u64, name: &str, author: &str) -> RemoteGroup {
        RemoteGroup {
            group_id,
            group_name: name.to_string(),
            category_id: Some(EBOOK_CATEGORY),
            artists: Some(vec![artist(author)]),
            torrents: vec![torrent("EPUB", &format!("{} [EPUB]", name), 5, 12)],
        }
    }

    /// Create an e-book group without any artist metadata.
    pub fn anonymous_group(group_id: u64, name: &str) -> RemoteGroup {
        RemoteGroup {
            group_id,
            group_name: name.to_string(),
            category_id: Some(EBOOK_CATEGORY),
            artists: None,
            torrents: vec![torrent("PDF", name, 1, 3)],
        }
    }

    /// Create a group in another category.
    pub fn non_ebook_group(group_id: u64, name: &str, category_id: u32) -> RemoteGroup {
        RemoteGroup {
            category_id: Some(category_id),
            ..ebook_group(group_id, name, "Various")
        }
    }

    /// Create a local book.
    pub fn book(detail_url: &str, title: &str, author: Option<&str>) -> LocalBook {
        let book = LocalBook::new(detail_url, title);
        match author {
            Some(author) => book.with_author(author),
            None => book,
        }
    }
}
