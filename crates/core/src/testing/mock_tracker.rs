//! Mock tracker for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::matching::RemoteGroup;
use crate::tracker::{TrackerError, TrackerSearch};

/// A recorded search for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSearch {
    /// The query string that was sent.
    pub query: String,
    /// When the search was made.
    pub timestamp: Instant,
}

/// Mock implementation of the TrackerSearch trait.
///
/// Provides controllable behavior for testing:
/// - Return configured groups, per query or as a fallback
/// - Track search queries for assertions
/// - Simulate failures for single queries or the next search
///
/// # Example
///
/// ```rust,ignore
/// use shelfcheck_core::testing::{MockTracker, fixtures};
///
/// let tracker = MockTracker::new();
/// tracker
///     .set_groups_for("Dune", vec![fixtures::ebook_group(1, "Dune", "Frank Herbert")])
///     .await;
///
/// let groups = tracker.search_ebooks("Dune").await?;
/// assert_eq!(groups.len(), 1);
/// assert_eq!(tracker.search_count().await, 1);
/// ```
#[derive(Debug)]
pub struct MockTracker {
    /// Groups returned for queries without a specific entry.
    default_groups: Arc<RwLock<Vec<RemoteGroup>>>,
    /// Groups returned for exact query strings.
    groups_by_query: Arc<RwLock<HashMap<String, Vec<RemoteGroup>>>>,
    /// Queries that always fail, with the message to fail with.
    failing_queries: Arc<RwLock<HashMap<String, String>>>,
    /// Recorded searches.
    searches: Arc<RwLock<Vec<RecordedSearch>>>,
    /// If set, the next search will fail with this error.
    next_error: Arc<RwLock<Option<TrackerError>>>,
}

impl Default for MockTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTracker {
    /// Create a mock tracker that finds nothing.
    pub fn new() -> Self {
        Self {
            default_groups: Arc::new(RwLock::new(Vec::new())),
            groups_by_query: Arc::new(RwLock::new(HashMap::new())),
            failing_queries: Arc::new(RwLock::new(HashMap::new())),
            searches: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the groups returned for any query without its own entry.
    pub async fn set_groups(&self, groups: Vec<RemoteGroup>) {
        *self.default_groups.write().await = groups;
    }

    /// Set the groups returned for one exact query.
    pub async fn set_groups_for(&self, query: &str, groups: Vec<RemoteGroup>) {
        self.groups_by_query
            .write()
            .await
            .insert(query.to_string(), groups);
    }

    /// Make every search for `query` fail with an HTTP error.
    pub async fn fail_query(&self, query: &str, message: &str) {
        self.failing_queries
            .write()
            .await
            .insert(query.to_string(), message.to_string());
    }

    /// Configure the next search to fail with the given error.
    pub async fn set_next_error(&self, error: TrackerError) {
        *self.next_error.write().await = Some(error);
    }

    /// Clear any pending error.
    pub async fn clear_next_error(&self) {
        *self.next_error.write().await = None;
    }

    /// Get recorded searches.
    pub async fn recorded_searches(&self) -> Vec<RecordedSearch> {
        self.searches.read().await.clone()
    }

    /// Just the query strings, in order.
    pub async fn recorded_queries(&self) -> Vec<String> {
        self.searches
            .read()
            .await
            .iter()
            .map(|s| s.query.clone())
            .collect()
    }

    /// Clear recorded searches.
    pub async fn clear_recorded(&self) {
        self.searches.write().await.clear();
    }

    /// Get the number of searches performed.
    pub async fn search_count(&self) -> usize {
        self.searches.read().await.len()
    }

    async fn take_error(&self) -> Option<TrackerError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl TrackerSearch for MockTracker {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search_ebooks(&self, query: &str) -> Result<Vec<RemoteGroup>, TrackerError> {
        self.searches.write().await.push(RecordedSearch {
            query: query.to_string(),
            timestamp: Instant::now(),
        });

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        if let Some(message) = self.failing_queries.read().await.get(query) {
            return Err(TrackerError::Http(message.clone()));
        }

        if let Some(groups) = self.groups_by_query.read().await.get(query) {
            return Ok(groups.clone());
        }

        Ok(self.default_groups.read().await.clone())
    }
}
