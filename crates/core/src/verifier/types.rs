//! Types for verification runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::matching::{CandidateVerdict, MatchStatus, VerificationRecord};

/// Errors that can occur while verifying.
#[derive(Debug, Error)]
pub enum VerifierError {
    /// Another run holds the verifier.
    #[error("a verification run is already in progress")]
    AlreadyRunning,

    /// Catalog error while loading books.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
}

/// Options for a batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunOptions {
    /// Re-verify books that already have a result.
    #[serde(default)]
    pub force_reverify: bool,
    /// Stop after this many books.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_books: Option<usize>,
}

/// Outcome of a finished batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub force_reverify: bool,
    /// Books processed.
    pub total: u64,
    pub matched: u64,
    pub no_match: u64,
    pub ambiguous: u64,
    pub error: u64,
    /// Books whose result could not be saved.
    pub persist_failures: u64,
}

impl RunSummary {
    pub(crate) fn new(run_id: String, started_at: DateTime<Utc>, force_reverify: bool) -> Self {
        Self {
            run_id,
            started_at,
            finished_at: started_at,
            force_reverify,
            total: 0,
            matched: 0,
            no_match: 0,
            ambiguous: 0,
            error: 0,
            persist_failures: 0,
        }
    }

    pub(crate) fn record(&mut self, status: MatchStatus) {
        self.total += 1;
        match status {
            MatchStatus::Match => self.matched += 1,
            MatchStatus::NoMatch => self.no_match += 1,
            MatchStatus::Ambiguous => self.ambiguous += 1,
            MatchStatus::Error => self.error += 1,
        }
    }

    pub fn count(&self, status: MatchStatus) -> u64 {
        match status {
            MatchStatus::Match => self.matched,
            MatchStatus::NoMatch => self.no_match,
            MatchStatus::Ambiguous => self.ambiguous,
            MatchStatus::Error => self.error,
        }
    }
}

/// Progress of the run in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunProgress {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub processed: u64,
    pub total: u64,
}

/// Current state of the verifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifierStatus {
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<RunProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_summary: Option<RunSummary>,
}

/// Per-candidate breakdown for one lookup.
#[derive(Debug, Clone, Serialize)]
pub struct ExplainReport {
    pub query: String,
    pub candidates: Vec<CandidateVerdict>,
    pub record: VerificationRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_options_defaults() {
        let options: RunOptions = serde_json::from_str("{}").unwrap();
        assert!(!options.force_reverify);
        assert!(options.max_books.is_none());
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = RunSummary::new("run-1".to_string(), Utc::now(), false);
        summary.record(MatchStatus::Match);
        summary.record(MatchStatus::NoMatch);
        summary.record(MatchStatus::NoMatch);
        summary.record(MatchStatus::Error);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.count(MatchStatus::NoMatch), 2);
        assert_eq!(summary.count(MatchStatus::Ambiguous), 0);
    }

    #[test]
    fn test_status_serialization_skips_empty() {
        let json = serde_json::to_string(&VerifierStatus::default()).unwrap();
        assert_eq!(json, r#"{"running":false}"#);
    }
}
