//! Reduce a candidate list into one verification record.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::config::MatchConfig;
use super::matcher::{GroupMatcher, MatchVerdict, RuleMatcher};
use super::types::{MatchResult, RemoteGroup, VerificationRecord};

/// Verdict for one candidate, as reported by [`Classifier::explain`].
#[derive(Debug, Clone, Serialize)]
pub struct CandidateVerdict {
    pub group_id: u64,
    pub group_name: String,
    #[serde(flatten)]
    pub verdict: MatchVerdict,
}

/// Applies a [`GroupMatcher`] to every candidate and reduces the strong
/// matches to a single status.
///
/// Holds no mutable state; one instance can serve concurrent callers.
#[derive(Clone)]
pub struct Classifier {
    matcher: Arc<dyn GroupMatcher>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Arc::new(RuleMatcher::new()))
    }
}

impl Classifier {
    pub fn new(matcher: Arc<dyn GroupMatcher>) -> Self {
        Self { matcher }
    }

    pub fn matcher_name(&self) -> &str {
        self.matcher.name()
    }

    /// Classify one local item against the outcome of its search.
    ///
    /// `candidates` is `None` when the search failed, which is the only way
    /// to get an `error` record. A blank title is `no_match` and the matcher
    /// is never consulted.
    pub fn classify(
        &self,
        title: &str,
        author: Option<&str>,
        candidates: Option<&[RemoteGroup]>,
        config: &MatchConfig,
    ) -> VerificationRecord {
        if title.trim().is_empty() {
            debug!("Blank title, skipping candidates");
            return VerificationRecord::no_match();
        }

        let Some(candidates) = candidates else {
            return VerificationRecord::error();
        };

        let matches: Vec<MatchResult> = candidates
            .iter()
            .filter(|group| self.matcher.is_strong_match(title, author, group, config))
            .map(MatchResult::from_group)
            .collect();

        let record = reduce(&matches);
        info!(
            title = %title,
            candidates = candidates.len(),
            strong_matches = matches.len(),
            status = %record.status,
            "Classified item"
        );
        record
    }

    /// Per-candidate gate verdicts alongside the resulting record.
    pub fn explain(
        &self,
        title: &str,
        author: Option<&str>,
        candidates: &[RemoteGroup],
        config: &MatchConfig,
    ) -> (Vec<CandidateVerdict>, VerificationRecord) {
        let verdicts = if title.trim().is_empty() {
            Vec::new()
        } else {
            candidates
                .iter()
                .map(|group| CandidateVerdict {
                    group_id: group.group_id,
                    group_name: group.group_name.clone(),
                    verdict: self.matcher.evaluate(title, author, group, config),
                })
                .collect()
        };

        let record = self.classify(title, author, Some(candidates), config);
        (verdicts, record)
    }
}

/// Reduce the ordered strong matches by count.
pub fn reduce(matches: &[MatchResult]) -> VerificationRecord {
    match matches {
        [] => VerificationRecord::no_match(),
        [single] => VerificationRecord::single(single),
        many => VerificationRecord::ambiguous(many),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::types::{MatchStatus, RemoteTorrent};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Matcher that counts calls and delegates to the rules.
    struct SpyMatcher {
        calls: AtomicUsize,
    }

    impl SpyMatcher {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl GroupMatcher for SpyMatcher {
        fn name(&self) -> &str {
            "spy"
        }

        fn evaluate(
            &self,
            title: &str,
            author: Option<&str>,
            group: &RemoteGroup,
            config: &MatchConfig,
        ) -> MatchVerdict {
            self.calls.fetch_add(1, Ordering::SeqCst);
            crate::matching::matcher::evaluate(title, author, group, config)
        }
    }

    fn torrent(format: &str, seeders: u64, snatched: u64) -> RemoteTorrent {
        RemoteTorrent {
            format: Some(format.to_string()),
            release_title: Some(format!("release.{}", format.to_lowercase())),
            torrent_name: None,
            seeders,
            snatched,
        }
    }

    fn group(id: u64, name: &str, torrents: Vec<RemoteTorrent>) -> RemoteGroup {
        RemoteGroup {
            group_id: id,
            group_name: name.to_string(),
            category_id: Some(3),
            artists: None,
            torrents,
        }
    }

    const TITLE: &str = "Dune";

    #[test]
    fn test_zero_candidates_is_no_match() {
        let classifier = Classifier::default();
        let record = classifier.classify(TITLE, None, Some(&[]), &MatchConfig::default());
        assert_eq!(record, VerificationRecord::no_match());
    }

    #[test]
    fn test_zero_strong_matches_is_no_match() {
        let classifier = Classifier::default();
        let candidates = vec![group(1, "Foundation", vec![]), group(2, "Hyperion", vec![])];
        let record =
            classifier.classify(TITLE, None, Some(&candidates), &MatchConfig::default());
        assert_eq!(record.status, MatchStatus::NoMatch);
        assert!(record.group_ids.is_none());
    }

    #[test]
    fn test_single_strong_match() {
        let classifier = Classifier::default();
        let candidates = vec![
            group(1, "Foundation", vec![]),
            group(42, "Dune by Frank Herbert", vec![torrent("EPUB", 3, 7), torrent("PDF", 1, 1)]),
        ];
        let record =
            classifier.classify(TITLE, Some("Frank Herbert"), Some(&candidates), &MatchConfig::default());

        assert_eq!(record.status, MatchStatus::Match);
        assert_eq!(record.group_ids.as_deref(), Some("42"));
        assert_eq!(record.group_name.as_deref(), Some("Dune by Frank Herbert"));
        assert_eq!(record.formats.as_deref(), Some("EPUB;PDF"));
        assert_eq!(record.seeders_total, Some(4));
        assert_eq!(record.snatched_total, Some(8));
    }

    #[test]
    fn test_ambiguous_aggregates_matches() {
        let classifier = Classifier::default();
        let candidates = vec![
            group(10, "Dune", vec![torrent("PDF", 1, 2)]),
            group(11, "Ignored", vec![torrent("CBZ", 100, 100)]),
            group(12, "Dune Messiah", vec![torrent("EPUB", 2, 3)]),
            group(13, "Dune (Illustrated)", vec![torrent("EPUB", 0, 1)]),
            group(14, "Dune: Deluxe", vec![torrent("MOBI", 5, 5)]),
        ];
        let record = classifier.classify(TITLE, None, Some(&candidates), &MatchConfig::default());

        assert_eq!(record.status, MatchStatus::Ambiguous);
        assert_eq!(record.group_ids.as_deref(), Some("10;12;13;14"));
        assert_eq!(
            record.group_name.as_deref(),
            Some("Dune | Dune Messiah | Dune (Illustrated)")
        );
        assert_eq!(record.formats.as_deref(), Some("EPUB;MOBI;PDF"));
        assert_eq!(record.seeders_total, Some(8));
        assert_eq!(record.snatched_total, Some(11));
    }

    #[test]
    fn test_ambiguous_counters_saturate() {
        let classifier = Classifier::default();
        let candidates = vec![
            group(20, "Dune", vec![torrent("EPUB", u64::MAX, u64::MAX)]),
            group(21, "Dune", vec![torrent("PDF", u64::MAX, 1)]),
        ];
        let record = classifier.classify(TITLE, None, Some(&candidates), &MatchConfig::default());

        assert_eq!(record.status, MatchStatus::Ambiguous);
        assert_eq!(record.seeders_total, Some(u64::MAX));
        assert_eq!(record.snatched_total, Some(u64::MAX));
    }

    #[test]
    fn test_search_failure_is_error() {
        let classifier = Classifier::default();
        let record = classifier.classify(TITLE, Some("Herbert"), None, &MatchConfig::default());
        assert_eq!(record, VerificationRecord::error());
    }

    #[test]
    fn test_empty_title_never_calls_matcher() {
        let spy = Arc::new(SpyMatcher::new());
        let classifier = Classifier::new(spy.clone());
        let candidates = vec![group(1, "Dune", vec![]), group(2, "Anything", vec![])];

        for title in ["", "   "] {
            let record =
                classifier.classify(title, Some("Herbert"), Some(&candidates), &MatchConfig::default());
            assert_eq!(record, VerificationRecord::no_match());
        }
        assert_eq!(spy.calls(), 0);
    }

    #[test]
    fn test_spy_sees_every_candidate() {
        let spy = Arc::new(SpyMatcher::new());
        let classifier = Classifier::new(spy.clone());
        let candidates = vec![group(1, "Dune", vec![]), group(2, "Other", vec![])];

        classifier.classify(TITLE, None, Some(&candidates), &MatchConfig::default());
        assert_eq!(spy.calls(), 2);
        assert_eq!(classifier.matcher_name(), "spy");
    }

    #[test]
    fn test_classify_is_reproducible() {
        let classifier = Classifier::default();
        let candidates = vec![group(1, "Dune", vec![torrent("EPUB", 1, 1)])];
        let config = MatchConfig::default();
        let first = classifier.classify(TITLE, None, Some(&candidates), &config);
        let second = classifier.classify(TITLE, None, Some(&candidates), &config);
        assert_eq!(first, second);
    }

    #[test]
    fn test_explain_reports_each_candidate() {
        let classifier = Classifier::default();
        let mut wrong_category = group(2, "Dune", vec![]);
        wrong_category.category_id = Some(1);
        let candidates = vec![group(1, "Dune", vec![]), wrong_category];

        let (verdicts, record) =
            classifier.explain(TITLE, None, &candidates, &MatchConfig::default());
        assert_eq!(verdicts.len(), 2);
        assert!(verdicts[0].verdict.is_strong());
        assert!(!verdicts[1].verdict.is_strong());
        assert_eq!(record.status, MatchStatus::Match);
    }

    #[test]
    fn test_reduce_counts() {
        assert_eq!(reduce(&[]).status, MatchStatus::NoMatch);

        let one = MatchResult::from_group(&group(1, "A", vec![]));
        let two = MatchResult::from_group(&group(2, "B", vec![]));
        assert_eq!(reduce(std::slice::from_ref(&one)).status, MatchStatus::Match);
        assert_eq!(reduce(&[one, two]).status, MatchStatus::Ambiguous);
    }
}
