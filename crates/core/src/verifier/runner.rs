//! Verifier implementation.
//!
//! Looks each local book up on the tracker, classifies the candidates and
//! stores the outcome:
//! - Single items: searched and classified, nothing persisted
//! - Batch runs: sequential over the catalog, one run at a time

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::catalog::BookStore;
use crate::matching::{Classifier, MatchConfig, VerificationRecord};
use crate::metrics;
use crate::tracker::TrackerSearch;

use super::config::VerifierConfig;
use super::types::{
    ExplainReport, RunOptions, RunProgress, RunSummary, VerifierError, VerifierStatus,
};

/// Clears the running flag when a run ends, however it ends.
struct RunGuard {
    running: Arc<AtomicBool>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Verifies local books against the remote tracker.
pub struct Verifier {
    store: Arc<dyn BookStore>,
    tracker: Arc<dyn TrackerSearch>,
    classifier: Classifier,
    match_config: MatchConfig,
    config: VerifierConfig,

    // Runtime state
    running: Arc<AtomicBool>,
    current: Arc<RwLock<Option<RunProgress>>>,
    last_summary: Arc<RwLock<Option<RunSummary>>>,
}

impl Verifier {
    /// Create a new verifier using the rule-based matcher.
    pub fn new(
        store: Arc<dyn BookStore>,
        tracker: Arc<dyn TrackerSearch>,
        match_config: MatchConfig,
        config: VerifierConfig,
    ) -> Self {
        Self::with_classifier(store, tracker, Classifier::default(), match_config, config)
    }

    /// Create a verifier with a custom classifier.
    pub fn with_classifier(
        store: Arc<dyn BookStore>,
        tracker: Arc<dyn TrackerSearch>,
        classifier: Classifier,
        match_config: MatchConfig,
        config: VerifierConfig,
    ) -> Self {
        Self {
            store,
            tracker,
            classifier,
            match_config,
            config,
            running: Arc::new(AtomicBool::new(false)),
            current: Arc::new(RwLock::new(None)),
            last_summary: Arc::new(RwLock::new(None)),
        }
    }

    /// Verify one title/author pair.
    ///
    /// Never fails: a search error becomes an `error` record.
    pub async fn verify_item(&self, title: &str, author: Option<&str>) -> VerificationRecord {
        let record = if title.trim().is_empty() {
            debug!("Blank title, not searching");
            VerificationRecord::no_match()
        } else {
            match self.tracker.search_ebooks(title).await {
                Ok(groups) => {
                    self.classifier
                        .classify(title, author, Some(&groups), &self.match_config)
                }
                Err(e) => {
                    warn!(
                        tracker = self.tracker.name(),
                        title = %title,
                        error = %e,
                        "Search failed"
                    );
                    self.classifier
                        .classify(title, author, None, &self.match_config)
                }
            }
        };

        metrics::VERIFICATIONS_TOTAL
            .with_label_values(&[record.status.as_str()])
            .inc();

        record
    }

    /// Search and report the verdict for every candidate.
    pub async fn explain(&self, title: &str, author: Option<&str>) -> ExplainReport {
        if title.trim().is_empty() {
            return ExplainReport {
                query: title.to_string(),
                candidates: Vec::new(),
                record: VerificationRecord::no_match(),
                search_error: None,
            };
        }

        match self.tracker.search_ebooks(title).await {
            Ok(groups) => {
                let (candidates, record) =
                    self.classifier
                        .explain(title, author, &groups, &self.match_config);
                ExplainReport {
                    query: title.to_string(),
                    candidates,
                    record,
                    search_error: None,
                }
            }
            Err(e) => ExplainReport {
                query: title.to_string(),
                candidates: Vec::new(),
                record: VerificationRecord::error(),
                search_error: Some(e.to_string()),
            },
        }
    }

    /// Run a batch over the catalog and wait for it to finish.
    pub async fn run(&self, options: RunOptions) -> Result<RunSummary, VerifierError> {
        let guard = self.begin()?;
        let run_id = uuid::Uuid::new_v4().to_string();
        self.execute(guard, run_id, options).await
    }

    /// Start a batch in the background. Returns the run id.
    pub fn start_run(self: &Arc<Self>, options: RunOptions) -> Result<String, VerifierError> {
        let guard = self.begin()?;
        let run_id = uuid::Uuid::new_v4().to_string();

        let verifier = Arc::clone(self);
        let id = run_id.clone();
        tokio::spawn(async move {
            if let Err(e) = verifier.execute(guard, id.clone(), options).await {
                error!(run_id = %id, error = %e, "Verification run failed");
            }
        });

        Ok(run_id)
    }

    /// Get current verifier status.
    pub async fn status(&self) -> VerifierStatus {
        VerifierStatus {
            running: self.running.load(Ordering::Relaxed),
            current: self.current.read().await.clone(),
            last_summary: self.last_summary.read().await.clone(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    fn begin(&self) -> Result<RunGuard, VerifierError> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Verification run already in progress");
            return Err(VerifierError::AlreadyRunning);
        }
        Ok(RunGuard {
            running: Arc::clone(&self.running),
        })
    }

    async fn execute(
        &self,
        _guard: RunGuard,
        run_id: String,
        options: RunOptions,
    ) -> Result<RunSummary, VerifierError> {
        let started = Instant::now();
        let started_at = Utc::now();

        let books = self
            .store
            .books_to_verify(options.force_reverify, options.max_books)?;
        let total = books.len() as u64;

        info!(
            run_id = %run_id,
            total,
            force_reverify = options.force_reverify,
            "Starting verification run"
        );

        *self.current.write().await = Some(RunProgress {
            run_id: run_id.clone(),
            started_at,
            processed: 0,
            total,
        });

        let mut summary = RunSummary::new(run_id.clone(), started_at, options.force_reverify);
        let interval = self.config.progress_interval.max(1) as u64;

        for book in &books {
            let record = self.verify_item(&book.title, book.author.as_deref()).await;
            summary.record(record.status);

            if let Err(e) = self
                .store
                .record_verification(&book.detail_url, &record, Utc::now())
            {
                warn!(
                    detail_url = %book.detail_url,
                    error = %e,
                    "Failed to save verification"
                );
                summary.persist_failures += 1;
                metrics::PERSIST_FAILURES.inc();
            }

            if let Some(progress) = self.current.write().await.as_mut() {
                progress.processed = summary.total;
            }

            if summary.total % interval == 0 {
                info!(
                    run_id = %run_id,
                    processed = summary.total,
                    total,
                    matched = summary.matched,
                    ambiguous = summary.ambiguous,
                    errors = summary.error,
                    "Verification progress"
                );
            }
        }

        summary.finished_at = Utc::now();
        metrics::RUN_DURATION
            .with_label_values(&[])
            .observe(started.elapsed().as_secs_f64());

        info!(
            run_id = %run_id,
            total = summary.total,
            matched = summary.matched,
            no_match = summary.no_match,
            ambiguous = summary.ambiguous,
            errors = summary.error,
            persist_failures = summary.persist_failures,
            "Verification run finished"
        );

        *self.current.write().await = None;
        *self.last_summary.write().await = Some(summary.clone());

        Ok(summary)
    }
}
