pub mod catalog;
pub mod config;
pub mod export;
pub mod matching;
pub mod metrics;
pub mod testing;
pub mod tracker;
pub mod verifier;

pub use catalog::{
    BookFilter, BookStore, CatalogError, CatalogStats, ImportSummary, LocalBook,
    SqliteBookStore, StoredBook,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use export::{export_csv, ExportError, ExportKind};
pub use matching::{
    Classifier, LocalItem, MatchConfig, MatchResult, MatchStatus, RemoteGroup, RemoteTorrent,
    VerificationRecord,
};
pub use tracker::{GazelleClient, TrackerError, TrackerSearch};
pub use verifier::{RunOptions, RunSummary, Verifier, VerifierError, VerifierStatus};
