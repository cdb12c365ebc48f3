//! Verifier - checks local books against the remote tracker.
//!
//! Runs the search for each book, classifies the candidates and writes the
//! outcome back to the catalog. One batch run at a time; per-item search
//! failures become `error` records and never stop a run.

mod config;
mod runner;
mod types;

pub use config::VerifierConfig;
pub use runner::Verifier;
pub use types::*;
