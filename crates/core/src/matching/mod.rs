//! Title/author matching of local books against remote tracker groups.
//!
//! - [`normalize`]: text canonicalization shared by every rule
//! - [`matcher`]: per-group strong-match gates
//! - [`classifier`]: reduction of a candidate list to a [`MatchStatus`]

pub mod classifier;
mod config;
pub mod matcher;
pub mod normalize;
mod types;

pub use classifier::{reduce, CandidateVerdict, Classifier};
pub use config::MatchConfig;
pub use matcher::{
    evaluate, is_strong_match, AuthorEvidence, GateFailure, GroupMatcher, MatchVerdict,
    RuleMatcher,
};
pub use normalize::{author_last_name, normalize, normalize_opt, title_prefix};
pub use types::*;
