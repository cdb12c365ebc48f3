//! Rule-based strong-match predicate for a single remote group.
//!
//! Three gates are applied in order and the first failure short-circuits:
//! 1. Category: the group must carry the configured e-book category id.
//! 2. Title: the local title prefix must occur inside the normalized group name.
//! 3. Author: the local author's last name must occur inside the group name or
//!    one of its artist names. When the remote side carries no artist metadata
//!    at all the gate passes on the title alone.

use serde::Serialize;
use tracing::debug;

use super::config::MatchConfig;
use super::normalize::{author_last_name, normalize, title_prefix};
use super::types::RemoteGroup;

/// Why the author gate passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "artist", rename_all = "snake_case")]
pub enum AuthorEvidence {
    /// No usable local author, so nothing to check.
    NotRequired,
    /// Last name found in the group name.
    GroupName,
    /// Last name found in this artist's name.
    Artist(String),
    /// Remote group has no artist metadata to contradict the title match.
    NoRemoteMetadata,
}

/// The first gate a group failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "gate", rename_all = "snake_case")]
pub enum GateFailure {
    Category { found: Option<u32> },
    EmptyTitlePrefix,
    EmptyGroupName,
    TitlePrefixMissing { prefix: String },
    AuthorMissing { last_name: String },
}

/// Gate-level outcome for one (local item, remote group) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum MatchVerdict {
    Strong { author: AuthorEvidence },
    Rejected(GateFailure),
}

impl MatchVerdict {
    pub fn is_strong(&self) -> bool {
        matches!(self, MatchVerdict::Strong { .. })
    }
}

/// Evaluate every gate for `group` and report which one decided.
pub fn evaluate(
    title: &str,
    author: Option<&str>,
    group: &RemoteGroup,
    config: &MatchConfig,
) -> MatchVerdict {
    if group.category_id != Some(config.ebook_category_id) {
        return MatchVerdict::Rejected(GateFailure::Category {
            found: group.category_id,
        });
    }

    let prefix = title_prefix(title, config.title_prefix_words);
    if prefix.is_empty() {
        return MatchVerdict::Rejected(GateFailure::EmptyTitlePrefix);
    }
    if group.group_name.is_empty() {
        return MatchVerdict::Rejected(GateFailure::EmptyGroupName);
    }

    let group_name = normalize(&group.group_name);
    if !group_name.contains(&prefix) {
        return MatchVerdict::Rejected(GateFailure::TitlePrefixMissing { prefix });
    }

    match author_gate(author, &group_name, group) {
        Ok(evidence) => MatchVerdict::Strong { author: evidence },
        Err(failure) => MatchVerdict::Rejected(failure),
    }
}

fn author_gate(
    author: Option<&str>,
    normalized_group_name: &str,
    group: &RemoteGroup,
) -> Result<AuthorEvidence, GateFailure> {
    let last_name = author.map(author_last_name).unwrap_or_default();
    if last_name.is_empty() {
        return Ok(AuthorEvidence::NotRequired);
    }

    if normalized_group_name.contains(&last_name) {
        return Ok(AuthorEvidence::GroupName);
    }

    let artist_hit = group
        .artists()
        .iter()
        .filter_map(|artist| artist.name())
        .find(|name| normalize(name).contains(&last_name));
    if let Some(name) = artist_hit {
        return Ok(AuthorEvidence::Artist(name));
    }

    if !group.has_artist_metadata() {
        return Ok(AuthorEvidence::NoRemoteMetadata);
    }

    Err(GateFailure::AuthorMissing { last_name })
}

/// True iff `group` passes the category, title and author gates.
pub fn is_strong_match(
    title: &str,
    author: Option<&str>,
    group: &RemoteGroup,
    config: &MatchConfig,
) -> bool {
    evaluate(title, author, group, config).is_strong()
}

/// Decides whether a remote group is the same work as a local item.
///
/// Implementations must be pure: the verdict depends only on the arguments.
pub trait GroupMatcher: Send + Sync {
    /// Name of this matcher, used in logs.
    fn name(&self) -> &str;

    fn evaluate(
        &self,
        title: &str,
        author: Option<&str>,
        group: &RemoteGroup,
        config: &MatchConfig,
    ) -> MatchVerdict;

    fn is_strong_match(
        &self,
        title: &str,
        author: Option<&str>,
        group: &RemoteGroup,
        config: &MatchConfig,
    ) -> bool {
        self.evaluate(title, author, group, config).is_strong()
    }
}

/// The category/title/author gate matcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleMatcher;

impl RuleMatcher {
    pub fn new() -> Self {
        Self
    }
}

impl GroupMatcher for RuleMatcher {
    fn name(&self) -> &str {
        "rules"
    }

    fn evaluate(
        &self,
        title: &str,
        author: Option<&str>,
        group: &RemoteGroup,
        config: &MatchConfig,
    ) -> MatchVerdict {
        let verdict = evaluate(title, author, group, config);
        if let MatchVerdict::Rejected(failure) = &verdict {
            debug!(
                group_id = group.group_id,
                group_name = %group.group_name,
                ?failure,
                "Group rejected"
            );
        }
        verdict
    }
}
