//! Data model shared by the matcher, the classifier and their collaborators.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Format tokens detected inside release names.
pub const KNOWN_FORMATS: [&str; 6] = ["EPUB", "PDF", "MOBI", "AZW3", "CBR", "CBZ"];

/// Keys tried, in order, when reading a name out of a structured artist record.
pub const ARTIST_NAME_KEYS: [&str; 4] = ["name", "Name", "artist", "Artist"];

/// Separator for joined ids and formats.
pub const LIST_SEPARATOR: &str = ";";

/// Separator for joined group names of an ambiguous result.
pub const NAME_SEPARATOR: &str = " | ";

/// Maximum group names kept on an ambiguous result.
pub const MAX_AMBIGUOUS_NAMES: usize = 3;

/// A local catalog entry as seen by the matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalItem {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl LocalItem {
    pub fn new(title: impl Into<String>, author: Option<&str>) -> Self {
        Self {
            title: title.into(),
            author: author.map(str::to_string),
        }
    }

    /// Author with blank values folded into `None`.
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref().filter(|a| !a.trim().is_empty())
    }
}

/// An artist entry on a remote group.
///
/// Remote payloads carry either a bare name or a record whose name lives under
/// one of [`ARTIST_NAME_KEYS`]. Anything else is kept but never matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArtistRef {
    Plain(String),
    Structured(Map<String, Value>),
    Unrecognized(Value),
}

impl ArtistRef {
    /// Resolve the display name, if any.
    ///
    /// Structured records use the first present key among [`ARTIST_NAME_KEYS`].
    /// String values are taken as-is; numbers and booleans are rendered.
    pub fn name(&self) -> Option<String> {
        match self {
            ArtistRef::Plain(name) => Some(name.clone()),
            ArtistRef::Structured(record) => ARTIST_NAME_KEYS
                .iter()
                .find_map(|key| record.get(*key))
                .and_then(value_as_text),
            ArtistRef::Unrecognized(_) => None,
        }
    }
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A single torrent inside a remote group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTorrent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub torrent_name: Option<String>,
    #[serde(default)]
    pub seeders: u64,
    #[serde(default)]
    pub snatched: u64,
}

impl RemoteTorrent {
    /// Release title, falling back to the torrent name.
    pub fn display_name(&self) -> &str {
        self.release_title
            .as_deref()
            .or(self.torrent_name.as_deref())
            .unwrap_or("")
    }

    /// Uppercased explicit format plus format tokens found in the name.
    pub fn formats(&self) -> BTreeSet<String> {
        let mut formats = BTreeSet::new();

        if let Some(format) = self.format.as_deref().map(str::trim) {
            if !format.is_empty() {
                formats.insert(format.to_uppercase());
            }
        }

        let name = self.display_name().to_lowercase();
        for token in KNOWN_FORMATS {
            if name.contains(&token.to_lowercase()) {
                formats.insert(token.to_string());
            }
        }

        formats
    }
}

/// A release group on the remote tracker, as parsed from a search response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteGroup {
    pub group_id: u64,
    #[serde(default)]
    pub group_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artists: Option<Vec<ArtistRef>>,
    #[serde(default)]
    pub torrents: Vec<RemoteTorrent>,
}

impl RemoteGroup {
    /// Artist entries; absent and empty are the same to callers.
    pub fn artists(&self) -> &[ArtistRef] {
        self.artists.as_deref().unwrap_or(&[])
    }

    /// True when the remote side carries no author metadata at all.
    pub fn has_artist_metadata(&self) -> bool {
        !self.artists().is_empty()
    }
}

/// Aggregated view of a group that passed matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub group_id: u64,
    pub group_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u32>,
    pub formats: BTreeSet<String>,
    pub seeders_total: u64,
    pub snatched_total: u64,
}

impl MatchResult {
    /// Aggregate formats and counters across the group's torrents.
    pub fn from_group(group: &RemoteGroup) -> Self {
        let mut formats = BTreeSet::new();
        let mut seeders_total = 0u64;
        let mut snatched_total = 0u64;

        for torrent in &group.torrents {
            formats.extend(torrent.formats());
            seeders_total = seeders_total.saturating_add(torrent.seeders);
            snatched_total = snatched_total.saturating_add(torrent.snatched);
        }

        Self {
            group_id: group.group_id,
            group_name: group.group_name.clone(),
            category_id: group.category_id,
            formats,
            seeders_total,
            snatched_total,
        }
    }
}

/// Outcome of verifying one local item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Exactly one strong match.
    Match,
    /// No strong match; the item is an upload candidate.
    NoMatch,
    /// Two or more strong matches; needs manual review.
    Ambiguous,
    /// The remote search itself failed.
    Error,
}

impl MatchStatus {
    pub const ALL: [MatchStatus; 4] = [
        MatchStatus::Match,
        MatchStatus::NoMatch,
        MatchStatus::Ambiguous,
        MatchStatus::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Match => "match",
            MatchStatus::NoMatch => "no_match",
            MatchStatus::Ambiguous => "ambiguous",
            MatchStatus::Error => "error",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "match" => Ok(MatchStatus::Match),
            "no_match" => Ok(MatchStatus::NoMatch),
            "ambiguous" => Ok(MatchStatus::Ambiguous),
            "error" => Ok(MatchStatus::Error),
            other => Err(format!("unknown match status: {}", other)),
        }
    }
}

/// Per-item verification output.
///
/// For `no_match` and `error` every group field is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub status: MatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_ids: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formats: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seeders_total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snatched_total: Option<u64>,
}

impl VerificationRecord {
    fn empty(status: MatchStatus) -> Self {
        Self {
            status,
            group_ids: None,
            group_name: None,
            formats: None,
            seeders_total: None,
            snatched_total: None,
        }
    }

    pub fn no_match() -> Self {
        Self::empty(MatchStatus::NoMatch)
    }

    pub fn error() -> Self {
        Self::empty(MatchStatus::Error)
    }

    /// Record for exactly one strong match.
    pub fn single(matched: &MatchResult) -> Self {
        Self {
            status: MatchStatus::Match,
            group_ids: Some(matched.group_id.to_string()),
            group_name: Some(matched.group_name.clone()),
            formats: join_formats(&matched.formats),
            seeders_total: Some(matched.seeders_total),
            snatched_total: Some(matched.snatched_total),
        }
    }

    /// Record aggregated over two or more strong matches, in candidate order.
    pub fn ambiguous(matches: &[MatchResult]) -> Self {
        let group_ids = matches
            .iter()
            .map(|m| m.group_id.to_string())
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR);

        let group_name = matches
            .iter()
            .take(MAX_AMBIGUOUS_NAMES)
            .map(|m| m.group_name.as_str())
            .collect::<Vec<_>>()
            .join(NAME_SEPARATOR);

        let formats: BTreeSet<String> = matches
            .iter()
            .flat_map(|m| m.formats.iter().cloned())
            .collect();

        Self {
            status: MatchStatus::Ambiguous,
            group_ids: Some(group_ids),
            group_name: Some(group_name),
            formats: join_formats(&formats),
            seeders_total: Some(
                matches
                    .iter()
                    .fold(0u64, |acc, m| acc.saturating_add(m.seeders_total)),
            ),
            snatched_total: Some(
                matches
                    .iter()
                    .fold(0u64, |acc, m| acc.saturating_add(m.snatched_total)),
            ),
        }
    }
}

fn join_formats(formats: &BTreeSet<String>) -> Option<String> {
    if formats.is_empty() {
        None
    } else {
        Some(
            formats
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(LIST_SEPARATOR),
        )
    }
}
