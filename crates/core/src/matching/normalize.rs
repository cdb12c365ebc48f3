//! Text canonicalization for titles, author names and remote group names.
//!
//! Everything is reduced to lowercase `[a-z0-9]` words separated by single
//! spaces so that plain substring containment can be used for matching.

use once_cell::sync::Lazy;
use regex_lite::Regex;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Default number of title words used as a fingerprint.
pub const DEFAULT_TITLE_PREFIX_WORDS: usize = 5;

/// Lowercase, replace every non-alphanumeric run with a space, collapse
/// whitespace and trim.
///
/// Total and idempotent: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }

    let lowered = s.to_lowercase();
    let spaced = NON_ALNUM.replace_all(&lowered, " ");
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize an optional value; absent input yields the empty string.
pub fn normalize_opt(s: Option<&str>) -> String {
    s.map(normalize).unwrap_or_default()
}

/// First `words` normalized words of a title, joined with single spaces.
///
/// A title with fewer words yields all of them.
pub fn title_prefix(title: &str, words: usize) -> String {
    normalize(title)
        .split(' ')
        .filter(|w| !w.is_empty())
        .take(words)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalized last whitespace-delimited token of an author name.
///
/// Handles "First Last" order only. A trailing `,` or `.` on the last token is
/// stripped before normalizing, so "Smith," becomes "smith".
pub fn author_last_name(author: &str) -> String {
    let Some(last) = author.split_whitespace().last() else {
        return String::new();
    };

    normalize(last.trim_end_matches([',', '.']))
}
