//! Matching configuration.

use serde::{Deserialize, Serialize};

use super::normalize::DEFAULT_TITLE_PREFIX_WORDS;

/// Tunables for the match rules.
///
/// Passed explicitly into every matcher and classifier call so a verdict is
/// fully determined by its arguments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchConfig {
    /// Category id a remote group must carry to be considered at all.
    #[serde(default = "default_ebook_category_id")]
    pub ebook_category_id: u32,

    /// Number of leading normalized title words used as the title fingerprint.
    #[serde(default = "default_title_prefix_words")]
    pub title_prefix_words: usize,
}

fn default_ebook_category_id() -> u32 {
    3
}

fn default_title_prefix_words() -> usize {
    DEFAULT_TITLE_PREFIX_WORDS
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            ebook_category_id: default_ebook_category_id(),
            title_prefix_words: default_title_prefix_words(),
        }
    }
}

impl MatchConfig {
    /// Same rules with a different prefix length.
    pub fn with_prefix_words(mut self, words: usize) -> Self {
        self.title_prefix_words = words;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MatchConfig::default();
        assert_eq!(config.ebook_category_id, 3);
        assert_eq!(config.title_prefix_words, 5);
        assert_eq!(config.title_prefix_words, DEFAULT_TITLE_PREFIX_WORDS);
    }

    #[test]
    fn test_deserialize_partial() {
        let toml = r#"
            title_prefix_words = 4
        "#;
        let config: MatchConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.title_prefix_words, 4);
        assert_eq!(config.ebook_category_id, 3);
    }

    #[test]
    fn test_with_prefix_words() {
        let config = MatchConfig::default().with_prefix_words(3);
        assert_eq!(config.title_prefix_words, 3);
    }
}
