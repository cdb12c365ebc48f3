use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::matching::MatchConfig;
use crate::verifier::VerifierConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub tracker: Option<TrackerConfig>,
    #[serde(default)]
    pub matching: MatchConfig,
    #[serde(default)]
    pub verifier: VerifierConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("shelfcheck.db")
}

/// Remote tracker API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackerConfig {
    /// JSON API endpoint (e.g., "https://gazellegames.net/api.php")
    #[serde(default = "default_tracker_url")]
    pub url: String,
    /// API key sent in the `X-API-Key` header
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Requests allowed per window (default: 5)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
    /// Rate limit window in seconds (default: 10)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_tracker_url() -> String {
    "https://gazellegames.net/api.php".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_max_requests() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("shelfcheck/", env!("CARGO_PKG_VERSION")).to_string()
}

impl TrackerConfig {
    /// Config with defaults for everything but the key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            url: default_tracker_url(),
            api_key: api_key.into(),
            timeout_secs: default_timeout(),
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracker: Option<SanitizedTrackerConfig>,
    pub matching: MatchConfig,
    pub verifier: VerifierConfig,
}

/// Sanitized tracker config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedTrackerConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
    pub max_requests: u32,
    pub window_secs: u64,
    pub user_agent: String,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            tracker: config.tracker.as_ref().map(|t| SanitizedTrackerConfig {
                url: t.url.clone(),
                api_key_configured: !t.api_key.is_empty(),
                timeout_secs: t.timeout_secs,
                max_requests: t.max_requests,
                window_secs: t.window_secs,
                user_agent: t.user_agent.clone(),
            }),
            matching: config.matching.clone(),
            verifier: config.verifier.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.database.path.to_str().unwrap(), "shelfcheck.db");
        assert!(config.tracker.is_none());
        assert_eq!(config.matching.ebook_category_id, 3);
        assert_eq!(config.matching.title_prefix_words, 5);
        assert_eq!(config.verifier.progress_interval, 25);
    }

    #[test]
    fn test_deserialize_server_section() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
    }

    #[test]
    fn test_deserialize_with_custom_database_path() {
        let toml = r#"
[database]
path = "/data/books.sqlite"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.database.path.to_str().unwrap(), "/data/books.sqlite");
    }

    #[test]
    fn test_deserialize_with_tracker_config() {
        let toml = r#"
[tracker]
api_key = "test-api-key"
max_requests = 3
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let tracker = config.tracker.as_ref().unwrap();
        assert_eq!(tracker.url, "https://gazellegames.net/api.php");
        assert_eq!(tracker.api_key, "test-api-key");
        assert_eq!(tracker.timeout_secs, 30);
        assert_eq!(tracker.max_requests, 3);
        assert_eq!(tracker.window_secs, 10);
        assert!(tracker.user_agent.starts_with("shelfcheck/"));
    }

    #[test]
    fn test_deserialize_tracker_missing_api_key_fails() {
        let toml = r#"
[tracker]
url = "http://localhost/api.php"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_matching_section() {
        let toml = r#"
[matching]
title_prefix_words = 3
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.matching.title_prefix_words, 3);
        assert_eq!(config.matching.ebook_category_id, 3);
    }

    #[test]
    fn test_sanitized_config() {
        let config = Config::default();
        let sanitized = SanitizedConfig::from(&config);
        assert_eq!(sanitized.server.port, 8080);
        assert_eq!(sanitized.database.path.to_str().unwrap(), "shelfcheck.db");
        assert!(sanitized.tracker.is_none());
    }

    #[test]
    fn test_sanitized_config_hides_api_key() {
        let config = Config {
            tracker: Some(TrackerConfig::with_api_key("secret-key")),
            ..Config::default()
        };

        let sanitized = SanitizedConfig::from(&config);
        let tracker = sanitized.tracker.as_ref().unwrap();
        assert!(tracker.api_key_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret-key"));
    }
}
