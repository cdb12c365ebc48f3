use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Title prefix uses at least one word
/// - Tracker (when present) has an API key and a usable rate limit
/// - Progress interval is at least 1
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.matching.title_prefix_words == 0 {
        return Err(ConfigError::ValidationError(
            "matching.title_prefix_words must be at least 1".to_string(),
        ));
    }

    if let Some(tracker) = &config.tracker {
        if tracker.api_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "tracker.api_key cannot be empty".to_string(),
            ));
        }
        if tracker.max_requests == 0 {
            return Err(ConfigError::ValidationError(
                "tracker.max_requests must be at least 1".to_string(),
            ));
        }
        if tracker.window_secs == 0 {
            return Err(ConfigError::ValidationError(
                "tracker.window_secs must be at least 1".to_string(),
            ));
        }
    }

    if config.verifier.progress_interval == 0 {
        return Err(ConfigError::ValidationError(
            "verifier.progress_interval must be at least 1".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ServerConfig, TrackerConfig};
    use std::net::IpAddr;

    fn assert_invalid(config: &Config, field: &str) {
        let err = validate_config(config).unwrap_err();
        match err {
            ConfigError::ValidationError(msg) => assert!(msg.contains(field), "{}", msg),
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config {
            tracker: Some(TrackerConfig::with_api_key("key")),
            ..Config::default()
        };
        assert!(validate_config(&config).is_ok());
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".parse::<IpAddr>().unwrap(),
                port: 0,
            },
            ..Config::default()
        };
        assert_invalid(&config, "server.port");
    }

    #[test]
    fn test_validate_zero_prefix_words_fails() {
        let mut config = Config::default();
        config.matching.title_prefix_words = 0;
        assert_invalid(&config, "title_prefix_words");
    }

    #[test]
    fn test_validate_empty_api_key_fails() {
        let config = Config {
            tracker: Some(TrackerConfig::with_api_key("  ")),
            ..Config::default()
        };
        assert_invalid(&config, "tracker.api_key");
    }

    #[test]
    fn test_validate_rate_limit_fails() {
        let mut tracker = TrackerConfig::with_api_key("key");
        tracker.max_requests = 0;
        let config = Config {
            tracker: Some(tracker),
            ..Config::default()
        };
        assert_invalid(&config, "max_requests");

        let mut tracker = TrackerConfig::with_api_key("key");
        tracker.window_secs = 0;
        let config = Config {
            tracker: Some(tracker),
            ..Config::default()
        };
        assert_invalid(&config, "window_secs");
    }

    #[test]
    fn test_validate_progress_interval_fails() {
        let mut config = Config::default();
        config.verifier.progress_interval = 0;
        assert_invalid(&config, "progress_interval");
    }
}
