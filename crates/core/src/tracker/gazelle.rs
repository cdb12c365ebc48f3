//! Gazelle-style JSON API client (GazelleGames `api.php`).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::TrackerConfig;
use crate::matching::{ArtistRef, RemoteGroup, RemoteTorrent};
use crate::metrics;

use super::rate_limiter::RateLimiter;
use super::{TrackerError, TrackerSearch};

/// Tracker search client with built-in rate limiting.
pub struct GazelleClient {
    client: Client,
    config: TrackerConfig,
    category_id: u32,
    rate_limiter: RateLimiter,
}

impl GazelleClient {
    /// Create a client that filters searches to `category_id`.
    pub fn new(config: TrackerConfig, category_id: u32) -> Result<Self, TrackerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TrackerError::Http(format!("Failed to create HTTP client: {}", e)))?;

        let rate_limiter = RateLimiter::new(
            config.max_requests,
            Duration::from_secs(config.window_secs),
        );

        Ok(Self {
            client,
            config,
            category_id,
            rate_limiter,
        })
    }

    /// Build the API URL for a search.
    fn build_search_url(&self, query: &str) -> String {
        format!(
            "{}?request=search&search_type=torrents&searchstr={}&filter_cat[{}]=1",
            self.config.url,
            urlencoding::encode(query),
            self.category_id
        )
    }

    async fn fetch(&self, query: &str) -> Result<Vec<RemoteGroup>, TrackerError> {
        let url = self.build_search_url(query);

        let response = self
            .client
            .get(&url)
            .header("X-API-Key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TrackerError::Timeout
                } else {
                    TrackerError::Http(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TrackerError::Http(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TrackerError::ParseError(e.to_string()))?;

        parse_search_response(&body)
    }
}

#[async_trait]
impl TrackerSearch for GazelleClient {
    fn name(&self) -> &str {
        "gazelle"
    }

    async fn search_ebooks(&self, query: &str) -> Result<Vec<RemoteGroup>, TrackerError> {
        self.rate_limiter.acquire().await;

        debug!(query = %query, "Searching tracker");
        let start = Instant::now();
        let result = self.fetch(query).await;
        metrics::TRACKER_DURATION
            .with_label_values(&[])
            .observe(start.elapsed().as_secs_f64());

        match &result {
            Ok(groups) => {
                metrics::TRACKER_REQUESTS.with_label_values(&["success"]).inc();
                metrics::SEARCH_GROUPS
                    .with_label_values(&[])
                    .observe(groups.len() as f64);
                debug!(query = %query, groups = groups.len(), "Tracker search complete");
            }
            Err(e) => {
                metrics::TRACKER_REQUESTS.with_label_values(&["error"]).inc();
                warn!(query = %query, error = %e, "Tracker search failed");
            }
        }

        result
    }
}

/// Turn a decoded search response into groups, in response order.
///
/// `response` is an empty array when nothing matched and an object keyed by
/// group id otherwise. Entries that are not objects or whose key is not an id
/// are skipped.
pub fn parse_search_response(body: &Value) -> Result<Vec<RemoteGroup>, TrackerError> {
    let status = body.get("status").and_then(Value::as_str).unwrap_or("");
    if status != "success" {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error")
            .to_string();
        return Err(TrackerError::Api {
            status: if status.is_empty() {
                "missing".to_string()
            } else {
                status.to_string()
            },
            message,
        });
    }

    match body.get("response") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(_)) => Ok(Vec::new()),
        Some(Value::Object(groups)) => Ok(groups
            .iter()
            .filter_map(|(key, group)| {
                let parsed = parse_group(key, group);
                if parsed.is_none() {
                    debug!(key = %key, "Skipping malformed group entry");
                }
                parsed
            })
            .collect()),
        Some(other) => Err(TrackerError::ParseError(format!(
            "unexpected response payload: {}",
            json_type(other)
        ))),
    }
}

fn parse_group(key: &str, value: &Value) -> Option<RemoteGroup> {
    let group = value.as_object()?;
    let group_id = key.trim().parse::<u64>().ok()?;

    Some(RemoteGroup {
        group_id,
        group_name: group
            .get("Name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        category_id: group
            .get("CategoryID")
            .and_then(as_u64)
            .and_then(|id| u32::try_from(id).ok()),
        artists: group.get("Artists").and_then(parse_artists),
        torrents: group.get("Torrents").map(parse_torrents).unwrap_or_default(),
    })
}

/// `None` only when the field is missing or null. A scalar in place of the
/// list is kept as a single unrecognized entry so the author gate stays strict;
/// empty scalars count as no metadata.
fn parse_artists(value: &Value) -> Option<Vec<ArtistRef>> {
    let items: Vec<&Value> = match value {
        Value::Null => return None,
        Value::Array(items) => items.iter().collect(),
        Value::Object(items) => items.values().collect(),
        scalar if is_empty_scalar(scalar) => return Some(Vec::new()),
        scalar => return Some(vec![ArtistRef::Unrecognized(scalar.clone())]),
    };

    Some(items.into_iter().map(artist_ref).collect())
}

fn is_empty_scalar(value: &Value) -> bool {
    match value {
        Value::String(s) => s.trim().is_empty(),
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

fn artist_ref(value: &Value) -> ArtistRef {
    match value {
        Value::String(name) => ArtistRef::Plain(name.clone()),
        Value::Object(record) => ArtistRef::Structured(record.clone()),
        other => ArtistRef::Unrecognized(other.clone()),
    }
}

fn parse_torrents(value: &Value) -> Vec<RemoteTorrent> {
    let items: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(items) => items.values().collect(),
        _ => return Vec::new(),
    };

    items
        .into_iter()
        .filter_map(Value::as_object)
        .map(parse_torrent)
        .collect()
}

fn parse_torrent(torrent: &Map<String, Value>) -> RemoteTorrent {
    let text = |key: &str| torrent.get(key).and_then(Value::as_str).map(str::to_string);
    let count = |keys: [&str; 2]| {
        keys.iter()
            .find_map(|key| torrent.get(*key))
            .and_then(as_u64)
            .unwrap_or(0)
    };

    RemoteTorrent {
        format: text("Format"),
        release_title: text("ReleaseTitle"),
        torrent_name: text("torrentName"),
        seeders: count(["Seeders", "seeders"]),
        snatched: count(["Snatched", "snatched"]),
    }
}

/// Numbers arrive either as JSON numbers or as numeric strings.
fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
