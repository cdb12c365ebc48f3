//! Remote tracker search.
//!
//! This module provides a `TrackerSearch` trait for querying the remote
//! catalog, a Gazelle-style JSON API client, and the sliding-window rate
//! limiter that keeps the client within the tracker's request budget.

mod gazelle;
mod rate_limiter;
mod types;

pub use gazelle::{parse_search_response, GazelleClient};
pub use rate_limiter::{RateLimitStatus, RateLimiter, SlidingWindow};
pub use types::*;
