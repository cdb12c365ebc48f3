//! Sliding-window rate limiter for tracker API calls.
//!
//! The tracker allows a fixed number of requests per window (5 per 10 seconds
//! by default). Request timestamps are kept for one window; a new request is
//! admitted only while fewer than `max_requests` of them remain.

use std::collections::VecDeque;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};
use tracing::debug;

use super::TrackerError;
use crate::metrics;

/// Rate limit status snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitStatus {
    pub max_requests: u32,
    pub window_ms: u64,
    pub requests_in_window: u32,
    pub next_available_in_ms: Option<u64>,
}

/// Request timestamps within the current window.
pub struct SlidingWindow {
    max_requests: u32,
    window: Duration,
    requests: VecDeque<Instant>,
}

impl SlidingWindow {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
            requests: VecDeque::new(),
        }
    }

    /// Try to record a request now.
    ///
    /// Returns `Err(wait_duration)` if the window is full, with the time until
    /// the oldest request leaves it.
    pub fn try_acquire(&mut self) -> Result<(), Duration> {
        let now = Instant::now();
        self.evict(now);

        if self.requests.len() < self.max_requests as usize {
            self.requests.push_back(now);
            Ok(())
        } else {
            Err(self.wait_time(now))
        }
    }

    /// Get the current rate limit status.
    pub fn status(&mut self) -> RateLimitStatus {
        let now = Instant::now();
        self.evict(now);
        let full = self.requests.len() >= self.max_requests as usize;
        RateLimitStatus {
            max_requests: self.max_requests,
            window_ms: self.window.as_millis() as u64,
            requests_in_window: self.requests.len() as u32,
            next_available_in_ms: full.then(|| self.wait_time(now).as_millis() as u64),
        }
    }

    fn wait_time(&self, now: Instant) -> Duration {
        self.requests
            .front()
            .map(|oldest| (*oldest + self.window).saturating_duration_since(now))
            .unwrap_or_default()
    }

    /// Drop timestamps that have left the window.
    fn evict(&mut self, now: Instant) {
        while let Some(oldest) = self.requests.front() {
            if now.duration_since(*oldest) >= self.window {
                self.requests.pop_front();
            } else {
                break;
            }
        }
    }
}

/// Shared, async-aware rate limiter.
pub struct RateLimiter {
    window: Mutex<SlidingWindow>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            window: Mutex::new(SlidingWindow::new(max_requests, window)),
        }
    }

    /// Wait until a request slot is free, then take it.
    pub async fn acquire(&self) {
        loop {
            let result = self.window.lock().await.try_acquire();
            match result {
                Ok(()) => return,
                Err(wait) => {
                    debug!(wait_ms = wait.as_millis() as u64, "Rate limit reached, waiting");
                    metrics::RATE_LIMIT_WAITS.inc();
                    sleep(wait).await;
                }
            }
        }
    }

    /// Take a slot without waiting.
    pub async fn try_acquire(&self) -> Result<(), TrackerError> {
        self.window
            .lock()
            .await
            .try_acquire()
            .map_err(|wait| TrackerError::RateLimited {
                retry_after_ms: wait.as_millis() as u64,
            })
    }

    pub async fn status(&self) -> RateLimitStatus {
        self.window.lock().await.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_admits_up_to_limit() {
        let mut window = SlidingWindow::new(5, Duration::from_secs(10));

        for _ in 0..5 {
            assert!(window.try_acquire().is_ok());
        }

        let wait = window.try_acquire().unwrap_err();
        assert!(wait <= Duration::from_secs(10));
        assert!(wait > Duration::from_secs(9));
    }

    #[test]
    fn test_window_zero_limit_is_clamped() {
        let mut window = SlidingWindow::new(0, Duration::from_secs(1));
        assert!(window.try_acquire().is_ok());
        assert!(window.try_acquire().is_err());
    }

    #[test]
    fn test_window_status() {
        let mut window = SlidingWindow::new(2, Duration::from_secs(10));

        let status = window.status();
        assert_eq!(status.max_requests, 2);
        assert_eq!(status.window_ms, 10_000);
        assert_eq!(status.requests_in_window, 0);
        assert!(status.next_available_in_ms.is_none());

        window.try_acquire().unwrap();
        window.try_acquire().unwrap();

        let status = window.status();
        assert_eq!(status.requests_in_window, 2);
        assert!(status.next_available_in_ms.is_some());
    }

    #[tokio::test]
    async fn test_window_frees_slots_after_window() {
        let mut window = SlidingWindow::new(2, Duration::from_millis(50));
        window.try_acquire().unwrap();
        window.try_acquire().unwrap();
        assert!(window.try_acquire().is_err());

        sleep(Duration::from_millis(60)).await;
        assert!(window.try_acquire().is_ok());
    }

    #[tokio::test]
    async fn test_limiter_try_acquire_reports_rate_limited() {
        let limiter = RateLimiter::new(1, Duration::from_secs(10));
        assert!(limiter.try_acquire().await.is_ok());

        match limiter.try_acquire().await.unwrap_err() {
            TrackerError::RateLimited { retry_after_ms } => {
                assert!(retry_after_ms > 0);
                assert!(retry_after_ms <= 10_000);
            }
            other => panic!("Expected RateLimited error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_limiter_acquire_waits_for_slot() {
        let limiter = RateLimiter::new(2, Duration::from_millis(80));
        let start = Instant::now();

        limiter.acquire().await;
        limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(80));

        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(80));
    }
}
