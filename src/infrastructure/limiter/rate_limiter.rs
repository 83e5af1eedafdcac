use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::errors::AppError;

/// Sliding window counter: the previous window's hits are weighted by how much
/// of it still overlaps the trailing `window_size`.
#[derive(Debug)]
struct SlidingWindow {
    window_size: Duration,
    limit: u64,
    current_window_start: Instant,
    current_count: u64,
    prev_count: u64,
    last_seen: Instant,
}

impl SlidingWindow {
    fn new(window_size: Duration, limit: u64, now: Instant) -> Self {
        Self {
            window_size,
            limit,
            current_window_start: now,
            current_count: 0,
            prev_count: 0,
            last_seen: now,
        }
    }

    fn roll(&mut self, now: Instant) {
        let elapsed = now.duration_since(self.current_window_start);
        if elapsed >= self.window_size * 2 {
            self.prev_count = 0;
            self.current_count = 0;
            self.current_window_start = now;
        } else if elapsed >= self.window_size {
            self.prev_count = self.current_count;
            self.current_count = 0;
            self.current_window_start += self.window_size;
        }
    }

    /// `Err(retry_after_secs)` when the request would exceed the limit.
    fn allow(&mut self, now: Instant) -> Result<(), u64> {
        self.roll(now);
        self.last_seen = now;

        let elapsed = now.duration_since(self.current_window_start).as_secs_f64();
        let weight = 1.0 - elapsed / self.window_size.as_secs_f64();
        let effective = self.prev_count as f64 * weight + self.current_count as f64;

        if effective < self.limit as f64 {
            self.current_count += 1;
            Ok(())
        } else {
            let until_next_window = self.window_size.as_secs_f64() - elapsed;
            Err((until_next_window.ceil() as u64).max(1))
        }
    }
}

/// Per-key request limiter, keyed by client IP.
#[derive(Clone)]
pub struct RateLimiter {
    map: Arc<DashMap<String, Arc<Mutex<SlidingWindow>>>>,
    window_size: Duration,
    limit: u64,
}

impl RateLimiter {
    pub fn new(limit: u64, window_size: Duration) -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            window_size,
            limit,
        }
    }

    pub fn per_minute(limit: u64) -> Self {
        Self::new(limit, Duration::from_secs(60))
    }

    pub fn per_hour(limit: u64) -> Self {
        Self::new(limit, Duration::from_secs(3600))
    }

    fn window(&self, key: &str, now: Instant) -> Arc<Mutex<SlidingWindow>> {
        if let Some(existing) = self.map.get(key) {
            return existing.clone();
        }
        self.map
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(SlidingWindow::new(self.window_size, self.limit, now))))
            .clone()
    }

    pub fn check(&self, key: &str) -> Result<(), AppError> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), AppError> {
        let window = self.window(key, now);
        let result = window.lock().allow(now);

        result.map_err(|retry_after_secs| {
            tracing::warn!(client = key, retry_after_secs, "Rate limit exceeded");
            AppError::RateLimited { retry_after_secs }
        })
    }

    /// Drops keys idle for more than two windows. Returns how many were removed.
    pub fn evict_stale(&self) -> usize {
        let now = Instant::now();
        let ttl = self.window_size * 2;
        let before = self.map.len();
        self.map.retain(|_, window| now.duration_since(window.lock().last_seen) <= ttl);
        before - self.map.len()
    }

    pub fn tracked_keys(&self) -> usize {
        self.map.len()
    }
}
