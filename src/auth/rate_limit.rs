use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Sliding-window counter of failed sign-ins, keyed by peer address.
#[derive(Clone)]
pub struct RateLimiter {
    max_attempts: usize,
    window: Duration,
    attempts: Arc<Mutex<HashMap<String, Vec<Instant>>>>,
}

impl RateLimiter {
    pub fn new(max_attempts: usize, window_secs: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            window: Duration::from_secs(window_secs),
            attempts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// True once `key` has reached the limit inside the window.
    /// Stale timestamps for `key` are dropped on the way.
    pub fn is_blocked(&self, key: &str) -> bool {
        self.is_blocked_at(key, Instant::now())
    }

    pub fn record_failure(&self, key: &str) {
        self.record_failure_at(key, Instant::now());
    }

    /// Forget `key` entirely (successful sign-in).
    pub fn clear(&self, key: &str) {
        let mut map = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(key);
    }

    fn is_blocked_at(&self, key: &str, now: Instant) -> bool {
        let mut map = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        let Some(timestamps) = map.get_mut(key) else {
            return false;
        };
        timestamps.retain(|t| now.saturating_duration_since(*t) < self.window);
        if timestamps.is_empty() {
            map.remove(key);
            return false;
        }
        timestamps.len() >= self.max_attempts
    }

    fn record_failure_at(&self, key: &str, at: Instant) {
        let mut map = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
        map.entry(key.to_string()).or_default().push(at);
    }
}
