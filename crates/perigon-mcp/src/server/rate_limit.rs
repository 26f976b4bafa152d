//! Per-credential request counter.
//!
//! A fixed-window counter: each credential may make `limit` requests per
//! window; the count resets when the window expires. No smoothing or
//! queuing.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

/// Fixed-window request counter keyed by credential fingerprint.
#[derive(Debug)]
pub struct RequestCounter {
    limit: u32,
    window: Duration,
    windows: Mutex<HashMap<String, (Instant, u32)>>,
}

impl RequestCounter {
    /// Allow `limit` requests per `window` per key.
    #[must_use]
    pub fn new(limit: u32, window: Duration) -> Self {
        Self { limit, window, windows: Mutex::new(HashMap::new()) }
    }

    /// Count one request for `key`.
    ///
    /// # Errors
    ///
    /// Returns the time until the window resets when the limit is exceeded.
    pub async fn check(&self, key: &str) -> Result<(), Duration> {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        let (started, count) = windows.entry(key.to_string()).or_insert((now, 0));
        if now.duration_since(*started) >= self.window {
            *started = now;
            *count = 0;
        }

        *count += 1;
        if *count > self.limit {
            let retry_after = self.window.saturating_sub(now.duration_since(*started));
            tracing::debug!(key, count = *count, "Request limit exceeded");
            return Err(retry_after);
        }

        // Keep the map from growing without bound.
        if windows.len() > 10_000 {
            let window = self.window;
            windows.retain(|_, (started, _)| now.duration_since(*started) < window);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_limit_per_key() {
        let counter = RequestCounter::new(2, Duration::from_secs(60));
        assert!(counter.check("a").await.is_ok());
        assert!(counter.check("a").await.is_ok());
        let retry = counter.check("a").await.unwrap_err();
        assert!(retry <= Duration::from_secs(60));
        assert!(counter.check("b").await.is_ok());
    }

    #[tokio::test]
    async fn test_window_resets() {
        let counter = RequestCounter::new(1, Duration::from_millis(20));
        assert!(counter.check("a").await.is_ok());
        assert!(counter.check("a").await.is_err());
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(counter.check("a").await.is_ok());
    }
}
