//! Tracker for keys written within a bounded window.
//!
//! Backs the opt-in read-your-writes mode: while a key is recent, reads
//! for it are served by the write pool instead of a possibly lagging
//! replica.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Keys mutated within the last `window`.
#[derive(Debug)]
pub struct RecentWrites {
    window: Duration,
    entries: Mutex<HashMap<String, Instant>>,
}

impl RecentWrites {
    /// Create an empty tracker.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The pinning window.
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Mark `key` as written now. Expired entries are dropped on the way.
    pub async fn record(&self, key: &str) {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, at| now.saturating_duration_since(*at) < self.window);
        entries.insert(key.to_owned(), now);
    }

    /// Whether `key` was written within the window.
    pub async fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(at) if now.saturating_duration_since(*at) < self.window => true,
            Some(_) => {
                entries.remove(key);
                false
            }
            None => false,
        }
    }

    /// Number of tracked keys, including ones not yet pruned.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether no keys are tracked.
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn key_is_recent_until_window_elapses() {
        let recent = RecentWrites::new(Duration::from_millis(500));
        recent.record("user:1").await;
        assert!(recent.contains("user:1").await);
        assert!(!recent.contains("user:2").await);

        tokio::time::advance(Duration::from_millis(499)).await;
        assert!(recent.contains("user:1").await);

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(!recent.contains("user:1").await);
        assert!(recent.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn record_prunes_expired_keys() {
        let recent = RecentWrites::new(Duration::from_secs(1));
        recent.record("a").await;
        recent.record("b").await;
        tokio::time::advance(Duration::from_secs(2)).await;
        recent.record("c").await;
        assert_eq!(recent.len().await, 1);
        assert_eq!(recent.window(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn rewriting_a_key_extends_its_window() {
        let recent = RecentWrites::new(Duration::from_secs(1));
        recent.record("a").await;
        tokio::time::advance(Duration::from_millis(800)).await;
        recent.record("a").await;
        tokio::time::advance(Duration::from_millis(800)).await;
        assert!(recent.contains("a").await);
    }
}
