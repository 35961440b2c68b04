//! Short-lived reuse of provider answers.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::trace;

/// Time-bounded map from query key to a previous answer.
///
/// Entries older than the TTL are never returned. A zero TTL disables the
/// cache entirely.
#[derive(Debug)]
pub struct ResponseCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, V)>>,
}

impl<V: Clone> ResponseCache<V> {
    /// Create a cache whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Whether this cache stores anything at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// A fresh answer for `key`, if one is stored.
    pub async fn get(&self, key: &str) -> Option<V> {
        if !self.is_enabled() {
            return None;
        }
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some((stored_at, value)) if stored_at.elapsed() < self.ttl => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store an answer for `key`, dropping any expired entries.
    pub async fn insert(&self, key: String, value: V) {
        if !self.is_enabled() {
            return;
        }
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        entries.retain(|_, (stored_at, _)| now.duration_since(*stored_at) < self.ttl);
        entries.insert(key, (now, value));
        trace!(entries = entries.len(), "cached provider answer");
    }

    /// Number of stored entries, fresh or not.
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether nothing is stored.
    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_hit_within_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.insert("flight_iata=AA123".to_string(), 1).await;

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get("flight_iata=AA123").await, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_miss_after_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.insert("k".to_string(), 1).await;

        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_purges_expired() {
        let cache = ResponseCache::new(Duration::from_secs(10));
        cache.insert("old".to_string(), 1).await;
        tokio::time::advance(Duration::from_secs(11)).await;
        cache.insert("new".to_string(), 2).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("new").await, Some(2));
    }

    #[tokio::test]
    async fn test_zero_ttl_disables() {
        let cache = ResponseCache::new(Duration::ZERO);
        assert!(!cache.is_enabled());
        cache.insert("k".to_string(), 1).await;
        assert_eq!(cache.get("k").await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_unknown_key() {
        let cache: ResponseCache<u8> = ResponseCache::new(Duration::from_secs(60));
        assert_eq!(cache.get("missing").await, None);
    }
}
