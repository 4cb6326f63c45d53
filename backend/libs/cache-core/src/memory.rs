use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::{Cache, Result};

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// In-process cache used by tests and single-node deployments without Redis.
///
/// TTLs are driven by `tokio::time`, so paused-clock tests can advance time
/// deterministically.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + Duration::from_secs(ttl_seconds)),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn increment(&self, key: &str, ttl_seconds: u64) -> Result<i64> {
        let mut entries = self.entries.lock().await;
        let current = match entries.get(key) {
            Some(entry) if !entry.is_expired() => entry.value.parse::<i64>().unwrap_or(0),
            _ => 0,
        };
        let next = current + 1;
        entries.insert(
            key.to_string(),
            Entry {
                value: next.to_string(),
                expires_at: Some(Instant::now() + Duration::from_secs(ttl_seconds)),
            },
        );
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn get_returns_value_before_expiry() {
        let cache = MemoryCache::new();
        cache.set_with_ttl("k", "v", 60).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some("v".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entries_read_as_absent() {
        let cache = MemoryCache::new();
        cache.set_with_ttl("k", "v", 60).await.unwrap();
        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn increment_counts_from_zero_and_resets_ttl() {
        let cache = MemoryCache::new();
        assert_eq!(cache.increment("n", 30).await.unwrap(), 1);
        assert_eq!(cache.increment("n", 30).await.unwrap(), 2);

        // Each increment re-arms the window.
        tokio::time::advance(Duration::from_secs(25)).await;
        assert_eq!(cache.increment("n", 30).await.unwrap(), 3);
        tokio::time::advance(Duration::from_secs(25)).await;
        assert_eq!(cache.get("n").await.unwrap(), Some("3".to_string()));

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(cache.increment("n", 30).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let cache = MemoryCache::new();
        cache.set_with_ttl("k", "v", 60).await.unwrap();
        cache.delete("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }
}
