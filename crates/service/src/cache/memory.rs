//! In-process cache backed by moka, used when Redis is disabled and in tests.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use moka::future::Cache as MokaCache;

use super::{glob_match, CacheError, ContentCache};

#[derive(Clone, Debug)]
struct CacheEntry {
    data: String,
    expires_at: u64,
}

impl CacheEntry {
    fn is_expired(&self) -> bool { now_millis() >= self.expires_at }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Per-entry TTL is tracked in the entry itself; moka enforces the capacity bound.
#[derive(Clone)]
pub struct MemoryCache {
    cache: MokaCache<String, CacheEntry>,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache").field("entries", &self.cache.entry_count()).finish()
    }
}

impl MemoryCache {
    pub fn new(max_capacity: u64) -> Self {
        Self { cache: MokaCache::builder().max_capacity(max_capacity).build() }
    }
}

impl Default for MemoryCache {
    fn default() -> Self { Self::new(10_000) }
}

#[async_trait]
impl ContentCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self.cache.get(key).await {
            Some(entry) if entry.is_expired() => {
                self.cache.invalidate(key).await;
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.data)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let entry = CacheEntry {
            data: value.to_string(),
            expires_at: now_millis().saturating_add(ttl.as_millis() as u64),
        };
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<usize, CacheError> {
        let keys: Vec<String> = self
            .cache
            .iter()
            .filter(|(k, _)| glob_match(pattern, k))
            .map(|(k, _)| k.as_ref().clone())
            .collect();
        for k in &keys {
            self.cache.invalidate(k).await;
        }
        Ok(keys.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_delete() {
        let c = MemoryCache::new(16);
        c.set("a", "1", Duration::from_secs(60)).await.unwrap();
        assert_eq!(c.get("a").await.unwrap().as_deref(), Some("1"));
        c.delete("a").await.unwrap();
        assert!(c.get("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_not_returned() {
        let c = MemoryCache::new(16);
        c.set("a", "1", Duration::from_millis(0)).await.unwrap();
        assert!(c.get("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn pattern_delete_only_touches_matches() {
        let c = MemoryCache::new(16);
        let ttl = Duration::from_secs(60);
        c.set("articles:list:1:10", "x", ttl).await.unwrap();
        c.set("articles:list:2:10", "x", ttl).await.unwrap();
        c.set("article:detail:1", "x", ttl).await.unwrap();
        let removed = c.delete_pattern("articles:*").await.unwrap();
        assert_eq!(removed, 2);
        assert!(c.get("articles:list:1:10").await.unwrap().is_none());
        assert!(c.get("article:detail:1").await.unwrap().is_some());
    }
}
