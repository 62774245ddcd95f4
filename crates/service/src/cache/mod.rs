//! Read-through cache for content lookups.
//!
//! Keys: `article:detail:{id}`, `articles:list:{page}:{limit}`, `project:detail:{id}`,
//! `projects:list:{page}:{limit}:{featured}`. Writes invalidate by key and by `*` pattern.
//! Every failure is logged and swallowed; a broken cache only costs a database round trip.

use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use common::metrics::CACHE_LOOKUPS_TOTAL;

pub mod memory;
pub mod redis;

pub use memory::MemoryCache;
pub use self::redis::RedisCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
    #[error("cache serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// String-valued cache with TTLs and glob-pattern deletion.
#[async_trait]
pub trait ContentCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
    /// Delete every key matching a glob pattern (`*` wildcard). Returns how many were removed.
    async fn delete_pattern(&self, pattern: &str) -> Result<usize, CacheError>;
}

pub const ARTICLES_PATTERN: &str = "articles:*";
pub const PROJECTS_PATTERN: &str = "projects:*";

pub fn article_detail_key(id: Uuid) -> String { format!("article:detail:{id}") }
pub fn article_list_key(page: u64, limit: u64) -> String { format!("articles:list:{page}:{limit}") }
pub fn project_detail_key(id: Uuid) -> String { format!("project:detail:{id}") }

pub fn project_list_key(page: u64, limit: u64, featured: Option<bool>) -> String {
    let f = featured.map(|b| b.to_string()).unwrap_or_else(|| "all".to_string());
    format!("projects:list:{page}:{limit}:{f}")
}

/// Cached JSON lookup. Misses, decode failures and backend errors all return `None`.
pub async fn get_json<T: DeserializeOwned>(cache: &dyn ContentCache, key: &str) -> Option<T> {
    match cache.get(key).await {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(v) => {
                CACHE_LOOKUPS_TOTAL.with_label_values(&["hit"]).inc();
                debug!(key, "cache_hit");
                Some(v)
            }
            Err(e) => {
                CACHE_LOOKUPS_TOTAL.with_label_values(&["error"]).inc();
                warn!(key, error = %e, "cache_decode_failed");
                None
            }
        },
        Ok(None) => {
            CACHE_LOOKUPS_TOTAL.with_label_values(&["miss"]).inc();
            None
        }
        Err(e) => {
            CACHE_LOOKUPS_TOTAL.with_label_values(&["error"]).inc();
            warn!(key, error = %e, "cache_get_failed");
            None
        }
    }
}

pub async fn set_json<T: Serialize>(cache: &dyn ContentCache, key: &str, value: &T, ttl: Duration) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(key, error = %e, "cache_encode_failed");
            return;
        }
    };
    if let Err(e) = cache.set(key, &raw, ttl).await {
        warn!(key, error = %e, "cache_set_failed");
    }
}

/// Drop exact keys and pattern matches after a write.
pub async fn invalidate(cache: &dyn ContentCache, keys: &[String], patterns: &[&str]) {
    for key in keys {
        if let Err(e) = cache.delete(key).await {
            warn!(key = %key, error = %e, "cache_delete_failed");
        }
    }
    for pattern in patterns {
        match cache.delete_pattern(pattern).await {
            Ok(n) => debug!(pattern, removed = n, "cache_invalidated"),
            Err(e) => warn!(pattern, error = %e, "cache_delete_pattern_failed"),
        }
    }
}

/// Glob match supporting `*` (any run of characters) as Redis `MATCH` does.
pub fn glob_match(pattern: &str, key: &str) -> bool {
    let p = pattern.as_bytes();
    let k = key.as_bytes();
    let (mut pi, mut ki) = (0usize, 0usize);
    let mut star: Option<usize> = None;
    let mut mark = 0usize;
    while ki < k.len() {
        if pi < p.len() && p[pi] == b'*' {
            star = Some(pi);
            mark = ki;
            pi += 1;
        } else if pi < p.len() && p[pi] == k[ki] {
            pi += 1;
            ki += 1;
        } else if let Some(s) = star {
            pi = s + 1;
            mark += 1;
            ki = mark;
        } else {
            return false;
        }
    }
    while pi < p.len() && p[pi] == b'*' {
        pi += 1;
    }
    pi == p.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_matching() {
        assert!(glob_match("articles:*", "articles:list:1:10"));
        assert!(glob_match("articles:*", "articles:"));
        assert!(!glob_match("articles:*", "article:detail:1"));
        assert!(glob_match("*:detail:*", "project:detail:abc"));
        assert!(glob_match("exact", "exact"));
        assert!(!glob_match("exact", "exactly"));
    }

    #[test]
    fn list_keys_fall_under_their_patterns() {
        assert!(glob_match(ARTICLES_PATTERN, &article_list_key(1, 10)));
        assert!(glob_match(PROJECTS_PATTERN, &project_list_key(2, 5, Some(true))));
        assert!(!glob_match(ARTICLES_PATTERN, &article_detail_key(Uuid::nil())));
        assert_eq!(project_list_key(1, 10, None), "projects:list:1:10:all");
    }

    #[tokio::test]
    async fn json_helpers_round_trip_through_memory_cache() {
        let cache = MemoryCache::new(100);
        set_json(&cache, "k", &vec![1, 2, 3], Duration::from_secs(60)).await;
        let got: Option<Vec<i32>> = get_json(&cache, "k").await;
        assert_eq!(got, Some(vec![1, 2, 3]));
        let missing: Option<Vec<i32>> = get_json(&cache, "nope").await;
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn undecodable_entry_is_a_miss() {
        let cache = MemoryCache::new(100);
        cache.set("bad", "{not json", Duration::from_secs(60)).await.unwrap();
        let got: Option<Vec<i32>> = get_json(&cache, "bad").await;
        assert!(got.is_none());
    }
}
