//! Redis-backed cache: `SET EX` for TTLs, `SCAN MATCH` + `DEL` for pattern invalidation.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use super::{CacheError, ContentCache};

#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
    key_prefix: Option<String>,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("key_prefix", &self.key_prefix)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisCache {
    pub async fn connect(url: &str, key_prefix: Option<String>) -> Result<Self, CacheError> {
        let client = Client::open(url)
            .map_err(|e| CacheError::Backend(format!("failed to create Redis client: {e}")))?;
        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Backend(format!("failed to connect to Redis: {e}")))?;
        Ok(Self { connection, key_prefix })
    }

    fn prefix_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{prefix}:{key}"),
            None => key.to_string(),
        }
    }
}

#[async_trait]
impl ContentCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection.clone();
        conn.get(self.prefix_key(key))
            .await
            .map_err(|e| CacheError::Backend(format!("failed to get key '{key}': {e}")))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        let ttl_secs = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(self.prefix_key(key), value, ttl_secs)
            .await
            .map_err(|e| CacheError::Backend(format!("failed to set key '{key}': {e}")))
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        conn.del::<_, ()>(self.prefix_key(key))
            .await
            .map_err(|e| CacheError::Backend(format!("failed to delete key '{key}': {e}")))
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<usize, CacheError> {
        let prefixed = self.prefix_key(pattern);
        let mut conn = self.connection.clone();
        let mut cursor = 0u64;
        let mut total = 0usize;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&prefixed)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await
                .map_err(|e| CacheError::Backend(format!("failed to scan '{pattern}': {e}")))?;
            if !keys.is_empty() {
                let deleted: usize = conn
                    .del(&keys)
                    .await
                    .map_err(|e| CacheError::Backend(format!("failed to delete keys: {e}")))?;
                total += deleted;
            }
            cursor = next;
            if cursor == 0 {
                break;
            }
        }
        Ok(total)
    }
}
