use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::info;

use crate::{Cache, Result};

/// Redis-backed cache over a shared `ConnectionManager`.
///
/// Cloning the manager produces a cheap handle onto the same underlying
/// connection, so each call clones rather than locking.
pub struct RedisCache {
    manager: ConnectionManager,
    prefix: String,
}

impl RedisCache {
    pub async fn connect(redis_url: &str, prefix: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;
        let prefix = prefix.into();
        info!(prefix = %prefix, "redis cache connected");
        Ok(Self { manager, prefix })
    }

    pub fn from_manager(manager: ConnectionManager, prefix: impl Into<String>) -> Self {
        Self {
            manager,
            prefix: prefix.into(),
        }
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.manager.clone();
        Ok(conn.get(self.prefixed(key)).await?)
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        let mut conn = self.manager.clone();
        let _: () = conn.set_ex(self.prefixed(key), value, ttl_seconds).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.manager.clone();
        let _: () = conn.del(self.prefixed(key)).await?;
        Ok(())
    }

    async fn increment(&self, key: &str, ttl_seconds: u64) -> Result<i64> {
        let mut conn = self.manager.clone();
        let key = self.prefixed(key);
        // INCR + EXPIRE in one MULTI block so a burst of concurrent callers
        // cannot leave the counter without a TTL.
        let (count,): (i64,) = redis::pipe()
            .atomic()
            .incr(&key, 1)
            .expire(&key, ttl_seconds as i64)
            .ignore()
            .query_async(&mut conn)
            .await?;
        Ok(count)
    }
}
