// Shared cache abstraction: Redis in production, in-memory for tests.

pub mod memory;
pub mod redis_cache;

pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

pub type Result<T> = std::result::Result<T, CacheError>;

/// Key/value cache with per-key TTLs.
///
/// `increment` is the one compound operation: it must bump the counter and
/// (re)arm the key's TTL atomically so concurrent callers cannot observe a
/// counter without an expiry.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Increment the counter stored at `key` and reset its TTL, returning the
    /// new count. A missing or expired key counts from zero.
    async fn increment(&self, key: &str, ttl_seconds: u64) -> Result<i64>;
}
