use std::sync::Arc;

use sha2::{Digest, Sha256};

use cache_core::Cache;

use crate::config::ThrottleConfig;
use crate::error::Result;

/// Tracks failed login attempts per identifier with a time-boxed lockout.
///
/// The counter lives in the shared cache under a hash of the identifier, so
/// the raw email never appears in cache keys. Each failure re-arms the TTL
/// (sliding window); one success clears the counter entirely.
pub struct LoginThrottle {
    cache: Arc<dyn Cache>,
    config: ThrottleConfig,
}

impl LoginThrottle {
    pub fn new(cache: Arc<dyn Cache>, config: ThrottleConfig) -> Self {
        Self { cache, config }
    }

    fn key(identifier: &str) -> String {
        let digest = Sha256::digest(identifier.as_bytes());
        format!("login_attempts:{}", hex::encode(digest))
    }

    pub async fn attempts_for(&self, identifier: &str) -> Result<i64> {
        let count = self
            .cache
            .get(&Self::key(identifier))
            .await?
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0);
        Ok(count)
    }

    /// Record one failure, returning the running count. The increment and
    /// TTL reset are a single cache operation so concurrent failures cannot
    /// slip past the lockout.
    pub async fn record_failure(&self, identifier: &str) -> Result<i64> {
        let count = self
            .cache
            .increment(&Self::key(identifier), self.config.lockout_seconds)
            .await?;
        if count >= self.config.max_attempts {
            tracing::warn!(attempts = count, "login identifier locked out");
        }
        Ok(count)
    }

    pub async fn record_success(&self, identifier: &str) -> Result<()> {
        self.cache.delete(&Self::key(identifier)).await?;
        Ok(())
    }

    pub async fn is_locked(&self, identifier: &str) -> Result<bool> {
        Ok(self.attempts_for(identifier).await? >= self.config.max_attempts)
    }
}
