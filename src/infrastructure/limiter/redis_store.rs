use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use deadpool_redis::{Config, Pool, Runtime};
use uuid::Uuid;

use crate::{errors::RateLimitError, repositories::rate_limit::RateLimitStore};

/// Sorted-set sliding log shared by every instance talking to the same Redis.
#[derive(Clone)]
pub struct RedisRateLimitStore {
    pool: Pool,
}

impl RedisRateLimitStore {
    pub fn new(redis_url: &str) -> Result<Self, RateLimitError> {
        let pool = Config::from_url(redis_url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| RateLimitError::Unavailable(e.to_string()))?;

        Ok(Self { pool })
    }

    fn redis_key(key: &str) -> String {
        // URL-encode to keep client-provided emails from shaping the key space
        format!("rl:form:{}", urlencoding::encode(key))
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn is_rate_limited(&self, key: &str, limit: u32, window: Duration) -> Result<bool, RateLimitError> {
        let mut conn = self.pool.get().await?;

        let redis_key = Self::redis_key(key);
        let now_ms = Utc::now().timestamp_millis();
        let window_ms = window.as_millis() as i64;
        let member = format!("{}-{}", now_ms, Uuid::new_v4());

        let (count,): (u64,) = redis::pipe()
            .atomic()
            .zrembyscore(&redis_key, 0, now_ms - window_ms).ignore()
            .zadd(&redis_key, member, now_ms).ignore()
            .zcard(&redis_key)
            .pexpire(&redis_key, window_ms).ignore()
            .query_async(&mut conn)
            .await?;

        Ok(count > limit as u64)
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
