use std::time::Duration;

use async_trait::async_trait;

use crate::errors::RateLimitError;

/// Sliding-window submission counter keyed by client identity.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Records an attempt for `key` and reports whether the key is now over
    /// `limit` attempts inside the trailing `window`. Attempts over the limit
    /// are recorded too.
    async fn is_rate_limited(&self, key: &str, limit: u32, window: Duration) -> Result<bool, RateLimitError>;

    /// Drops keys whose attempts all fell out of `window`. Returns how many were dropped.
    async fn purge_expired(&self, _window: Duration) -> usize {
        0
    }

    fn backend(&self) -> &'static str;
}
