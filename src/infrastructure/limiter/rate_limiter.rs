use std::{
    collections::VecDeque,
    sync::Arc,
    time::{Duration, Instant},
};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::{errors::RateLimitError, repositories::rate_limit::RateLimitStore};

/// Timestamps of recent attempts for one key, oldest first.
#[derive(Debug, Default)]
pub struct SlidingLog {
    hits: VecDeque<Instant>,
}

impl SlidingLog {
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(oldest) = self.hits.front() {
            if now.duration_since(*oldest) >= window {
                self.hits.pop_front();
            } else {
                break;
            }
        }
    }

    /// Prune, append `now`, return the resulting count.
    fn record(&mut self, now: Instant, window: Duration) -> usize {
        self.prune(now, window);
        self.hits.push_back(now);
        self.hits.len()
    }

    fn is_idle(&self) -> bool {
        self.hits.is_empty()
    }
}

type Key = String;

/// Process-local store. Limits are per running instance only.
#[derive(Clone, Default)]
pub struct InMemoryRateLimitStore {
    map: Arc<DashMap<Key, Arc<Mutex<SlidingLog>>>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronous core of the store, usable without a runtime.
    pub fn hit(&self, key: &str, limit: u32, window: Duration) -> bool {
        self.hit_at(key, limit, window, Instant::now())
    }

    pub fn hit_at(&self, key: &str, limit: u32, window: Duration, now: Instant) -> bool {
        // Record under the shard lock so a concurrent purge cannot orphan the log.
        let count = self
            .map
            .entry(key.to_string())
            .or_default()
            .lock()
            .record(now, window);
        count > limit as usize
    }

    pub fn purge_at(&self, window: Duration, now: Instant) -> usize {
        let before = self.map.len();
        self.map.retain(|_, log| {
            let mut log = log.lock();
            log.prune(now, window);
            !log.is_idle()
        });
        before.saturating_sub(self.map.len())
    }

    pub fn tracked_keys(&self) -> usize {
        self.map.len()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn is_rate_limited(&self, key: &str, limit: u32, window: Duration) -> Result<bool, RateLimitError> {
        Ok(self.hit(key, limit, window))
    }

    async fn purge_expired(&self, window: Duration) -> usize {
        self.purge_at(window, Instant::now())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
