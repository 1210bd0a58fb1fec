use std::{sync::Arc, time::Duration};

use derive_more::Display;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    entities::submission::SpamSignals,
    repositories::rate_limit::RateLimitStore,
    settings::AppConfig,
};

static SCHEME_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)https?://").expect("valid link regex"));
static WWW_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bwww\.").expect("valid www regex"));

#[derive(Debug, Clone)]
pub struct SpamPolicy {
    pub rate_limit: u32,
    pub rate_window: Duration,
    pub max_links: usize,
    pub max_message_chars: usize,
    pub max_subject_chars: usize,
    pub min_fill_ms: i64,
}

impl Default for SpamPolicy {
    fn default() -> Self {
        SpamPolicy {
            rate_limit: 8,
            rate_window: Duration::from_secs(10 * 60),
            max_links: 2,
            max_message_chars: 4000,
            max_subject_chars: 200,
            min_fill_ms: 1500,
        }
    }
}

impl From<&AppConfig> for SpamPolicy {
    fn from(config: &AppConfig) -> Self {
        SpamPolicy {
            rate_limit: config.rate_limit_max,
            rate_window: config.rate_limit_window(),
            max_links: config.spam_max_links,
            max_message_chars: config.spam_max_message_chars,
            max_subject_chars: config.spam_max_subject_chars,
            min_fill_ms: config.spam_min_fill_ms,
        }
    }
}

/// Why a submission was dropped without telling the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SpamVerdict {
    #[display("rate limit exceeded")]
    RateLimited,

    #[display("too many links")]
    TooManyLinks,

    #[display("oversized message or subject")]
    Oversized,

    #[display("honeypot filled")]
    Honeypot,

    #[display("submitted too fast")]
    TooFast,
}

pub fn count_links(text: &str) -> usize {
    SCHEME_LINK.find_iter(text).count() + WWW_LINK.find_iter(text).count()
}

/// `startedAt` must be a positive epoch-millisecond value at least `min_fill_ms` in the past.
pub fn filled_too_fast(started_at: &str, now_ms: i64, min_fill_ms: i64) -> bool {
    match started_at.trim().parse::<f64>() {
        Ok(started) if started.is_finite() && started > 0.0 => (now_ms as f64 - started) < min_fill_ms as f64,
        _ => true,
    }
}

/// The content heuristics, in order, after the rate limit has been consulted.
pub fn content_verdict(policy: &SpamPolicy, signals: &SpamSignals, now_ms: i64) -> Option<SpamVerdict> {
    if count_links(&signals.message) > policy.max_links {
        return Some(SpamVerdict::TooManyLinks);
    }
    if signals.message.chars().count() > policy.max_message_chars
        || signals.subject.chars().count() > policy.max_subject_chars
    {
        return Some(SpamVerdict::Oversized);
    }
    if !signals.honeypot.trim().is_empty() {
        return Some(SpamVerdict::Honeypot);
    }
    if filled_too_fast(&signals.started_at, now_ms, policy.min_fill_ms) {
        return Some(SpamVerdict::TooFast);
    }
    None
}

pub fn rate_limit_key(client_ip: &str, email: &str) -> String {
    format!("{}:{}", client_ip, email.trim().to_lowercase())
}

#[derive(Clone)]
pub struct SpamGuard {
    pub policy: SpamPolicy,
    pub store: Arc<dyn RateLimitStore>,
}

impl SpamGuard {
    pub fn new(policy: SpamPolicy, store: Arc<dyn RateLimitStore>) -> Self {
        SpamGuard { policy, store }
    }

    /// Runs every heuristic; `Some` means answer with a silent success.
    pub async fn inspect(&self, client_ip: &str, signals: &SpamSignals, now_ms: i64) -> Option<SpamVerdict> {
        let key = rate_limit_key(client_ip, &signals.email);
        match self.store
            .is_rate_limited(&key, self.policy.rate_limit, self.policy.rate_window)
            .await
        {
            Ok(true) => return Some(SpamVerdict::RateLimited),
            Ok(false) => {}
            Err(e) => tracing::warn!("Rate limiting skipped: {}", e),
        }

        content_verdict(&self.policy, signals, now_ms)
    }
}
