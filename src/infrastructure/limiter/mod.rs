pub mod rate_limiter;
pub mod redis_store;
