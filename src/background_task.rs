use std::sync::Arc;

use tokio::time::{interval, Duration};

use crate::repositories::rate_limit::RateLimitStore;

/// Periodically forgets clients whose attempts all aged out of the window.
pub async fn start_rate_limit_sweep(store: Arc<dyn RateLimitStore>, window: Duration, every: Duration) {
    let mut interval = interval(every);

    loop {
        interval.tick().await;

        let purged = store.purge_expired(window).await;
        if purged > 0 {
            tracing::debug!("Released {} idle rate limit keys", purged);
        }
    }
}
