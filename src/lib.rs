use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;

pub use domain::{entities, use_cases, validation};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{catalog, email, limiter, utils};

use catalog::graphql::GraphqlVehicleRepository;
use email::resend::ResendMailer;
use entities::email::MailRouting;
use limiter::{rate_limiter::InMemoryRateLimitStore, redis_store::RedisRateLimitStore};
use repositories::rate_limit::RateLimitStore;
use use_cases::{
    catalog::CatalogHandler,
    spam::{SpamGuard, SpamPolicy},
    submission::SubmissionHandler,
};

pub struct AppState {
    pub submission_handler: AppSubmissionHandler,
    pub catalog_handler: AppCatalogHandler,
    pub rate_limiter: Arc<dyn RateLimitStore>,
    pub trust_proxy_headers: bool,
}

pub type AppSubmissionHandler = SubmissionHandler<ResendMailer>;
pub type AppCatalogHandler = CatalogHandler<GraphqlVehicleRepository>;

impl AppState {
    pub fn new(config: &settings::AppConfig) -> anyhow::Result<Self> {
        let rate_limiter: Arc<dyn RateLimitStore> = match config.redis_url.as_deref() {
            Some(url) => match RedisRateLimitStore::new(url) {
                Ok(store) => Arc::new(store),
                Err(e) => {
                    tracing::error!("Redis rate limit store unavailable, using memory: {}", e);
                    Arc::new(InMemoryRateLimitStore::new())
                }
            },
            None => Arc::new(InMemoryRateLimitStore::new()),
        };

        Self::with_rate_limiter(config, rate_limiter)
    }

    pub fn with_rate_limiter(
        config: &settings::AppConfig,
        rate_limiter: Arc<dyn RateLimitStore>,
    ) -> anyhow::Result<Self> {
        let mailer = ResendMailer::new(
            config.resend_api_url.clone(),
            config.resend_api_key.clone(),
            config.provider_timeout(),
        )?;
        let routing = MailRouting {
            from: config.contact_from_email.clone(),
            to: config.contact_to_email.clone(),
        };
        let spam_guard = SpamGuard::new(SpamPolicy::from(config), rate_limiter.clone());
        let submission_handler = SubmissionHandler::new(mailer, spam_guard, routing);

        let http_client = reqwest::Client::builder()
            .timeout(config.provider_timeout())
            .build()?;
        let vehicle_repo = GraphqlVehicleRepository::new(http_client, config.graphql_endpoint.clone());
        let catalog_handler = CatalogHandler::new(vehicle_repo);

        Ok(AppState {
            submission_handler,
            catalog_handler,
            rate_limiter,
            trust_proxy_headers: config.trust_proxy_headers,
        })
    }
}
