use std::{env, time::Duration};

use actix_web::{middleware::{from_fn, NormalizePath}, web, App, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;
use bythewave_backend::{
    background_task::start_rate_limit_sweep,
    constants::START_TIME,
    graceful_shutdown::shutdown_signal,
    middlewares::cors::{build_cors, preflight_no_content},
    routes::configure_routes,
    settings::AppConfig,
    use_cases::extractors::PayloadLimit,
    AppState,
};

fn init_tracing() {
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let production = env::var("APP_ENV")
        .map(|v| v.eq_ignore_ascii_case("production"))
        .unwrap_or(false);

    if production {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_tracing();
    once_cell::sync::Lazy::force(&START_TIME);

    let config = match AppConfig::new() {
        Ok(cfg) => {
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        },
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if config.resend_api_key.is_none() {
        tracing::warn!("RESEND_API_KEY is not set; form submissions will fail with a configuration error");
    }

    let app_state = match AppState::new(&config) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            tracing::error!("Failed to build application state: {}", e);
            std::process::exit(1);
        }
    };

    if config.rate_limit_sweep_secs > 0 {
        tokio::spawn(start_rate_limit_sweep(
            app_state.rate_limiter.clone(),
            config.rate_limit_window(),
            Duration::from_secs(config.rate_limit_sweep_secs),
        ));
    }

    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "🚀 Starting {} v{} on {} (rate limit backend: {})",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr,
        app_state.rate_limiter.backend()
    );

    let cors_origins = config.cors_origins();
    let payload_limit = PayloadLimit(config.max_payload_bytes);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(payload_limit)
            .wrap(build_cors(&cors_origins))
            .wrap(from_fn(preflight_no_content))
            .wrap(NormalizePath::trim())
            .wrap(TracingLogger::default())
            .configure(configure_routes)
    })
    .workers(config.worker_count.max(1))
    .bind(server_addr)?
    .run();

    tokio::select! {
        res = server => res,
        _ = shutdown_signal() => Ok(()),
    }
}
