use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use pulse_common::Config;
use pulse_report::Mailer;
use pulse_scout::{HttpScraper, Scout};
use pulse_store::RedisStore;

mod routes;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting pulse-api");

    let config = Config::from_env();
    let store = RedisStore::connect(&config.redis_url).await?;
    let mailer = Mailer::from_config(&config);
    let scout = Scout::new(store.clone(), Box::new(HttpScraper::new()), mailer);

    let state = Arc::new(routes::AppState {
        store,
        scout,
        cron_secret: config.cron_secret.clone(),
    });

    let app = routes::build_router(state);

    let addr = format!("{}:{}", config.web_host, config.web_port);
    tracing::info!(addr = addr.as_str(), "Listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
