use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pulse_common::Config;
use pulse_report::Mailer;
use pulse_scout::{HttpScraper, Scout};
use pulse_store::RedisStore;

/// Run one competitor scan cycle from the command line.
#[derive(Parser)]
#[command(name = "pulse-scan", about = "Scan competitor pages for messaging drift")]
struct Args {
    /// Scan a single competitor URL instead of all active ones.
    #[arg(long)]
    url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let args = Args::parse();

    info!("Market Sensor scan starting...");

    let config = Config::from_env();
    let store = RedisStore::connect(&config.redis_url).await?;
    let mailer = Mailer::from_config(&config);
    let scout = Scout::new(store.clone(), Box::new(HttpScraper::new()), mailer);

    match args.url {
        Some(url) => {
            let competitor = store
                .get_competitor(&url)
                .await?
                .with_context(|| format!("Competitor not found: {url}"))?;
            match scout.scan_competitor(&competitor).await? {
                Some(analysis) => info!(
                    url = url.as_str(),
                    score = analysis.drift_score,
                    "Scan complete"
                ),
                None => info!(url = url.as_str(), "Scan complete, no baseline yet"),
            }
        }
        None => {
            let stats = scout.run().await?;
            info!("Scan run complete. {stats}");
        }
    }

    Ok(())
}
