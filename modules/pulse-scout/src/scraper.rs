use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{info, warn};

use pulse_common::PulseError;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; MarketSensorBot/1.0)";
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches a competitor page and returns its raw HTML.
#[async_trait]
pub trait PageScraper: Send + Sync {
    async fn scrape(&self, url: &str) -> Result<String>;
    fn name(&self) -> &str;
}

/// Plain HTTP scraper. Marketing pages render their hero and pricing copy
/// server-side, so no headless browser is involved.
pub struct HttpScraper {
    client: reqwest::Client,
}

impl HttpScraper {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(FETCH_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

impl Default for HttpScraper {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageScraper for HttpScraper {
    async fn scrape(&self, url: &str) -> Result<String> {
        let parsed = url::Url::parse(url).context("Invalid URL")?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(PulseError::Scrape(format!(
                "Only http/https URLs are allowed, got: {}",
                parsed.scheme()
            ))
            .into());
        }

        info!(url, scraper = "http", "Scraping URL");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request failed for {url}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PulseError::Scrape(format!("Fetch failed for {url}: HTTP {status}")).into());
        }

        let html = response
            .text()
            .await
            .with_context(|| format!("Failed to read body for {url}"))?;

        if html.trim().is_empty() {
            warn!(url, scraper = "http", "Empty HTML response");
        } else {
            info!(url, scraper = "http", bytes = html.len(), "Scraped successfully");
        }
        Ok(html)
    }

    fn name(&self) -> &str {
        "http"
    }
}
