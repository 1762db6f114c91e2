//! Scan driver: walk active competitors, snapshot each page, analyze drift
//! against the retained baseline, and dispatch the Market Pulse digest when
//! anything material moved.

use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use pulse_analyzer::{analyze_drift, validate};
use pulse_common::{
    CompetitorConfig, DriftAnalysis, DriftImplication, TRAJECTORY_THRESHOLD,
};
use pulse_report::{build_report, render_email, Mailer};
use pulse_store::RedisStore;

use crate::extract::extract_snapshot;
use crate::scraper::PageScraper;

/// Stats from one scan cycle.
#[derive(Debug, Default)]
pub struct ScanStats {
    pub scanned: u32,
    pub failed: u32,
    pub analyses: u32,
    pub high_drift: u32,
}

impl std::fmt::Display for ScanStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\n=== Scan Complete ===")?;
        writeln!(f, "Competitors scanned: {}", self.scanned)?;
        writeln!(f, "Competitors failed:  {}", self.failed)?;
        writeln!(f, "Drift analyses:      {}", self.analyses)?;
        writeln!(f, "High drift (>= {}):  {}", TRAJECTORY_THRESHOLD, self.high_drift)?;
        Ok(())
    }
}

pub struct Scout {
    store: RedisStore,
    scraper: Box<dyn PageScraper>,
    mailer: Mailer,
}

impl Scout {
    pub fn new(store: RedisStore, scraper: Box<dyn PageScraper>, mailer: Mailer) -> Self {
        Self {
            store,
            scraper,
            mailer,
        }
    }

    /// Run a full scan cycle over all active competitors. Per-competitor
    /// failures are logged and skipped; a digest is built only when at least
    /// one competitor crossed the drift threshold.
    pub async fn run(&self) -> Result<ScanStats> {
        let competitors = self.store.competitors().await?;
        let active: Vec<CompetitorConfig> =
            competitors.into_iter().filter(|c| c.active).collect();

        info!(
            count = active.len(),
            scraper = self.scraper.name(),
            "Starting competitor scan"
        );

        let mut stats = ScanStats::default();
        let mut analyses: Vec<DriftAnalysis> = Vec::new();

        for config in &active {
            match self.scan_competitor(config).await {
                Ok(Some(analysis)) => {
                    stats.scanned += 1;
                    stats.analyses += 1;
                    if analysis.drift_score >= TRAJECTORY_THRESHOLD {
                        stats.high_drift += 1;
                    }
                    analyses.push(analysis);
                }
                Ok(None) => stats.scanned += 1,
                Err(e) => {
                    warn!(url = config.url.as_str(), error = %e, "Competitor scan failed, continuing");
                    stats.failed += 1;
                }
            }
        }

        if stats.high_drift > 0 {
            self.dispatch_report(analyses).await?;
        } else {
            info!("No significant drift this cycle, skipping report");
        }

        Ok(stats)
    }

    /// Scan one competitor: snapshot the page, then analyze against the
    /// oldest retained snapshot. Returns None on the first ever snapshot,
    /// when there is no baseline to compare against.
    pub async fn scan_competitor(
        &self,
        config: &CompetitorConfig,
    ) -> Result<Option<DriftAnalysis>> {
        info!(url = config.url.as_str(), "Scanning competitor");

        let html = self.scraper.scrape(&config.url).await?;
        let snapshot = extract_snapshot(&html, &config.url, &config.name);
        self.store.save_snapshot(&snapshot).await?;

        let analysis = match self.store.baseline_snapshot(&config.url).await? {
            Some(baseline) if baseline.id != snapshot.id => {
                let analysis = analyze_drift(&baseline, &snapshot);
                self.store.save_analysis(&analysis).await?;
                info!(
                    url = config.url.as_str(),
                    score = analysis.drift_score,
                    implications = analysis.implications.len(),
                    "Drift analyzed"
                );
                Some(analysis)
            }
            _ => {
                info!(url = config.url.as_str(), "First snapshot, no baseline yet");
                None
            }
        };

        self.store
            .update_competitor(&config.url, None, None, Some(Utc::now()))
            .await?;

        Ok(analysis)
    }

    /// Gate every implication through the proof vault, render and send the
    /// email, and persist the report. The send is best-effort: a failure is
    /// logged and the report is still written with sent_via_email=false.
    async fn dispatch_report(&self, analyses: Vec<DriftAnalysis>) -> Result<()> {
        let implications: Vec<DriftImplication> = analyses
            .iter()
            .flat_map(|a| a.implications.iter().cloned())
            .collect();
        let actions = validate(&self.store, &implications).await?;

        let (subject, html) = render_email(&analyses, &actions);
        let mut report = build_report(analyses, actions);

        match self.mailer.send(&subject, &html) {
            Ok(true) => {
                report.sent_via_email = true;
                report.sent_at = Some(Utc::now());
            }
            Ok(false) => info!("Email dispatch disabled, persisting report only"),
            Err(e) => warn!(error = %e, "Email send failed, persisting report anyway"),
        }

        self.store.save_report(&report).await?;
        info!(report_id = report.id.as_str(), "Market Pulse report persisted");
        Ok(())
    }
}
