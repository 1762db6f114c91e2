//! RedisStore — every read/write the system performs against Redis.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use pulse_analyzer::{ProofQuery, ProofSearch};
use pulse_common::{
    CompetitorConfig, DriftAnalysis, MarketPulseReport, ProofRecord, Snapshot,
};

use crate::keys;

/// Snapshots retained per competitor.
const SNAPSHOT_RETENTION: isize = 10;
/// Drift analyses retained per competitor.
const ANALYSIS_RETENTION: isize = 50;
/// Market Pulse reports retained.
const REPORT_RETENTION: isize = 100;

#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect once at process start; the manager reconnects internally.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("Invalid Redis URL")?;
        let conn = client
            .get_connection_manager()
            .await
            .context("Failed to connect to Redis")?;
        Ok(Self { conn })
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(key).await?;
        match raw {
            Some(json) => Ok(Some(
                serde_json::from_str(&json).with_context(|| format!("Corrupt JSON at {key}"))?,
            )),
            None => Ok(None),
        }
    }

    async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(value)?;
        let _: () = conn.set(key, json).await?;
        Ok(())
    }

    /// Fetch each id's entity, skipping (and logging) dangling index entries.
    async fn fetch_all<T: DeserializeOwned>(
        &self,
        ids: &[String],
        key_fn: impl Fn(&str) -> String,
    ) -> Result<Vec<T>> {
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get_json::<T>(&key_fn(id)).await? {
                Some(value) => out.push(value),
                None => warn!(id = id.as_str(), "Index references missing entity"),
            }
        }
        Ok(out)
    }

    // --- Competitor configuration ---

    pub async fn add_competitor(&self, config: &CompetitorConfig) -> Result<()> {
        self.set_json(&keys::competitor_config(&config.url), config)
            .await?;
        let mut conn = self.conn.clone();
        let _: () = conn.sadd(keys::COMPETITOR_CONFIGS, &config.url).await?;
        Ok(())
    }

    pub async fn get_competitor(&self, url: &str) -> Result<Option<CompetitorConfig>> {
        self.get_json(&keys::competitor_config(url)).await
    }

    pub async fn competitors(&self) -> Result<Vec<CompetitorConfig>> {
        let mut conn = self.conn.clone();
        let urls: Vec<String> = conn.smembers(keys::COMPETITOR_CONFIGS).await?;
        self.fetch_all(&urls, keys::competitor_config).await
    }

    /// Apply a partial update to an existing competitor config.
    pub async fn update_competitor(
        &self,
        url: &str,
        name: Option<String>,
        active: Option<bool>,
        last_scanned: Option<DateTime<Utc>>,
    ) -> Result<CompetitorConfig> {
        let mut config = self
            .get_competitor(url)
            .await?
            .with_context(|| format!("Competitor not found: {url}"))?;
        if let Some(name) = name {
            config.name = name;
        }
        if let Some(active) = active {
            config.active = active;
        }
        if let Some(at) = last_scanned {
            config.last_scanned = Some(at);
        }
        self.set_json(&keys::competitor_config(url), &config).await?;
        Ok(config)
    }

    // --- Snapshots ---

    pub async fn save_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        self.set_json(&keys::snapshot(&snapshot.id), snapshot).await?;
        let mut conn = self.conn.clone();
        let index = keys::snapshots_by_competitor(&snapshot.competitor_url);
        let _: () = conn.lpush(&index, &snapshot.id).await?;
        let _: () = conn.ltrim(&index, 0, SNAPSHOT_RETENTION - 1).await?;
        Ok(())
    }

    /// Newest retained snapshot (index head).
    pub async fn latest_snapshot(&self, competitor_url: &str) -> Result<Option<Snapshot>> {
        self.snapshot_at(competitor_url, 0, 0).await
    }

    /// Oldest retained snapshot (index tail) — the comparison baseline.
    pub async fn baseline_snapshot(&self, competitor_url: &str) -> Result<Option<Snapshot>> {
        self.snapshot_at(competitor_url, -1, -1).await
    }

    async fn snapshot_at(
        &self,
        competitor_url: &str,
        start: isize,
        stop: isize,
    ) -> Result<Option<Snapshot>> {
        let mut conn = self.conn.clone();
        let ids: Vec<String> = conn
            .lrange(keys::snapshots_by_competitor(competitor_url), start, stop)
            .await?;
        match ids.first() {
            Some(id) => self.get_json(&keys::snapshot(id)).await,
            None => Ok(None),
        }
    }

    pub async fn snapshot_history(
        &self,
        competitor_url: &str,
        limit: usize,
    ) -> Result<Vec<Snapshot>> {
        let Some(stop) = range_stop(limit) else {
            return Ok(Vec::new());
        };
        let mut conn = self.conn.clone();
        let ids: Vec<String> = conn
            .lrange(keys::snapshots_by_competitor(competitor_url), 0, stop)
            .await?;
        self.fetch_all(&ids, keys::snapshot).await
    }

    // --- Drift analyses ---

    pub async fn save_analysis(&self, analysis: &DriftAnalysis) -> Result<()> {
        self.set_json(&keys::drift_analysis(&analysis.id), analysis)
            .await?;
        let mut conn = self.conn.clone();
        let index = keys::drift_by_competitor(&analysis.competitor_url);
        let _: () = conn.lpush(&index, &analysis.id).await?;
        let _: () = conn.ltrim(&index, 0, ANALYSIS_RETENTION - 1).await?;
        Ok(())
    }

    pub async fn latest_analysis(&self, competitor_url: &str) -> Result<Option<DriftAnalysis>> {
        let mut conn = self.conn.clone();
        let ids: Vec<String> = conn
            .lrange(keys::drift_by_competitor(competitor_url), 0, 0)
            .await?;
        match ids.first() {
            Some(id) => self.get_json(&keys::drift_analysis(id)).await,
            None => Ok(None),
        }
    }

    /// The most recent analysis for every configured competitor that has one.
    pub async fn latest_analyses(&self) -> Result<Vec<DriftAnalysis>> {
        let mut analyses = Vec::new();
        for config in self.competitors().await? {
            if let Some(analysis) = self.latest_analysis(&config.url).await? {
                analyses.push(analysis);
            }
        }
        Ok(analyses)
    }

    // --- Proof vault ---

    pub async fn save_proof(&self, proof: &ProofRecord) -> Result<()> {
        self.set_json(&keys::proof_record(&proof.proof_id), proof)
            .await?;
        let mut conn = self.conn.clone();
        let _: () = conn.sadd(keys::PROOF_RECORDS, &proof.proof_id).await?;
        Ok(())
    }

    pub async fn get_proof(&self, proof_id: &str) -> Result<Option<ProofRecord>> {
        self.get_json(&keys::proof_record(proof_id)).await
    }

    pub async fn all_proofs(&self) -> Result<Vec<ProofRecord>> {
        let mut conn = self.conn.clone();
        let ids: Vec<String> = conn.smembers(keys::PROOF_RECORDS).await?;
        self.fetch_all(&ids, keys::proof_record).await
    }

    pub async fn delete_proof(&self, proof_id: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(keys::proof_record(proof_id)).await?;
        let _: () = conn.srem(keys::PROOF_RECORDS, proof_id).await?;
        Ok(())
    }

    // --- Market Pulse reports ---

    pub async fn save_report(&self, report: &MarketPulseReport) -> Result<()> {
        self.set_json(&keys::report(&report.id), report).await?;
        let mut conn = self.conn.clone();
        let _: () = conn.lpush(keys::REPORTS, &report.id).await?;
        let _: () = conn.ltrim(keys::REPORTS, 0, REPORT_RETENTION - 1).await?;
        Ok(())
    }

    pub async fn get_report(&self, id: &str) -> Result<Option<MarketPulseReport>> {
        self.get_json(&keys::report(id)).await
    }

    pub async fn recent_reports(&self, limit: usize) -> Result<Vec<MarketPulseReport>> {
        let Some(stop) = range_stop(limit) else {
            return Ok(Vec::new());
        };
        let mut conn = self.conn.clone();
        let ids: Vec<String> = conn.lrange(keys::REPORTS, 0, stop).await?;
        self.fetch_all(&ids, keys::report).await
    }
}

/// Inclusive LRANGE stop index for a `limit`-sized page. None for a zero
/// limit: `limit as isize - 1` would produce -1, which Redis reads as
/// "through the end of the list".
fn range_stop(limit: usize) -> Option<isize> {
    if limit == 0 {
        None
    } else {
        Some(limit as isize - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_limit_never_reaches_redis_as_minus_one() {
        // LRANGE k 0 -1 is the whole list; a zero limit must short-circuit.
        assert_eq!(range_stop(0), None);
    }

    #[test]
    fn positive_limits_map_to_inclusive_stops() {
        assert_eq!(range_stop(1), Some(0));
        assert_eq!(range_stop(10), Some(9));
    }
}

/// Proof lookup for the action validator. Set membership is unordered, so
/// match ordering among ties is whatever Redis returns — callers must not
/// rely on it.
#[async_trait]
impl ProofSearch for RedisStore {
    async fn search_proofs(&self, query: &ProofQuery) -> Result<Vec<ProofRecord>> {
        let proofs = self.all_proofs().await?;
        Ok(proofs.into_iter().filter(|p| query.matches(p)).collect())
    }
}
