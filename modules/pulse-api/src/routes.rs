//! HTTP surface: competitor management, scans, drift readout, proof vault,
//! reports, and CSV export.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

use pulse_analyzer::{validate, ProofQuery, ProofSearch};
use pulse_common::{
    ActionItem, CompetitorConfig, DriftAnalysis, NarrativeTag, Persona, ProofRecord, PulseError,
    Stage,
};
use pulse_report::export_csv;
use pulse_scout::Scout;
use pulse_store::RedisStore;

pub struct AppState {
    pub store: RedisStore,
    pub scout: Scout,
    pub cron_secret: String,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health))
        .route(
            "/api/competitors",
            get(list_competitors)
                .post(add_competitor)
                .patch(update_competitor),
        )
        .route("/api/scan", post(scan))
        .route("/api/cron/scan", get(cron_scan))
        .route("/api/drift", get(latest_drift))
        .route("/api/snapshots", get(snapshots))
        .route(
            "/api/proof",
            get(get_proofs).post(add_proof).delete(delete_proof),
        )
        .route("/api/reports", get(reports))
        .route("/api/export", get(export))
        .layer(cors)
        .with_state(state)
}

// --- Error helpers ---

type ApiError = (StatusCode, Json<serde_json::Value>);

/// Map collaborator failures to a response. Typed domain errors keep their
/// status; anything else is a 500 with the detail kept out of the body.
fn internal(e: anyhow::Error) -> ApiError {
    match e.downcast_ref::<PulseError>() {
        Some(PulseError::NotFound(msg)) => not_found(msg),
        Some(PulseError::Validation(msg)) => bad_request(msg),
        Some(PulseError::Scrape(msg)) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({"error": msg.clone()})),
        ),
        _ => {
            error!(error = %e, "Request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal error"})),
            )
        }
    }
}

fn bad_request(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({"error": message})))
}

fn not_found(message: &str) -> ApiError {
    (StatusCode::NOT_FOUND, Json(json!({"error": message})))
}

/// Bearer token check for the cron endpoint.
fn bearer_authorized(headers: &HeaderMap, secret: &str) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| token == secret)
}

// --- Request/query structs ---

#[derive(Deserialize)]
struct AddCompetitorRequest {
    url: String,
    name: String,
}

#[derive(Deserialize)]
struct UpdateCompetitorRequest {
    url: String,
    name: Option<String>,
    active: Option<bool>,
}

#[derive(Deserialize)]
struct ScanRequest {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProofSearchParams {
    proof_id: Option<String>,
    narrative_tag: Option<NarrativeTag>,
    persona: Option<Persona>,
    stage: Option<Stage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProofSubmission {
    evidence_sentence: Option<String>,
    source_link: Option<String>,
    narrative_tag: Option<NarrativeTag>,
    persona_tag: Option<Persona>,
    stage: Option<Stage>,
    expiry_date: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteProofParams {
    proof_id: String,
}

/// Latest snapshot by default; `limit` switches to history mode.
#[derive(Deserialize)]
struct SnapshotsQuery {
    url: String,
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct ReportsQuery {
    id: Option<String>,
    limit: Option<usize>,
}

/// Reports listed without an explicit limit.
const DEFAULT_REPORT_LIMIT: usize = 10;

// --- Handlers ---

async fn health() -> &'static str {
    "ok"
}

async fn list_competitors(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let competitors = state.store.competitors().await.map_err(internal)?;
    Ok(Json(competitors).into_response())
}

async fn add_competitor(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddCompetitorRequest>,
) -> Result<Response, ApiError> {
    if req.name.trim().is_empty() {
        return Err(bad_request("name is required"));
    }
    let parsed = url::Url::parse(&req.url).map_err(|_| bad_request("url must be a valid URL"))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(bad_request("url must be http or https"));
    }

    let config = CompetitorConfig {
        url: req.url,
        name: req.name,
        active: true,
        last_scanned: None,
        added_at: Utc::now(),
    };
    state.store.add_competitor(&config).await.map_err(internal)?;
    Ok((StatusCode::CREATED, Json(config)).into_response())
}

async fn update_competitor(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateCompetitorRequest>,
) -> Result<Response, ApiError> {
    if state
        .store
        .get_competitor(&req.url)
        .await
        .map_err(internal)?
        .is_none()
    {
        return Err(not_found("Competitor not found"));
    }
    let config = state
        .store
        .update_competitor(&req.url, req.name, req.active, None)
        .await
        .map_err(internal)?;
    Ok(Json(config).into_response())
}

/// Scan one competitor when a url is given, otherwise run the full cycle.
async fn scan(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScanRequest>,
) -> Result<Response, ApiError> {
    match req.url {
        Some(url) => {
            let config = state
                .store
                .get_competitor(&url)
                .await
                .map_err(internal)?
                .ok_or_else(|| not_found("Competitor not found"))?;
            let analysis = state
                .scout
                .scan_competitor(&config)
                .await
                .map_err(internal)?;
            Ok(Json(json!({
                "url": url,
                "analyzed": analysis.is_some(),
                "driftScore": analysis.map(|a| a.drift_score),
            }))
            .into_response())
        }
        None => {
            let stats = state.scout.run().await.map_err(internal)?;
            Ok(scan_summary(&stats).into_response())
        }
    }
}

/// Scheduler entry point. Same as a full scan, gated by CRON_SECRET.
async fn cron_scan(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if !bearer_authorized(&headers, &state.cron_secret) {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Unauthorized"})),
        ));
    }
    let stats = state.scout.run().await.map_err(internal)?;
    Ok(scan_summary(&stats).into_response())
}

fn scan_summary(stats: &pulse_scout::ScanStats) -> Json<serde_json::Value> {
    Json(json!({
        "scanned": stats.scanned,
        "failed": stats.failed,
        "analyses": stats.analyses,
        "highDrift": stats.high_drift,
    }))
}

async fn latest_drift(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let analyses = state.store.latest_analyses().await.map_err(internal)?;
    Ok(Json(analyses).into_response())
}

async fn snapshots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SnapshotsQuery>,
) -> Result<Response, ApiError> {
    match query.limit {
        Some(limit) => {
            let history = state
                .store
                .snapshot_history(&query.url, limit)
                .await
                .map_err(internal)?;
            Ok(Json(history).into_response())
        }
        None => {
            let latest = state
                .store
                .latest_snapshot(&query.url)
                .await
                .map_err(internal)?
                .ok_or_else(|| not_found("No snapshots for competitor"))?;
            Ok(Json(latest).into_response())
        }
    }
}

async fn get_proofs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProofSearchParams>,
) -> Result<Response, ApiError> {
    if let Some(proof_id) = params.proof_id {
        let proof = state
            .store
            .get_proof(&proof_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| not_found("Proof not found"))?;
        return Ok(Json(proof).into_response());
    }

    let query = ProofQuery {
        narrative_tag: params.narrative_tag,
        persona: params.persona,
        stage: params.stage,
    };
    let proofs = state
        .store
        .search_proofs(&query)
        .await
        .map_err(internal)?;
    Ok(Json(proofs).into_response())
}

async fn add_proof(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProofSubmission>,
) -> Result<Response, ApiError> {
    let evidence_sentence = req
        .evidence_sentence
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| bad_request("evidenceSentence is required"))?;
    let source_link = req
        .source_link
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| bad_request("sourceLink is required"))?;
    let narrative_tag = req
        .narrative_tag
        .ok_or_else(|| bad_request("narrativeTag is required"))?;
    let persona_tag = req
        .persona_tag
        .ok_or_else(|| bad_request("personaTag is required"))?;
    let stage = req.stage.ok_or_else(|| bad_request("stage is required"))?;

    let now = Utc::now();
    let proof = ProofRecord {
        proof_id: ProofRecord::derive_id(narrative_tag, persona_tag, now),
        evidence_sentence,
        source_link,
        persona_tag,
        narrative_tag,
        stage,
        expiry_date: req.expiry_date,
        created_at: now,
        updated_at: now,
    };
    state.store.save_proof(&proof).await.map_err(internal)?;
    Ok((StatusCode::CREATED, Json(proof)).into_response())
}

async fn delete_proof(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DeleteProofParams>,
) -> Result<Response, ApiError> {
    if state
        .store
        .get_proof(&params.proof_id)
        .await
        .map_err(internal)?
        .is_none()
    {
        return Err(not_found("Proof not found"));
    }
    state
        .store
        .delete_proof(&params.proof_id)
        .await
        .map_err(internal)?;
    Ok(Json(json!({"deleted": params.proof_id})).into_response())
}

async fn reports(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportsQuery>,
) -> Result<Response, ApiError> {
    if let Some(id) = query.id {
        let report = state
            .store
            .get_report(&id)
            .await
            .map_err(internal)?
            .ok_or_else(|| not_found("Report not found"))?;
        return Ok(Json(report).into_response());
    }
    let limit = query.limit.unwrap_or(DEFAULT_REPORT_LIMIT);
    let reports = state.store.recent_reports(limit).await.map_err(internal)?;
    Ok(Json(reports).into_response())
}

/// CSV download of the latest analysis per competitor, with each
/// implication's action gate recomputed against the current vault.
async fn export(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let analyses = state.store.latest_analyses().await.map_err(internal)?;

    let mut rows: Vec<(DriftAnalysis, Vec<ActionItem>)> = Vec::with_capacity(analyses.len());
    for analysis in analyses {
        let actions = validate(&state.store, &analysis.implications)
            .await
            .map_err(internal)?;
        rows.push((analysis, actions));
    }

    let csv = export_csv(&rows);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"market-pulse-export.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}
