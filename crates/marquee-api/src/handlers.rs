//! HTTP API handlers — the validation glue between parsed requests and
//! the registry, evaluator, and score store.
//!
//! Every response is a `{ success, ... }` envelope. Validation errors are
//! reported immediately with their category; storage failures are logged
//! in full but reported generically, with no internal detail in the body.

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use marquee_services::{
    anticheat, AntiCheatPolicy, ScoreCandidate, ScoreEntry, ScoreStore, SessionRegistry,
    TimeBounds, ValidationError,
};

#[derive(Clone)]
pub struct ApiState {
    pub registry: SessionRegistry,
    pub store: ScoreStore,
    pub policy: AntiCheatPolicy,
    pub bounds: TimeBounds,
    /// Cap on entries returned by a list request.
    pub list_limit: usize,
    pub started_at: Instant,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

fn failure(status: StatusCode, error: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: error.to_string(),
        }),
    )
}

// ── GET /api/scores ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ScoresResponse {
    pub success: bool,
    pub scores: Vec<ScoreEntry>,
}

pub async fn handle_list_scores(
    State(state): State<ApiState>,
) -> Result<Json<ScoresResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.store.list(state.list_limit) {
        Ok(scores) => Ok(Json(ScoresResponse {
            success: true,
            scores,
        })),
        Err(e) => {
            tracing::error!(error = %e, "score list failed");
            Err(failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage unavailable",
            ))
        }
    }
}

// ── POST /api/session/start ───────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StartResponse {
    pub success: bool,
    pub token: String,
    /// 16-hex-char prefix of the full signature — display echo only,
    /// never verified server-side.
    pub signature: String,
}

pub async fn handle_session_start(State(state): State<ApiState>) -> Json<StartResponse> {
    let issued = state.registry.start();
    Json(StartResponse {
        success: true,
        token: issued.token,
        signature: issued.partial_sig,
    })
}

// ── POST /api/session/interact ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct InteractRequest {
    pub token: Option<String>,
}

#[derive(Serialize)]
pub struct InteractResponse {
    pub success: bool,
}

/// Missing token, unknown token, and already-submitted all answer the
/// same `success: false` — no detail to probe.
pub async fn handle_interact(
    State(state): State<ApiState>,
    Json(req): Json<InteractRequest>,
) -> Json<InteractResponse> {
    let success = req
        .token
        .as_deref()
        .map(|token| state.registry.interact(token))
        .unwrap_or(false);
    Json(InteractResponse { success })
}

// ── POST /api/scores ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SubmitRequest {
    pub name: Option<String>,
    pub cinema: Option<String>,
    pub email: Option<String>,
    pub time: Option<u64>,
    pub token: Option<String>,
    #[serde(default)]
    pub mobile: bool,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    /// 1-based position on the stored board; 0 means the entry was slower
    /// than every retained entry and was not kept.
    pub rank: usize,
    pub score: ScoreEntry,
}

pub async fn handle_submit_score(
    State(state): State<ApiState>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, (StatusCode, Json<ErrorResponse>)> {
    // (a) required fields — blank-after-trim counts as missing
    let name = req.name.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let cinema = req
        .cinema
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let (Some(name), Some(cinema), Some(time_ms)) = (name, cinema, req.time) else {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            &ValidationError::MissingFields.to_string(),
        ));
    };

    // (b) hard domain bound, before any storage access
    if let Err(e) = state.bounds.check(time_ms) {
        return Err(failure(StatusCode::BAD_REQUEST, &e.to_string()));
    }

    // (c) spend the session, if a token came along. The entry is deleted
    // once consumed; a lost race shows up here as a plain miss.
    let snapshot = req.token.as_deref().and_then(|token| {
        let snapshot = state.registry.consume(token);
        state.registry.delete(token);
        snapshot
    });
    let verified = anticheat::evaluate(&state.policy, time_ms, snapshot.as_ref());

    let candidate = ScoreCandidate::new(
        name,
        cinema,
        req.email.as_deref(),
        time_ms,
        verified,
        req.mobile,
    );
    match state.store.insert(candidate).await {
        Ok((placement, score)) => Ok(Json(SubmitResponse {
            success: true,
            rank: placement.rank(),
            score,
        })),
        Err(e) => {
            tracing::error!(error = %e, "score insert failed");
            Err(failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage unavailable",
            ))
        }
    }
}

// ── GET /api/status ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StatusResponse {
    pub live_sessions: usize,
    pub scores_stored: usize,
    pub uptime_secs: u64,
}

pub async fn handle_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    let scores_stored = state.store.count().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "score count failed");
        0
    });
    Json(StatusResponse {
        live_sessions: state.registry.len(),
        scores_stored,
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}
