//! Liveness probe and data freshness reports.
//!
//! # Endpoints
//!
//! - `GET /health` - liveness probe (200 whenever the server is up)
//! - `GET /api/v1/market/health` - whole-catalog freshness report
//! - `GET /api/v1/market/health/{symbol}` - one symbol's freshness or 404

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use feed::health::{HealthReport, SymbolHealth};
use serde::Serialize;

/// Liveness response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LivenessResponse {
    pub status: &'static str,
    pub symbols: usize,
    pub sessions: usize,
    pub active_subscriptions: usize,
    pub uptime_secs: u64,
}

/// Liveness probe: `GET /health`
pub async fn liveness(State(state): State<AppState>) -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "healthy",
        symbols: state.catalog.len(),
        sessions: state.hub.session_count(),
        active_subscriptions: state.index.active_count(),
        uptime_secs: state.uptime_secs(),
    })
}

/// Freshness report: `GET /api/v1/market/health`
pub async fn market_health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.health.report())
}

/// Per-symbol freshness: `GET /api/v1/market/health/{symbol}`
pub async fn symbol_health(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> ApiResult<Json<SymbolHealth>> {
    state
        .health
        .symbol_health(&symbol)
        .map(Json)
        .ok_or(ApiError::NotFound)
}
