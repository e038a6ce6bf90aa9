//! Public market data endpoints.
//!
//! # Endpoints
//!
//! - `GET /api/v1/market/data` - full symbol→quote map
//! - `GET /api/v1/market/data/{symbol}` - one quote or 404
//! - `GET /api/v1/market/symbols` - available symbols and count
//! - `GET /api/v1/market/symbols/{symbol}/available` - existence check
//! - `GET /api/v1/market/subscriptions/stats` - active subscription count
//! - `GET /api/v1/market/ping` - service liveness with system status
//!
//! All symbol arguments are canonicalized before lookup.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use feed::SystemStatus;
use serde::Serialize;
use std::collections::HashMap;
use types::{canonical_symbol, iso_timestamp, now_local, Quote, Symbol};

/// Full market data map: `GET /api/v1/market/data`
pub async fn get_all_market_data(State(state): State<AppState>) -> Json<HashMap<Symbol, Quote>> {
    Json(state.catalog.snapshot())
}

/// One symbol's quote: `GET /api/v1/market/data/{symbol}`
pub async fn get_market_data(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> ApiResult<Json<Quote>> {
    state
        .catalog
        .get(&symbol)
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// Symbol listing response.
#[derive(Debug, Serialize)]
pub struct SymbolsResponse {
    pub symbols: Vec<Symbol>,
    pub count: usize,
}

/// Available symbols: `GET /api/v1/market/symbols`
pub async fn get_symbols(State(state): State<AppState>) -> Json<SymbolsResponse> {
    let mut symbols = state.catalog.symbols();
    symbols.sort();
    let count = symbols.len();
    Json(SymbolsResponse { symbols, count })
}

/// Availability response.
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub symbol: Symbol,
    pub available: bool,
}

/// Existence check: `GET /api/v1/market/symbols/{symbol}/available`
pub async fn get_symbol_available(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Json<AvailabilityResponse> {
    let symbol = canonical_symbol(&symbol);
    let available = state.catalog.has(&symbol);
    Json(AvailabilityResponse { symbol, available })
}

/// Subscription statistics response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStatsResponse {
    pub active_subscriptions: usize,
    pub timestamp: String,
}

/// Subscription stats: `GET /api/v1/market/subscriptions/stats`
pub async fn get_subscription_stats(
    State(state): State<AppState>,
) -> Json<SubscriptionStatsResponse> {
    Json(SubscriptionStatsResponse {
        active_subscriptions: state.index.active_count(),
        timestamp: iso_timestamp(now_local()),
    })
}

/// Ping response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PingResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: String,
    pub system_status: SystemStatus,
}

/// Service liveness: `GET /api/v1/market/ping`
pub async fn ping(State(state): State<AppState>) -> Json<PingResponse> {
    Json(PingResponse {
        status: "alive",
        service: "market-service",
        timestamp: iso_timestamp(now_local()),
        system_status: state.health.system_status(),
    })
}
