//! Internal service-to-service stock lookups.
//!
//! # Endpoints
//!
//! - `GET /internal/stock/{symbol}` - validate a symbol, minimal record
//! - `GET /internal/stock/id/{stockId}` - lookup by numeric id
//!
//! These endpoints are for sibling services and should not be exposed
//! through the public gateway.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use tracing::debug;
use types::{InstrumentId, Price, Quote, Symbol};

/// Minimal stock record for internal consumers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockResponse {
    pub id: InstrumentId,
    pub symbol: Symbol,
    pub name: String,
    pub current_price: Price,
}

impl From<Quote> for StockResponse {
    fn from(quote: Quote) -> Self {
        Self {
            id: quote.id,
            symbol: quote.symbol,
            name: quote.name,
            current_price: quote.last_price,
        }
    }
}

/// Validate a stock symbol: `GET /internal/stock/{symbol}`
pub async fn validate_stock(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> ApiResult<Json<StockResponse>> {
    debug!(%symbol, "internal stock validation");
    state
        .catalog
        .get(&symbol)
        .map(|quote| Json(StockResponse::from(quote)))
        .ok_or(ApiError::NotFound)
}

/// Lookup by id: `GET /internal/stock/id/{stockId}`
pub async fn get_stock_by_id(
    State(state): State<AppState>,
    Path(stock_id): Path<String>,
) -> ApiResult<Json<StockResponse>> {
    let id: u64 = stock_id
        .parse()
        .map_err(|_| ApiError::InvalidArgument("stock id must be numeric".to_string()))?;

    debug!(id, "internal stock lookup by id");
    state
        .catalog
        .get_by_id(InstrumentId(id))
        .map(|quote| Json(StockResponse::from(quote)))
        .ok_or(ApiError::NotFound)
}
