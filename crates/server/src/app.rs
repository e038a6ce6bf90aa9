//! Axum application builder.
//!
//! Wires routes, middleware, and state into the service router.

use crate::routes::{api, health, internal, ws};
use crate::state::AppState;
use axum::routing::get;
use axum::Router;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the axum application with all routes.
pub fn create_app(state: AppState) -> Router {
    // CORS for browser-based frontends.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        // Liveness
        .route("/health", get(health::liveness))
        // Real-time endpoint
        .route("/ws/market", get(ws::ws_handler))
        // Public market data API
        .route("/api/v1/market/data", get(api::get_all_market_data))
        .route("/api/v1/market/data/{symbol}", get(api::get_market_data))
        .route("/api/v1/market/symbols", get(api::get_symbols))
        .route(
            "/api/v1/market/symbols/{symbol}/available",
            get(api::get_symbol_available),
        )
        .route(
            "/api/v1/market/subscriptions/stats",
            get(api::get_subscription_stats),
        )
        .route("/api/v1/market/health", get(health::market_health))
        .route("/api/v1/market/health/{symbol}", get(health::symbol_health))
        .route("/api/v1/market/ping", get(api::ping))
        // Internal service-to-service lookups
        .route("/internal/stock/{symbol}", get(internal::validate_stock))
        .route("/internal/stock/id/{stockId}", get(internal::get_stock_by_id))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // State
        .with_state(state)
}
