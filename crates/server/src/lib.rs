//! Server crate: the axum adapter in front of the feed core.
//!
//! Bridges HTTP/WebSocket clients to the catalog, subscription index, and
//! dispatcher:
//!
//! ```text
//! ┌──────────────┐   REST lookups   ┌─────────┐
//! │ axum routes  │ ───────────────► │ Catalog │
//! └──────────────┘                  └─────────┘
//! ┌──────────────┐  frames   ┌────────────────┐  mutations  ┌───────┐
//! │ /ws/market   │ ────────► │ SessionGateway │ ──────────► │ Index │
//! └──────────────┘           └────────────────┘             └───────┘
//!        ▲  outbound messages   ┌────────────┐
//!        └───────────────────── │ MessageHub │ ◄── Dispatcher (ticks)
//!                               └────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: router construction and middleware
//! - [`state`]: shared application state for handlers
//! - [`error`]: REST error envelope with `IntoResponse`
//! - [`auth`]: bearer-token validation at WebSocket connect
//! - [`hub`]: the in-process Transport implementation
//! - [`rate_limit`]: per-session fixed-window limiter for app sends
//! - [`routes`]: HTTP route handlers (market data, internal, health, ws)

pub mod app;
pub mod auth;
pub mod error;
pub mod hub;
pub mod rate_limit;
pub mod routes;
pub mod state;

// Re-exports for convenience
pub use app::create_app;
pub use auth::{AuthenticatedUser, JwtAuthenticator};
pub use error::{ApiError, ApiResult};
pub use hub::MessageHub;
pub use rate_limit::ActionRateLimiter;
pub use state::AppState;
