//! Shared application state for route handlers.
//!
//! Cloned into each handler via axum's `State` extractor; every member is
//! behind an `Arc`, so clones are cheap.

use crate::auth::JwtAuthenticator;
use crate::hub::MessageHub;
use crate::rate_limit::ActionRateLimiter;
use feed::{Dispatcher, HealthMonitor, SessionGateway};
use market::Catalog;
use std::sync::Arc;
use std::time::Instant;
use subscriptions::SubscriptionIndex;

/// Everything the HTTP and WebSocket handlers need.
#[derive(Clone)]
pub struct AppState {
    /// The instrument catalog (read-only from here).
    pub catalog: Arc<Catalog>,
    /// The subscription index (read for stats; mutated via the gateway).
    pub index: Arc<SubscriptionIndex>,
    /// Reply channel for subscription requests.
    pub dispatcher: Arc<Dispatcher>,
    /// Session lifecycle handling.
    pub lifecycle: Arc<SessionGateway>,
    /// Session registry and destination router.
    pub hub: Arc<MessageHub>,
    /// Bearer-token validation at connect.
    pub auth: Arc<JwtAuthenticator>,
    /// Data freshness monitor.
    pub health: Arc<HealthMonitor>,
    /// Per-session limiter for application sends.
    pub rate_limiter: Arc<ActionRateLimiter>,
    /// Server start time.
    pub started_at: Instant,
}

impl AppState {
    /// Seconds since the server came up.
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
