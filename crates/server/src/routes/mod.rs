//! HTTP route handlers.
//!
//! - [`api`]: public market data lookups
//! - [`internal`]: service-to-service stock lookups
//! - [`health`]: liveness probe and data freshness reports
//! - [`ws`]: the real-time WebSocket endpoint

pub mod api;
pub mod health;
pub mod internal;
pub mod ws;
