//! Core types for the market data service.
//!
//! This crate provides the shared data types used across the service:
//! instrument identifiers, fixed-point prices, share quantities, and the
//! `Quote` record that every other crate reads or mutates.
//!
//! # Modules
//!
//! - [`ids`]: identifier newtypes, symbol handling, price scale constant
//! - [`quote`]: the per-instrument quote record and its derived values
//! - [`time`]: local wall-clock helpers and timestamp formatting

pub mod ids;
pub mod quote;
pub mod time;

// Re-exports for convenience
pub use ids::{canonical_symbol, InstrumentId, Price, Quantity, Symbol, PRICE_SCALE};
pub use quote::Quote;
pub use time::{iso_timestamp, now_local};
