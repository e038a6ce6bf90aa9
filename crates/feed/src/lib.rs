//! Tick engine, fan-out dispatch, and session lifecycle.
//!
//! This crate turns catalog state into messages on the wire:
//!
//! ```text
//! ┌────────────┐  advance + snapshot  ┌────────────┐   publish    ┌───────────┐
//! │ TickEngine │ ───────────────────► │ Dispatcher │ ───────────► │ Transport │
//! │ (periodic) │                      │ (fan-out)  │              │ (abstract)│
//! └────────────┘                      └────────────┘              └───────────┘
//!        │ sweep                            ▲ replies
//!        ▼                                  │
//! ┌───────────────────┐   mutations  ┌────────────────┐
//! │ SubscriptionIndex │ ◄─────────── │ SessionGateway │ ◄── transport events
//! └───────────────────┘              └────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`envelope`]: wire envelopes and the per-symbol quote message
//! - [`destinations`]: topic/queue destination strings
//! - [`snapshot`]: the immutable output of one tick
//! - [`transport`]: the delivery seam the server implements
//! - [`dispatcher`]: snapshot fan-out and subscription replies
//! - [`engine`]: the two periodic tasks (broadcast tick, expiry sweep)
//! - [`session`]: connect/subscribe/disconnect handling
//! - [`health`]: per-symbol data freshness monitoring

pub mod destinations;
pub mod dispatcher;
pub mod engine;
pub mod envelope;
pub mod health;
pub mod session;
pub mod snapshot;
pub mod transport;

pub use dispatcher::Dispatcher;
pub use engine::{EngineHandle, TickEngine, TickEngineConfig};
pub use envelope::{Envelope, EnvelopeKind, QuoteMessage};
pub use health::{HealthMonitor, HealthThresholds, SymbolStatus, SystemStatus};
pub use session::{SessionGateway, SubscriptionRequest};
pub use snapshot::TickSnapshot;
pub use transport::{Transport, TransportError};
