//! The delivery seam between the feed and the real-time server.
//!
//! The dispatcher hands `(destination, envelope)` pairs to a [`Transport`]
//! and trusts it to route per-destination to subscribed sessions. Delivery
//! is best-effort: implementations must drop rather than block when a
//! receiver cannot keep up, and the dispatcher logs failures and moves on.
//!
//! Implementations must not require the caller to hold any index or
//! catalog lock across a call.

use crate::envelope::Envelope;

/// Errors a transport can report for a single delivery.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The target session is not connected.
    #[error("session {0} is not connected")]
    UnknownSession(String),
    /// The session's outbound queue is full; the message was dropped.
    #[error("outbound queue full for session {0}")]
    QueueFull(String),
    /// The payload could not be serialized or delivered.
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Abstract pub/sub delivery layer.
pub trait Transport: Send + Sync {
    /// Publish to every session subscribed to `destination`.
    fn publish(&self, destination: &str, envelope: &Envelope) -> Result<(), TransportError>;

    /// Deliver to a single session's user destination (e.g. the
    /// per-session subscription reply queue).
    fn send_to_user(
        &self,
        session_id: &str,
        destination: &str,
        envelope: &Envelope,
    ) -> Result<(), TransportError>;
}
