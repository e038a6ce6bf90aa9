//! The in-process message hub: destination-routed delivery to sessions.
//!
//! Each connected session registers a bounded outbound queue; the hub
//! routes published envelopes to every session subscribed to the target
//! destination and user sends directly to one session. Delivery is
//! `try_send`: a session that cannot keep up loses messages instead of
//! blocking the tick. Per-session order matches publish order — one queue
//! per session, no reordering.
//!
//! Senders are cloned out under the read lock and used after it is
//! released, so no lock is held across a delivery.

use feed::{Envelope, Transport, TransportError};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Default per-session outbound queue depth.
const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Prefix applied to user-destination deliveries, mirroring broker user
/// destinations (`/user/queue/...`).
const USER_PREFIX: &str = "/user";

/// Outbound frame as written to the socket.
#[derive(Debug, Serialize)]
struct ServerFrame<'a> {
    destination: &'a str,
    #[serde(flatten)]
    envelope: &'a Envelope,
}

struct SessionEntry {
    tx: mpsc::Sender<String>,
    destinations: HashSet<String>,
}

/// Session registry and destination router.
pub struct MessageHub {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    queue_capacity: usize,
}

impl Default for MessageHub {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageHub {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    /// Create a hub with a custom per-session queue depth.
    pub fn with_capacity(queue_capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            queue_capacity,
        }
    }

    /// Register a session and hand back its outbound queue.
    pub fn register(&self, session_id: &str) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        self.sessions.write().insert(
            session_id.to_string(),
            SessionEntry {
                tx,
                destinations: HashSet::new(),
            },
        );
        debug!(session = session_id, "session registered");
        rx
    }

    /// Drop a session. Idempotent.
    pub fn unregister(&self, session_id: &str) {
        if self.sessions.write().remove(session_id).is_some() {
            debug!(session = session_id, "session unregistered");
        }
    }

    /// Subscribe a session to a destination. Returns false for unknown
    /// sessions.
    pub fn subscribe(&self, session_id: &str, destination: &str) -> bool {
        match self.sessions.write().get_mut(session_id) {
            Some(entry) => {
                entry.destinations.insert(destination.to_string());
                true
            }
            None => false,
        }
    }

    /// Unsubscribe a session from a destination.
    pub fn unsubscribe(&self, session_id: &str, destination: &str) {
        if let Some(entry) = self.sessions.write().get_mut(session_id) {
            entry.destinations.remove(destination);
        }
    }

    /// Number of connected sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    fn frame(destination: &str, envelope: &Envelope) -> Result<String, TransportError> {
        serde_json::to_string(&ServerFrame {
            destination,
            envelope,
        })
        .map_err(|e| TransportError::Delivery(e.to_string()))
    }
}

impl Transport for MessageHub {
    fn publish(&self, destination: &str, envelope: &Envelope) -> Result<(), TransportError> {
        let payload = Self::frame(destination, envelope)?;

        // Clone the targets out, then deliver without the lock.
        let targets: Vec<(String, mpsc::Sender<String>)> = self
            .sessions
            .read()
            .iter()
            .filter(|(_, entry)| entry.destinations.contains(destination))
            .map(|(id, entry)| (id.clone(), entry.tx.clone()))
            .collect();

        for (session_id, tx) in targets {
            match tx.try_send(payload.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(
                        session = %session_id,
                        destination,
                        "outbound queue full; dropping message"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    // Socket task is gone; disconnect cleanup will
                    // unregister shortly.
                    debug!(session = %session_id, "outbound queue closed");
                }
            }
        }
        Ok(())
    }

    fn send_to_user(
        &self,
        session_id: &str,
        destination: &str,
        envelope: &Envelope,
    ) -> Result<(), TransportError> {
        let user_destination = format!("{}{}", USER_PREFIX, destination);
        let payload = Self::frame(&user_destination, envelope)?;

        let tx = self
            .sessions
            .read()
            .get(session_id)
            .map(|entry| entry.tx.clone())
            .ok_or_else(|| TransportError::UnknownSession(session_id.to_string()))?;

        match tx.try_send(payload) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                Err(TransportError::QueueFull(session_id.to_string()))
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                Err(TransportError::UnknownSession(session_id.to_string()))
            }
        }
    }
}
