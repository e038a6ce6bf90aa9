//! Session lifecycle: transport events → index mutations.
//!
//! The gateway sits between the real-time server and the subscription
//! index. It validates subscription request messages, drops unknown
//! symbols (partial success is intended behavior), dispatches on the
//! requested action, and answers on the session's reply queue. Nothing in
//! here propagates an error back to the transport layer — a failed
//! request is answered with a `subscription_error` envelope and the
//! connection lives on.

use crate::dispatcher::Dispatcher;
use market::Catalog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use subscriptions::SubscriptionIndex;
use tracing::{debug, info, warn};
use types::{canonical_symbol, Symbol};

/// Application-level subscription request payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    /// One of `subscribe`, `add`, `remove`, `unsubscribe` (case-insensitive).
    /// Absent means `subscribe`.
    #[serde(default)]
    pub action: Option<String>,
    /// Requested symbols, in any case.
    #[serde(default)]
    pub symbols: Vec<String>,
    /// Client-supplied user id. Ignored: identity comes from the
    /// authenticated connection, not the payload.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Translates connect/subscribe/disconnect events into index mutations.
pub struct SessionGateway {
    catalog: Arc<Catalog>,
    index: Arc<SubscriptionIndex>,
    dispatcher: Arc<Dispatcher>,
}

impl SessionGateway {
    pub fn new(
        catalog: Arc<Catalog>,
        index: Arc<SubscriptionIndex>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            catalog,
            index,
            dispatcher,
        }
    }

    /// Handle an application subscription request.
    pub fn handle_subscribe_request(
        &self,
        session_id: &str,
        user_id: &str,
        request: &SubscriptionRequest,
    ) {
        info!(
            session = session_id,
            symbols = ?request.symbols,
            action = request.action.as_deref().unwrap_or("subscribe"),
            "received subscription request"
        );

        if request.symbols.is_empty() {
            self.dispatcher
                .send_error(session_id, "No symbols provided for subscription");
            return;
        }

        // Canonicalize and keep only symbols the catalog knows. Dropping
        // unknown symbols while honoring the rest is intended behavior.
        let mut filtered: BTreeSet<Symbol> = BTreeSet::new();
        for raw in &request.symbols {
            let symbol = canonical_symbol(raw);
            if self.catalog.has(&symbol) {
                filtered.insert(symbol);
            } else {
                warn!(%symbol, session = session_id, "requested symbol is not available");
            }
        }

        if filtered.is_empty() {
            self.dispatcher
                .send_error(session_id, "None of the requested symbols are available");
            return;
        }

        let symbols: Vec<Symbol> = filtered.into_iter().collect();
        let action = request.action.as_deref().unwrap_or("subscribe");

        match action.to_ascii_lowercase().as_str() {
            "subscribe" => {
                self.index.subscribe(session_id, user_id, &symbols);
                self.dispatcher.send_success(session_id, &symbols);
            }
            "add" => {
                self.index.add_symbols(session_id, &symbols);
                self.dispatcher.send_success(session_id, &symbols);
            }
            "remove" => {
                self.index.remove_symbols(session_id, &symbols);
                self.dispatcher.send_success(session_id, &symbols);
            }
            "unsubscribe" => {
                if symbols.is_empty() {
                    // Unreachable after the emptiness check above, but an
                    // explicit "drop everything" is the safe reading.
                    self.index.remove(session_id);
                    self.dispatcher.send_success(session_id, &["all".to_string()]);
                } else {
                    self.index.remove_symbols(session_id, &symbols);
                    self.dispatcher.send_success(session_id, &symbols);
                }
            }
            _ => {
                self.dispatcher
                    .send_error(session_id, &format!("Unknown action: {}", action));
            }
        }
    }

    /// A client subscribed to a topic destination: refresh activity only.
    /// Data arrives on the next tick; no immediate snapshot is sent.
    pub fn handle_topic_subscribe(&self, session_id: &str, destination: &str) {
        debug!(session = session_id, destination, "topic subscribe");
        self.index.touch(session_id);
    }

    /// Transport-level disconnect: drop the session's subscription.
    pub fn handle_disconnect(&self, session_id: &str) {
        info!(session = session_id, "session disconnected; cleaning up");
        self.index.remove(session_id);
    }
}
