//! Fan-out of tick snapshots and subscription replies.
//!
//! Per tick, the dispatcher converts every quote to its wire record once,
//! publishes per-symbol envelopes only to topics that currently have
//! subscribers, and always publishes the bulk envelope. All envelopes of
//! one tick share the snapshot's frozen timestamp.
//!
//! A failed delivery to one destination never aborts the rest of the tick.

use crate::destinations::{market_topic, QUEUE_SUBSCRIPTION, TOPIC_ALL};
use crate::envelope::{Envelope, QuoteMessage};
use crate::snapshot::TickSnapshot;
use crate::transport::Transport;
use std::collections::HashMap;
use std::sync::Arc;
use subscriptions::SubscriptionIndex;
use tracing::{debug, info, warn};
use types::Symbol;

/// Routes snapshot-derived messages and per-session replies through the
/// transport.
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Fan one snapshot out to the current subscribers.
    pub fn broadcast(&self, snapshot: &TickSnapshot, index: &SubscriptionIndex) {
        if snapshot.is_empty() {
            return;
        }

        let messages: HashMap<&Symbol, QuoteMessage> = snapshot
            .quotes
            .iter()
            .map(|(symbol, quote)| (symbol, QuoteMessage::live(quote)))
            .collect();

        // Per-symbol topics, only where someone is listening.
        for (symbol, message) in &messages {
            if index.subscribers_of(symbol).is_empty() {
                continue;
            }
            let data = match serde_json::to_value(message) {
                Ok(data) => data,
                Err(e) => {
                    warn!(%symbol, error = %e, "failed to serialize market data message");
                    continue;
                }
            };
            let envelope = Envelope::market_data(data, &snapshot.timestamp);
            if let Err(e) = self.transport.publish(&market_topic(symbol), &envelope) {
                warn!(%symbol, error = %e, "market data delivery failed; continuing tick");
            }
        }

        // Bulk snapshot, always, with the exact same records and timestamp.
        match serde_json::to_value(&messages) {
            Ok(data) => {
                let envelope = Envelope::bulk_market_data(data, messages.len(), &snapshot.timestamp);
                if let Err(e) = self.transport.publish(TOPIC_ALL, &envelope) {
                    warn!(error = %e, "bulk market data delivery failed");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize bulk market data"),
        }

        debug!(symbols = snapshot.len(), "broadcast tick completed");
    }

    /// Positive subscription reply on the session's reply queue.
    pub fn send_success(&self, session_id: &str, symbols: &[Symbol]) {
        let mut sorted = symbols.to_vec();
        sorted.sort();
        let envelope = Envelope::subscription_success(format!(
            "Successfully subscribed to symbols: [{}]",
            sorted.join(", ")
        ));
        if let Err(e) = self
            .transport
            .send_to_user(session_id, QUEUE_SUBSCRIPTION, &envelope)
        {
            warn!(session = session_id, error = %e, "failed to deliver subscription success");
        }
        info!(session = session_id, symbols = ?sorted, "sent subscription success");
    }

    /// Negative subscription reply on the session's reply queue.
    pub fn send_error(&self, session_id: &str, reason: &str) {
        let envelope = Envelope::subscription_error(reason);
        if let Err(e) = self
            .transport
            .send_to_user(session_id, QUEUE_SUBSCRIPTION, &envelope)
        {
            warn!(session = session_id, error = %e, "failed to deliver subscription error");
        }
        warn!(session = session_id, reason, "sent subscription error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::EnvelopeKind;
    use crate::transport::TransportError;
    use chrono::Duration;
    use parking_lot::Mutex;
    use types::{now_local, InstrumentId, Price, Quantity, Quote};

    /// Records every delivery for assertions.
    #[derive(Default)]
    struct RecordingTransport {
        published: Mutex<Vec<(String, Envelope)>>,
        user_sends: Mutex<Vec<(String, String, Envelope)>>,
    }

    impl Transport for RecordingTransport {
        fn publish(&self, destination: &str, envelope: &Envelope) -> Result<(), TransportError> {
            self.published
                .lock()
                .push((destination.to_string(), envelope.clone()));
            Ok(())
        }

        fn send_to_user(
            &self,
            session_id: &str,
            destination: &str,
            envelope: &Envelope,
        ) -> Result<(), TransportError> {
            self.user_sends.lock().push((
                session_id.to_string(),
                destination.to_string(),
                envelope.clone(),
            ));
            Ok(())
        }
    }

    fn quote(symbol: &str, last: f64) -> Quote {
        Quote {
            id: InstrumentId(1),
            symbol: symbol.to_string(),
            name: format!("{} Co.", symbol),
            last_price: Price::from_float(last),
            bid: Some(Price::from_float(last - 0.05)),
            ask: Some(Price::from_float(last + 0.05)),
            volume: Quantity(1000),
            timestamp: now_local(),
        }
    }

    fn snapshot(symbols: &[&str]) -> TickSnapshot {
        let quotes = symbols
            .iter()
            .map(|s| (s.to_string(), quote(s, 100.0)))
            .collect();
        TickSnapshot::new(quotes, "2026-08-02T12:00:00.000".to_string())
    }

    #[test]
    fn test_broadcast_skips_symbols_without_subscribers() {
        let transport = Arc::new(RecordingTransport::default());
        let dispatcher = Dispatcher::new(transport.clone());
        let index = SubscriptionIndex::new(Duration::minutes(5));
        index.subscribe("s1", "u1", &["AAPL".to_string()]);

        dispatcher.broadcast(&snapshot(&["AAPL", "MSFT"]), &index);

        let published = transport.published.lock();
        let destinations: Vec<&str> = published.iter().map(|(d, _)| d.as_str()).collect();
        assert!(destinations.contains(&"/topic/market/AAPL"));
        assert!(!destinations.contains(&"/topic/market/MSFT"));
        // Bulk goes out regardless of subscribers.
        assert!(destinations.contains(&TOPIC_ALL));
    }

    #[test]
    fn test_broadcast_shares_one_timestamp() {
        let transport = Arc::new(RecordingTransport::default());
        let dispatcher = Dispatcher::new(transport.clone());
        let index = SubscriptionIndex::new(Duration::minutes(5));
        index.subscribe("s1", "u1", &["AAPL".to_string(), "MSFT".to_string()]);

        dispatcher.broadcast(&snapshot(&["AAPL", "MSFT"]), &index);

        let published = transport.published.lock();
        assert_eq!(published.len(), 3); // two topics + bulk
        for (_, envelope) in published.iter() {
            assert_eq!(envelope.timestamp, "2026-08-02T12:00:00.000");
        }
    }

    #[test]
    fn test_broadcast_empty_snapshot_is_silent() {
        let transport = Arc::new(RecordingTransport::default());
        let dispatcher = Dispatcher::new(transport.clone());
        let index = SubscriptionIndex::new(Duration::minutes(5));

        dispatcher.broadcast(&snapshot(&[]), &index);
        assert!(transport.published.lock().is_empty());
    }

    #[test]
    fn test_bulk_envelope_carries_all_records() {
        let transport = Arc::new(RecordingTransport::default());
        let dispatcher = Dispatcher::new(transport.clone());
        let index = SubscriptionIndex::new(Duration::minutes(5));

        dispatcher.broadcast(&snapshot(&["AAPL", "MSFT", "TSLA"]), &index);

        let published = transport.published.lock();
        let (_, bulk) = published
            .iter()
            .find(|(d, _)| d == TOPIC_ALL)
            .expect("bulk envelope");
        assert_eq!(bulk.kind, EnvelopeKind::BulkMarketData);
        assert_eq!(
            bulk.message.as_deref(),
            Some("Bulk market data update - 3 symbols")
        );
        let data = bulk.data.as_ref().unwrap();
        assert!(data.get("AAPL").is_some());
        assert!(data.get("TSLA").is_some());
    }

    #[test]
    fn test_replies_go_to_subscription_queue() {
        let transport = Arc::new(RecordingTransport::default());
        let dispatcher = Dispatcher::new(transport.clone());

        dispatcher.send_success("s1", &["MSFT".to_string(), "AAPL".to_string()]);
        dispatcher.send_error("s1", "No symbols provided for subscription");

        let sends = transport.user_sends.lock();
        assert_eq!(sends.len(), 2);
        assert_eq!(sends[0].0, "s1");
        assert_eq!(sends[0].1, QUEUE_SUBSCRIPTION);
        assert_eq!(sends[0].2.kind, EnvelopeKind::SubscriptionSuccess);
        // Symbol list is sorted for a stable message.
        assert_eq!(
            sends[0].2.message.as_deref(),
            Some("Successfully subscribed to symbols: [AAPL, MSFT]")
        );
        assert_eq!(sends[1].2.kind, EnvelopeKind::SubscriptionError);
    }
}
