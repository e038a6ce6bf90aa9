//! End-to-end scenarios over the feed core: gateway → index → engine →
//! dispatcher, observed through a recording transport.

use chrono::Duration as ChronoDuration;
use feed::destinations::{QUEUE_SUBSCRIPTION, TOPIC_ALL};
use feed::{
    Dispatcher, Envelope, EnvelopeKind, SessionGateway, SubscriptionRequest, TickEngine,
    TickEngineConfig, Transport, TransportError,
};
use market::{Catalog, PriceSimulator};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::Arc;
use subscriptions::SubscriptionIndex;
use types::{now_local, InstrumentId, Price, Quantity, Quote};

/// Records every delivery the feed makes.
#[derive(Default)]
struct RecordingTransport {
    published: Mutex<Vec<(String, Envelope)>>,
    user_sends: Mutex<Vec<(String, String, Envelope)>>,
}

impl RecordingTransport {
    fn topics(&self) -> Vec<String> {
        self.published.lock().iter().map(|(d, _)| d.clone()).collect()
    }

    fn replies_for(&self, session_id: &str) -> Vec<Envelope> {
        self.user_sends
            .lock()
            .iter()
            .filter(|(s, _, _)| s == session_id)
            .map(|(_, _, e)| e.clone())
            .collect()
    }
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

struct Harness {
    catalog: Arc<Catalog>,
    index: Arc<SubscriptionIndex>,
    gateway: SessionGateway,
    engine: TickEngine,
    transport: Arc<RecordingTransport>,
}

fn seed_quote(id: u64, symbol: &str, last: f64, bid: f64, ask: f64, volume: u64) -> Quote {
    Quote {
        id: InstrumentId(id),
        symbol: symbol.to_string(),
        name: format!("{} Inc.", symbol),
        last_price: Price::from_float(last),
        bid: Some(Price::from_float(bid)),
        ask: Some(Price::from_float(ask)),
        volume: Quantity(volume),
        timestamp: now_local(),
    }
}

fn harness() -> Harness {
    let catalog = Arc::new(Catalog::from_quotes([
        seed_quote(1, "AAPL", 150.00, 149.95, 150.05, 1000),
        seed_quote(2, "MSFT", 410.25, 410.20, 410.30, 500),
    ]));
    let index = Arc::new(SubscriptionIndex::new(ChronoDuration::minutes(5)));
    let transport = Arc::new(RecordingTransport::default());
    let dispatcher = Arc::new(Dispatcher::new(transport.clone()));
    let gateway = SessionGateway::new(catalog.clone(), index.clone(), dispatcher.clone());
    let engine = TickEngine::new(
        catalog.clone(),
        index.clone(),
        dispatcher,
        PriceSimulator::new(0.02),
        TickEngineConfig::default(),
    );
    Harness {
        catalog,
        index,
        gateway,
        engine,
        transport,
    }
}

fn request(action: &str, symbols: &[&str]) -> SubscriptionRequest {
    SubscriptionRequest {
        action: Some(action.to_string()),
        symbols: symbols.iter().map(|s| s.to_string()).collect(),
        user_id: None,
    }
}

#[test]
fn subscribe_then_tick_delivers_topic_and_bulk() {
    let h = harness();
    h.gateway
        .handle_subscribe_request("s1", "user-1", &request("subscribe", &["aapl"]));

    // The success reply lands on the session's queue.
    let replies = h.transport.replies_for("s1");
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].kind, EnvelopeKind::SubscriptionSuccess);
    assert_eq!(
        h.transport.user_sends.lock()[0].1,
        QUEUE_SUBSCRIPTION
    );

    // Next tick: per-symbol topic plus the bulk topic.
    let mut rng = StdRng::seed_from_u64(1);
    h.engine.tick_once(&mut rng);

    let topics = h.transport.topics();
    assert!(topics.contains(&"/topic/market/AAPL".to_string()));
    assert!(topics.contains(&TOPIC_ALL.to_string()));
    // MSFT has no subscribers: no per-symbol envelope.
    assert!(!topics.contains(&"/topic/market/MSFT".to_string()));

    // Every envelope of the tick shares one timestamp, and both carry AAPL.
    let published = h.transport.published.lock();
    let timestamps: HashSet<&str> = published.iter().map(|(_, e)| e.timestamp.as_str()).collect();
    assert_eq!(timestamps.len(), 1);

    let (_, symbol_env) = published
        .iter()
        .find(|(d, _)| d == "/topic/market/AAPL")
        .unwrap();
    assert_eq!(symbol_env.data.as_ref().unwrap()["symbol"], "AAPL");

    let (_, bulk_env) = published.iter().find(|(d, _)| d == TOPIC_ALL).unwrap();
    assert_eq!(bulk_env.data.as_ref().unwrap()["AAPL"]["symbol"], "AAPL");
}

#[test]
fn subscribe_to_unknown_symbol_is_rejected() {
    let h = harness();
    h.gateway
        .handle_subscribe_request("s1", "user-1", &request("subscribe", &["ZZZZ"]));

    let replies = h.transport.replies_for("s1");
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].kind, EnvelopeKind::SubscriptionError);
    assert_eq!(
        replies[0].message.as_deref(),
        Some("None of the requested symbols are available")
    );
    assert!(h.index.get("s1").is_none());
}

#[test]
fn empty_symbol_list_is_rejected() {
    let h = harness();
    h.gateway
        .handle_subscribe_request("s1", "user-1", &request("subscribe", &[]));

    let replies = h.transport.replies_for("s1");
    assert_eq!(replies[0].kind, EnvelopeKind::SubscriptionError);
    assert_eq!(
        replies[0].message.as_deref(),
        Some("No symbols provided for subscription")
    );
}

#[test]
fn add_then_remove_adjusts_reverse_map() {
    let h = harness();
    h.gateway
        .handle_subscribe_request("s1", "user-1", &request("subscribe", &["AAPL"]));
    h.gateway
        .handle_subscribe_request("s1", "user-1", &request("add", &["MSFT"]));

    assert_eq!(
        h.index.subscribers_of("MSFT"),
        HashSet::from(["s1".to_string()])
    );

    h.gateway
        .handle_subscribe_request("s1", "user-1", &request("remove", &["aapl"]));

    assert!(h.index.subscribers_of("AAPL").is_empty());
    assert_eq!(
        h.index.subscribers_of("MSFT"),
        HashSet::from(["s1".to_string()])
    );
}

#[test]
fn disconnect_cleans_up_everything() {
    let h = harness();
    h.gateway
        .handle_subscribe_request("s1", "user-1", &request("subscribe", &["AAPL"]));
    h.gateway.handle_disconnect("s1");

    assert!(h.index.get("s1").is_none());
    assert!(h.index.subscribers_of("AAPL").is_empty());

    // The next tick no longer targets the AAPL topic.
    let mut rng = StdRng::seed_from_u64(1);
    h.engine.tick_once(&mut rng);
    assert!(!h
        .transport
        .topics()
        .contains(&"/topic/market/AAPL".to_string()));
}

#[test]
fn expiry_sweep_enforces_the_liveness_window() {
    let h = harness();
    h.gateway
        .handle_subscribe_request("s1", "user-1", &request("subscribe", &["AAPL"]));
    h.gateway
        .handle_subscribe_request("s2", "user-2", &request("subscribe", &["MSFT"]));

    // Time-travel the sweep clock instead of the records: four minutes of
    // age survives, six minutes does not.
    let now = now_local();
    h.index.sweep_expired_at(now + ChronoDuration::minutes(4));
    assert!(h.index.get("s1").is_some());
    assert!(h.index.get("s2").is_some());

    h.index.sweep_expired_at(now + ChronoDuration::minutes(6));
    assert!(h.index.get("s1").is_none());
    assert!(h.index.get("s2").is_none());
    // No trace left in the reverse map either.
    assert!(h.index.subscribers_of("AAPL").is_empty());
    assert!(h.index.subscribers_of("MSFT").is_empty());
}

#[test]
fn tick_advances_quotes_and_keeps_identity() {
    let h = harness();
    let before = h.catalog.get("AAPL").unwrap();

    let mut rng = StdRng::seed_from_u64(99);
    h.engine.tick_once(&mut rng);

    let after = h.catalog.get("AAPL").unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(after.symbol, "AAPL");
    assert!(after.timestamp >= before.timestamp);
    assert!(after.bid.is_some() && after.ask.is_some());
}
