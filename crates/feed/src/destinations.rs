//! Destination strings for the pub/sub surface.
//!
//! Clients subscribe to topics; the service pushes per-session replies to
//! user queues. The application destination is where clients send
//! subscription requests.

use types::{canonical_symbol, Symbol};

/// Bulk snapshot topic: every tick, all symbols.
pub const TOPIC_ALL: &str = "/topic/market/all";

/// Per-session subscription reply queue (delivered with the `/user` prefix).
pub const QUEUE_SUBSCRIPTION: &str = "/queue/subscription";

/// Application destination for subscription request messages.
pub const APP_SUBSCRIBE: &str = "/app/market/subscribe";

/// Prefix for all per-symbol market topics.
pub const TOPIC_MARKET_PREFIX: &str = "/topic/market/";

/// Topic carrying one symbol's updates, e.g. `/topic/market/AAPL`.
pub fn market_topic(symbol: &str) -> String {
    format!("{}{}", TOPIC_MARKET_PREFIX, canonical_symbol(symbol))
}

/// Extract the symbol from a per-symbol market topic, if it is one.
///
/// Returns `None` for `/topic/market/all` and for non-market destinations.
pub fn symbol_of_topic(destination: &str) -> Option<Symbol> {
    let tail = destination.strip_prefix(TOPIC_MARKET_PREFIX)?;
    if tail.is_empty() || tail == "all" || tail.contains('/') {
        return None;
    }
    Some(canonical_symbol(tail))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_topic_canonicalizes() {
        assert_eq!(market_topic("aapl"), "/topic/market/AAPL");
        assert_eq!(market_topic("MSFT"), "/topic/market/MSFT");
    }

    #[test]
    fn test_symbol_of_topic() {
        assert_eq!(symbol_of_topic("/topic/market/AAPL"), Some("AAPL".to_string()));
        assert_eq!(symbol_of_topic("/topic/market/all"), None);
        assert_eq!(symbol_of_topic("/topic/market/"), None);
        assert_eq!(symbol_of_topic("/queue/subscription"), None);
        assert_eq!(symbol_of_topic("/topic/market/A/B"), None);
    }
}
