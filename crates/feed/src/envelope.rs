//! Wire envelopes.
//!
//! Every message pushed over the real-time transport is one [`Envelope`]:
//! a type tag, an optional human-readable message, an optional JSON data
//! payload, and a timestamp string. Tick-originated envelopes share the
//! tick's frozen timestamp; system-generated replies stamp their own.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use types::{iso_timestamp, now_local, Price, Quantity, Quote, Symbol};

/// Envelope type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeKind {
    /// One symbol's update on its market topic.
    MarketData,
    /// Whole-catalog update on the bulk topic.
    BulkMarketData,
    /// Positive reply to a subscription request.
    SubscriptionSuccess,
    /// Negative reply to a subscription request.
    SubscriptionError,
}

/// One message on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    pub timestamp: String,
}

impl Envelope {
    /// Per-symbol market data envelope carrying the shared tick timestamp.
    pub fn market_data(data: serde_json::Value, tick_timestamp: &str) -> Self {
        Self {
            kind: EnvelopeKind::MarketData,
            message: None,
            data: Some(data),
            timestamp: tick_timestamp.to_string(),
        }
    }

    /// Bulk market data envelope carrying the shared tick timestamp.
    pub fn bulk_market_data(data: serde_json::Value, symbol_count: usize, tick_timestamp: &str) -> Self {
        Self {
            kind: EnvelopeKind::BulkMarketData,
            message: Some(format!("Bulk market data update - {} symbols", symbol_count)),
            data: Some(data),
            timestamp: tick_timestamp.to_string(),
        }
    }

    /// Subscription success reply, stamped now.
    pub fn subscription_success(message: impl Into<String>) -> Self {
        Self {
            kind: EnvelopeKind::SubscriptionSuccess,
            message: Some(message.into()),
            data: None,
            timestamp: iso_timestamp(now_local()),
        }
    }

    /// Subscription error reply, stamped now.
    pub fn subscription_error(message: impl Into<String>) -> Self {
        Self {
            kind: EnvelopeKind::SubscriptionError,
            message: Some(message.into()),
            data: None,
            timestamp: iso_timestamp(now_local()),
        }
    }
}

/// Per-symbol record inside market data envelopes.
///
/// Unlike the REST quote, this carries the derived spread and mid price,
/// plus a status field (always `live` for simulator-fed data).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteMessage {
    pub symbol: Symbol,
    pub name: String,
    pub last_price: Price,
    pub bid: Option<Price>,
    pub ask: Option<Price>,
    pub spread: Price,
    pub mid_price: Price,
    pub volume: Quantity,
    pub timestamp: NaiveDateTime,
    pub status: String,
}

impl QuoteMessage {
    /// Build the live message record for one quote.
    pub fn live(quote: &Quote) -> Self {
        Self {
            symbol: quote.symbol.clone(),
            name: quote.name.clone(),
            last_price: quote.last_price,
            bid: quote.bid,
            ask: quote.ask,
            spread: quote.spread(),
            mid_price: quote.mid_price(),
            volume: quote.volume,
            timestamp: quote.timestamp,
            status: "live".to_string(),
        }
    }
}
