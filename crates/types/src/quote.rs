//! The per-instrument quote record.
//!
//! A `Quote` is the unit of market state: last traded price, bid/ask, and
//! volume, stamped with the wall clock of its last mutation. Spread and mid
//! price are derived on demand rather than stored.
//!
//! Bid and ask are optional: seed data may omit them, and consumers must
//! fall back gracefully. The simulator can briefly produce crossed quotes
//! (bid above ask) under high volatility; nothing here prevents that.

use crate::ids::{InstrumentId, Price, Quantity, Symbol};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Point-in-time market state for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Stable numeric identifier.
    pub id: InstrumentId,
    /// Canonical (upper-case) ticker symbol.
    pub symbol: Symbol,
    /// Display name.
    pub name: String,
    /// Last traded price.
    pub last_price: Price,
    /// Best bid, if quoted.
    pub bid: Option<Price>,
    /// Best ask, if quoted.
    pub ask: Option<Price>,
    /// Cumulative traded volume.
    pub volume: Quantity,
    /// Wall clock of the last mutation (local date-time).
    pub timestamp: NaiveDateTime,
}

impl Quote {
    /// Bid/ask spread. Zero when either side is absent.
    pub fn spread(&self) -> Price {
        match (self.bid, self.ask) {
            (Some(bid), Some(ask)) => ask - bid,
            _ => Price::ZERO,
        }
    }

    /// Mid price: `(bid + ask) / 2` when both sides are present, falling
    /// back to the last traded price.
    pub fn mid_price(&self) -> Price {
        match (self.bid, self.ask) {
            (Some(bid), Some(ask)) => Price((bid.raw() + ask.raw()) / 2),
            _ => self.last_price,
        }
    }
}
