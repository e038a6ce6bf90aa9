//! Seed catalog parsing.
//!
//! The seed source is a JSON array of instrument records. Individual
//! malformed entries are logged and skipped; only an unreadable or
//! non-array file is fatal.

use serde::Deserialize;
use tracing::warn;
use types::{canonical_symbol, now_local, InstrumentId, Price, Quantity, Quote};

/// One instrument record as it appears in the seed file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedRecord {
    pub id: u64,
    pub symbol: String,
    pub name: String,
    pub last_price: f64,
    #[serde(default)]
    pub bid: Option<f64>,
    #[serde(default)]
    pub ask: Option<f64>,
    pub volume: u64,
}

impl SeedRecord {
    /// Convert into a live quote, canonicalizing the symbol and stamping
    /// the current wall clock.
    pub fn into_quote(self) -> Quote {
        Quote {
            id: InstrumentId(self.id),
            symbol: canonical_symbol(&self.symbol),
            name: self.name,
            last_price: Price::from_float(self.last_price),
            bid: self.bid.map(Price::from_float),
            ask: self.ask.map(Price::from_float),
            volume: Quantity(self.volume),
            timestamp: now_local(),
        }
    }
}

/// Parse seed JSON into quotes.
///
/// Returns the parsed quotes and the number of entries that were skipped
/// as malformed. A top-level parse failure (not a JSON array) is returned
/// as the error string.
pub fn parse_seed(json: &str) -> std::result::Result<(Vec<Quote>, usize), String> {
    let entries: Vec<serde_json::Value> =
        serde_json::from_str(json).map_err(|e| e.to_string())?;

    let mut quotes = Vec::with_capacity(entries.len());
    let mut skipped = 0;
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<SeedRecord>(entry) {
            Ok(record) => quotes.push(record.into_quote()),
            Err(e) => {
                warn!(index, error = %e, "skipping malformed seed entry");
                skipped += 1;
            }
        }
    }

    Ok((quotes, skipped))
}
