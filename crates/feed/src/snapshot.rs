//! The immutable output of one tick.

use std::collections::HashMap;
use types::{Quote, Symbol};

/// Point-in-time copy of the catalog plus the tick's frozen timestamp.
///
/// Every message derived from one snapshot carries this one timestamp, so
/// per-symbol and bulk recipients observe coherent data. Snapshots live
/// only for the duration of one dispatch.
#[derive(Debug, Clone)]
pub struct TickSnapshot {
    /// Symbol → quote at the moment the snapshot was frozen.
    pub quotes: HashMap<Symbol, Quote>,
    /// The single timestamp string shared by every derived message.
    pub timestamp: String,
}

impl TickSnapshot {
    /// Freeze a snapshot.
    pub fn new(quotes: HashMap<Symbol, Quote>, timestamp: String) -> Self {
        Self { quotes, timestamp }
    }

    /// Number of symbols captured.
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    /// Whether the snapshot captured anything.
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}
