//! The instrument catalog: single owner of the mutable quote table.
//!
//! Loaded once at startup from a seed file; after that, entries are only
//! mutated by the tick engine through [`Catalog::mutate`] while REST and
//! fan-out readers take copies. Readers always observe a fully written
//! quote — entries are swapped under the table lock, never partially.
//!
//! Lookup N is at most a few hundred instruments, so `get_by_id` scans.

use crate::error::{MarketError, Result};
use crate::seed::parse_seed;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;
use types::{canonical_symbol, InstrumentId, Quote, Symbol};

/// In-memory catalog of tradable instruments, keyed by canonical symbol.
#[derive(Debug)]
pub struct Catalog {
    quotes: RwLock<HashMap<Symbol, Quote>>,
}

impl Catalog {
    /// Load the catalog from a seed file.
    ///
    /// An unreadable or non-array file is fatal; individual malformed
    /// entries are skipped (logged by the parser). A seed that yields no
    /// instruments at all is also fatal — the service is useless without
    /// a catalog.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let raw = std::fs::read_to_string(path).map_err(|source| MarketError::SeedIo {
            path: path_str.clone(),
            source,
        })?;

        let (quotes, skipped) = parse_seed(&raw).map_err(|detail| MarketError::SeedFormat {
            path: path_str.clone(),
            detail,
        })?;

        if quotes.is_empty() {
            return Err(MarketError::EmptySeed { path: path_str });
        }

        info!(
            loaded = quotes.len(),
            skipped, path = %path_str,
            "loaded instrument catalog"
        );
        Ok(Self::from_quotes(quotes))
    }

    /// Build a catalog directly from quotes (seed already parsed).
    pub fn from_quotes(quotes: impl IntoIterator<Item = Quote>) -> Self {
        let table = quotes
            .into_iter()
            .map(|q| (q.symbol.clone(), q))
            .collect();
        Self {
            quotes: RwLock::new(table),
        }
    }

    /// Look up a quote by symbol. The argument is canonicalized first.
    pub fn get(&self, symbol: &str) -> Option<Quote> {
        self.quotes.read().get(&canonical_symbol(symbol)).cloned()
    }

    /// Look up a quote by instrument id (linear scan).
    pub fn get_by_id(&self, id: InstrumentId) -> Option<Quote> {
        self.quotes.read().values().find(|q| q.id == id).cloned()
    }

    /// Whether a symbol exists in the catalog.
    pub fn has(&self, symbol: &str) -> bool {
        self.quotes.read().contains_key(&canonical_symbol(symbol))
    }

    /// Point-in-time copy of the whole table.
    pub fn snapshot(&self) -> HashMap<Symbol, Quote> {
        self.quotes.read().clone()
    }

    /// All catalog symbols.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.quotes.read().keys().cloned().collect()
    }

    /// Apply a mutation to one entry under the table lock.
    ///
    /// Only the tick engine calls this. Returns false for unknown symbols.
    pub fn mutate<F: FnOnce(&mut Quote)>(&self, symbol: &str, f: F) -> bool {
        let mut table = self.quotes.write();
        match table.get_mut(&canonical_symbol(symbol)) {
            Some(quote) => {
                f(quote);
                true
            }
            None => false,
        }
    }

    /// Number of instruments.
    pub fn len(&self) -> usize {
        self.quotes.read().len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.quotes.read().is_empty()
    }
}
