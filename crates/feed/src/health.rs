//! Market data freshness monitoring.
//!
//! Every quote carries the wall clock of its last mutation, so health is
//! derived: a symbol whose quote has not moved within the stale threshold
//! is `stale`, and past the unavailable threshold it is `unavailable`.
//! A periodic check logs status transitions; the REST layer reads reports
//! on demand.

use chrono::NaiveDateTime;
use market::Catalog;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use types::{canonical_symbol, now_local, Symbol};

/// Freshness state of one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolStatus {
    Healthy,
    Stale,
    Unavailable,
}

/// Overall service data status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemStatus {
    Normal,
    Degraded,
    Critical,
}

/// Age thresholds for the freshness checks.
#[derive(Debug, Clone, Copy)]
pub struct HealthThresholds {
    /// Older than this and a symbol is reported stale.
    pub stale_after: Duration,
    /// Older than this and a symbol is reported unavailable.
    pub unavailable_after: Duration,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(30),
            unavailable_after: Duration::from_secs(60),
        }
    }
}

/// Freshness report for one symbol.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolHealth {
    pub symbol: Symbol,
    pub status: SymbolStatus,
    pub last_update: NaiveDateTime,
    pub age_seconds: i64,
}

/// Whole-catalog freshness report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub system_status: SystemStatus,
    pub symbols: HashMap<Symbol, SymbolHealth>,
    pub checked_at: NaiveDateTime,
}

/// Derives freshness from catalog timestamps and remembers the previous
/// status per symbol so transitions can be logged.
pub struct HealthMonitor {
    catalog: Arc<Catalog>,
    thresholds: HealthThresholds,
    previous: Mutex<HashMap<Symbol, SymbolStatus>>,
}

impl HealthMonitor {
    pub fn new(catalog: Arc<Catalog>, thresholds: HealthThresholds) -> Self {
        Self {
            catalog,
            thresholds,
            previous: Mutex::new(HashMap::new()),
        }
    }

    /// Freshness of one symbol, or `None` if it is not in the catalog.
    pub fn symbol_health(&self, symbol: &str) -> Option<SymbolHealth> {
        let quote = self.catalog.get(&canonical_symbol(symbol))?;
        Some(self.classify(&quote.symbol, quote.timestamp, now_local()))
    }

    /// Full report over the current catalog.
    pub fn report(&self) -> HealthReport {
        let now = now_local();
        let symbols: HashMap<Symbol, SymbolHealth> = self
            .catalog
            .snapshot()
            .into_iter()
            .map(|(symbol, quote)| {
                let health = self.classify(&symbol, quote.timestamp, now);
                (symbol, health)
            })
            .collect();

        let system_status = Self::overall(&symbols);
        HealthReport {
            system_status,
            symbols,
            checked_at: now,
        }
    }

    /// Current overall status.
    pub fn system_status(&self) -> SystemStatus {
        Self::overall(&self.report().symbols)
    }

    /// One periodic check: compute the report and log transitions.
    pub fn check(&self) {
        let report = self.report();
        let mut previous = self.previous.lock();
        for (symbol, health) in &report.symbols {
            let old = previous.insert(symbol.clone(), health.status);
            match (old, health.status) {
                (Some(from), to) if from != to => match to {
                    SymbolStatus::Healthy => {
                        info!(%symbol, "symbol returned to healthy status")
                    }
                    SymbolStatus::Stale => {
                        warn!(%symbol, age_seconds = health.age_seconds, "symbol data is stale")
                    }
                    SymbolStatus::Unavailable => {
                        warn!(%symbol, age_seconds = health.age_seconds, "symbol data is unavailable")
                    }
                },
                _ => {}
            }
        }
        debug!(status = ?report.system_status, "health check completed");
    }

    fn classify(&self, symbol: &str, last_update: NaiveDateTime, now: NaiveDateTime) -> SymbolHealth {
        let age_seconds = (now - last_update).num_seconds();
        let status = if age_seconds >= self.thresholds.unavailable_after.as_secs() as i64 {
            SymbolStatus::Unavailable
        } else if age_seconds >= self.thresholds.stale_after.as_secs() as i64 {
            SymbolStatus::Stale
        } else {
            SymbolStatus::Healthy
        };
        SymbolHealth {
            symbol: symbol.to_string(),
            status,
            last_update,
            age_seconds,
        }
    }

    fn overall(symbols: &HashMap<Symbol, SymbolHealth>) -> SystemStatus {
        let any_unavailable = symbols
            .values()
            .any(|h| h.status == SymbolStatus::Unavailable);
        let any_stale = symbols.values().any(|h| h.status == SymbolStatus::Stale);
        if any_unavailable {
            SystemStatus::Critical
        } else if any_stale {
            SystemStatus::Degraded
        } else {
            SystemStatus::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use types::{InstrumentId, Price, Quantity, Quote};

    fn quote(symbol: &str, age: ChronoDuration) -> Quote {
        Quote {
            id: InstrumentId(1),
            symbol: symbol.to_string(),
            name: format!("{} Co.", symbol),
            last_price: Price::from_float(100.0),
            bid: None,
            ask: None,
            volume: Quantity(0),
            timestamp: now_local() - age,
        }
    }

    fn monitor(quotes: Vec<Quote>) -> HealthMonitor {
        HealthMonitor::new(
            Arc::new(Catalog::from_quotes(quotes)),
            HealthThresholds::default(),
        )
    }

    #[test]
    fn test_fresh_symbol_is_healthy() {
        let monitor = monitor(vec![quote("AAPL", ChronoDuration::seconds(1))]);
        let health = monitor.symbol_health("aapl").unwrap();
        assert_eq!(health.status, SymbolStatus::Healthy);
        assert_eq!(monitor.system_status(), SystemStatus::Normal);
    }

    #[test]
    fn test_aging_symbol_degrades() {
        let monitor = monitor(vec![quote("AAPL", ChronoDuration::seconds(45))]);
        assert_eq!(
            monitor.symbol_health("AAPL").unwrap().status,
            SymbolStatus::Stale
        );
        assert_eq!(monitor.system_status(), SystemStatus::Degraded);
    }

    #[test]
    fn test_dead_symbol_is_unavailable() {
        let monitor = monitor(vec![
            quote("AAPL", ChronoDuration::seconds(1)),
            quote("MSFT", ChronoDuration::seconds(120)),
        ]);
        assert_eq!(
            monitor.symbol_health("MSFT").unwrap().status,
            SymbolStatus::Unavailable
        );
        assert_eq!(monitor.system_status(), SystemStatus::Critical);
    }

    #[test]
    fn test_unknown_symbol_has_no_health() {
        let monitor = monitor(vec![quote("AAPL", ChronoDuration::seconds(1))]);
        assert!(monitor.symbol_health("ZZZZ").is_none());
    }

    #[test]
    fn test_check_is_quiet_without_transitions() {
        let monitor = monitor(vec![quote("AAPL", ChronoDuration::seconds(1))]);
        monitor.check();
        monitor.check();
        assert_eq!(
            monitor.previous.lock().get("AAPL"),
            Some(&SymbolStatus::Healthy)
        );
    }
}
