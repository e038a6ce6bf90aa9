//! The bidirectional subscription index.
//!
//! Two tables, always mutated together under one lock:
//!
//! - `by_session`: session id → [`Subscription`]
//! - `by_symbol`: symbol → set of session ids (the reverse map the
//!   fan-out dispatcher queries per tick)
//!
//! Unknown sessions are a silent no-op everywhere — disconnects, sweeps,
//! and client messages race, so idempotency beats errors here. Symbol
//! arguments are canonicalized at the boundary before touching either
//! table.

use crate::subscription::Subscription;
use chrono::{Duration, NaiveDateTime};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};
use types::{canonical_symbol, now_local, Symbol};

#[derive(Default)]
struct Tables {
    by_session: HashMap<String, Subscription>,
    by_symbol: HashMap<Symbol, HashSet<String>>,
}

impl Tables {
    fn add_to_reverse(&mut self, symbols: &HashSet<Symbol>, session_id: &str) {
        for symbol in symbols {
            self.by_symbol
                .entry(symbol.clone())
                .or_default()
                .insert(session_id.to_string());
        }
    }

    fn remove_from_reverse<'a>(
        &mut self,
        symbols: impl IntoIterator<Item = &'a Symbol>,
        session_id: &str,
    ) {
        for symbol in symbols {
            let now_empty = match self.by_symbol.get_mut(symbol) {
                Some(sessions) => {
                    sessions.remove(session_id);
                    sessions.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.by_symbol.remove(symbol);
            }
        }
    }
}

/// Concurrent session ↔ symbol index with liveness-based expiry.
pub struct SubscriptionIndex {
    tables: RwLock<Tables>,
    timeout: Duration,
}

impl SubscriptionIndex {
    /// Create an index with the given liveness window.
    pub fn new(timeout: Duration) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            timeout,
        }
    }

    /// Create or wholesale-replace a session's subscription.
    ///
    /// An existing subscription has its symbol set replaced: the session
    /// leaves the reverse entries of symbols no longer present and joins
    /// the new ones. Activity is always refreshed. An empty symbol set is
    /// a no-op — callers are expected to have validated non-emptiness.
    pub fn subscribe(&self, session_id: &str, user_id: &str, symbols: &[Symbol]) {
        let requested: HashSet<Symbol> =
            symbols.iter().map(|s| canonical_symbol(s)).collect();
        if requested.is_empty() {
            return;
        }

        let mut tables = self.tables.write();
        let previous = tables.by_session.get(session_id).map(|s| s.symbols.clone());
        match previous {
            Some(old_symbols) => {
                tables.remove_from_reverse(&old_symbols, session_id);
                if let Some(sub) = tables.by_session.get_mut(session_id) {
                    sub.symbols = requested.clone();
                    // A deactivated record rejoining is a fresh subscription.
                    sub.active = true;
                    sub.touch();
                }
                info!(session = session_id, symbols = ?requested, "replaced subscription");
            }
            None => {
                tables.by_session.insert(
                    session_id.to_string(),
                    Subscription::new(session_id, user_id, requested.clone()),
                );
                info!(session = session_id, symbols = ?requested, "created subscription");
            }
        }
        tables.add_to_reverse(&requested, session_id);
    }

    /// Union symbols into an existing, active subscription.
    pub fn add_symbols(&self, session_id: &str, symbols: &[Symbol]) {
        let added: HashSet<Symbol> = symbols.iter().map(|s| canonical_symbol(s)).collect();
        let mut tables = self.tables.write();
        let Some(sub) = tables.by_session.get_mut(session_id) else {
            return;
        };
        if !sub.active {
            return;
        }
        sub.symbols.extend(added.iter().cloned());
        sub.touch();
        tables.add_to_reverse(&added, session_id);
        debug!(session = session_id, symbols = ?added, "added symbols to subscription");
    }

    /// Remove symbols from an existing, active subscription.
    pub fn remove_symbols(&self, session_id: &str, symbols: &[Symbol]) {
        let removed: HashSet<Symbol> = symbols.iter().map(|s| canonical_symbol(s)).collect();
        let mut tables = self.tables.write();
        let Some(sub) = tables.by_session.get_mut(session_id) else {
            return;
        };
        if !sub.active {
            return;
        }
        for symbol in &removed {
            sub.symbols.remove(symbol);
        }
        sub.touch();
        tables.remove_from_reverse(&removed, session_id);
        debug!(session = session_id, symbols = ?removed, "removed symbols from subscription");
    }

    /// Drop a session's subscription entirely. Idempotent.
    pub fn remove(&self, session_id: &str) {
        let mut tables = self.tables.write();
        if let Some(sub) = tables.by_session.remove(session_id) {
            tables.remove_from_reverse(&sub.symbols, session_id);
            info!(session = session_id, "removed subscription");
        }
    }

    /// Mark a subscription inactive and detach it from the reverse map,
    /// but keep the record itself.
    pub fn deactivate(&self, session_id: &str) {
        let mut tables = self.tables.write();
        let Some(sub) = tables.by_session.get_mut(session_id) else {
            return;
        };
        sub.active = false;
        let symbols = sub.symbols.clone();
        tables.remove_from_reverse(&symbols, session_id);
        info!(session = session_id, "deactivated subscription");
    }

    /// Immutable snapshot of a symbol's subscriber set.
    pub fn subscribers_of(&self, symbol: &str) -> HashSet<String> {
        self.tables
            .read()
            .by_symbol
            .get(&canonical_symbol(symbol))
            .cloned()
            .unwrap_or_default()
    }

    /// Copy of a session's subscription record.
    pub fn get(&self, session_id: &str) -> Option<Subscription> {
        self.tables.read().by_session.get(session_id).cloned()
    }

    /// Refresh a session's activity timestamp if it exists.
    pub fn touch(&self, session_id: &str) {
        if let Some(sub) = self.tables.write().by_session.get_mut(session_id) {
            sub.touch();
        }
    }

    /// Number of currently valid subscriptions.
    pub fn active_count(&self) -> usize {
        let now = now_local();
        self.tables
            .read()
            .by_session
            .values()
            .filter(|sub| sub.is_valid_at(now, self.timeout))
            .count()
    }

    /// Total subscription records, valid or not.
    pub fn session_count(&self) -> usize {
        self.tables.read().by_session.len()
    }

    /// Remove every subscription that is no longer valid.
    pub fn sweep_expired(&self) {
        self.sweep_expired_at(now_local());
    }

    /// Expiry sweep against an explicit clock.
    pub fn sweep_expired_at(&self, now: NaiveDateTime) {
        let mut tables = self.tables.write();
        let expired: Vec<String> = tables
            .by_session
            .values()
            .filter(|sub| !sub.is_valid_at(now, self.timeout))
            .map(|sub| sub.session_id.clone())
            .collect();

        for session_id in expired {
            if let Some(sub) = tables.by_session.remove(&session_id) {
                tables.remove_from_reverse(&sub.symbols, &session_id);
                info!(session = %session_id, "swept expired subscription");
            }
        }
    }
}
