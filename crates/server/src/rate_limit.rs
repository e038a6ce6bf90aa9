//! Per-session rate limiting for application sends.
//!
//! Fixed one-minute windows: the first request past the limit inside a
//! window is refused, and the window resets once it is a minute old.
//! State for a session is dropped on disconnect.

use chrono::{Duration, NaiveDateTime};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::warn;
use types::now_local;

struct Window {
    started: NaiveDateTime,
    count: u32,
}

/// Fixed-window request limiter keyed by session id.
pub struct ActionRateLimiter {
    max_per_minute: u32,
    windows: Mutex<HashMap<String, Window>>,
}

impl ActionRateLimiter {
    pub fn new(max_per_minute: u32) -> Self {
        Self {
            max_per_minute,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record one request. Returns false when the session is over its
    /// budget for the current window.
    pub fn check(&self, session_id: &str) -> bool {
        self.check_at(session_id, now_local())
    }

    /// Window accounting against an explicit clock.
    pub fn check_at(&self, session_id: &str, now: NaiveDateTime) -> bool {
        let mut windows = self.windows.lock();
        let window = windows.entry(session_id.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now - window.started >= Duration::minutes(1) {
            window.started = now;
            window.count = 0;
        }

        if window.count >= self.max_per_minute {
            warn!(
                session = session_id,
                limit = self.max_per_minute,
                "rate limit exceeded"
            );
            return false;
        }
        window.count += 1;
        true
    }

    /// Drop a session's window (on disconnect).
    pub fn forget(&self, session_id: &str) {
        self.windows.lock().remove(session_id);
    }
}
