//! One session's interest set and its liveness metadata.

use chrono::{Duration, NaiveDateTime};
use std::collections::HashSet;
use types::{now_local, Symbol};

/// A live session's subscription record.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    /// Opaque session identifier, unique per live connection.
    pub session_id: String,
    /// Resolved user identity; may be the literal `anonymous`.
    pub user_id: String,
    /// Canonical symbols this session is subscribed to.
    pub symbols: HashSet<Symbol>,
    /// When the subscription was first created.
    pub created_at: NaiveDateTime,
    /// Last time the session showed any subscription activity.
    pub last_activity: NaiveDateTime,
    /// Cleared on deactivation; an inactive record is never valid.
    pub active: bool,
}

impl Subscription {
    /// Create a new active subscription stamped with the current clock.
    pub fn new(session_id: impl Into<String>, user_id: impl Into<String>, symbols: HashSet<Symbol>) -> Self {
        let now = now_local();
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            symbols,
            created_at: now,
            last_activity: now,
            active: true,
        }
    }

    /// Refresh the activity timestamp.
    pub fn touch(&mut self) {
        self.last_activity = now_local();
    }

    /// Whether this subscription is still valid right now.
    pub fn is_valid(&self, timeout: Duration) -> bool {
        self.is_valid_at(now_local(), timeout)
    }

    /// Validity at an explicit point in time.
    ///
    /// The boundary is strict: activity exactly `timeout` old is invalid.
    pub fn is_valid_at(&self, now: NaiveDateTime, timeout: Duration) -> bool {
        self.active && self.last_activity > now - timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription() -> Subscription {
        Subscription::new("session-1", "user-1", HashSet::from(["AAPL".to_string()]))
    }

    #[test]
    fn test_new_subscription_is_valid() {
        let sub = subscription();
        assert!(sub.active);
        assert!(sub.is_valid(Duration::minutes(5)));
        assert_eq!(sub.created_at, sub.last_activity);
    }

    #[test]
    fn test_liveness_boundary_is_strict() {
        let sub = subscription();
        let timeout = Duration::minutes(5);

        // 4:59 old: valid.
        let now = sub.last_activity + Duration::minutes(4) + Duration::seconds(59);
        assert!(sub.is_valid_at(now, timeout));

        // Exactly 5:00 old: invalid.
        let now = sub.last_activity + Duration::minutes(5);
        assert!(!sub.is_valid_at(now, timeout));

        // 6:00 old: invalid.
        let now = sub.last_activity + Duration::minutes(6);
        assert!(!sub.is_valid_at(now, timeout));
    }

    #[test]
    fn test_inactive_is_invalid_regardless_of_age() {
        let mut sub = subscription();
        sub.active = false;
        assert!(!sub.is_valid_at(sub.last_activity, Duration::minutes(5)));
    }

    #[test]
    fn test_touch_moves_activity_forward() {
        let mut sub = subscription();
        sub.last_activity -= Duration::minutes(10);
        let stale = sub.last_activity;

        sub.touch();
        assert!(sub.last_activity > stale);
    }
}
