//! Local wall-clock helpers.
//!
//! Quote and envelope timestamps are local date-times without a timezone
//! suffix (e.g. `2026-08-02T12:34:56.789`), so everything funnels through
//! `NaiveDateTime` rather than an offset-aware type.

use chrono::{Local, NaiveDateTime};

/// Current wall clock as a local naive date-time.
pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Format a timestamp as ISO-8601 local date-time with millisecond
/// precision and no timezone suffix.
pub fn iso_timestamp(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
}
