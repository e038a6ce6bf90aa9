//! Session/symbol subscription bookkeeping.
//!
//! The [`SubscriptionIndex`] is a bidirectional mapping between client
//! sessions and the symbols they subscribe to, mutated concurrently by
//! inbound messages, the tick schedule, and disconnect events. Both
//! directions live behind one lock so every operation leaves the pair of
//! tables mutually consistent.
//!
//! Subscriptions expire after a liveness window (5 minutes by default)
//! with a strict boundary: a subscription whose last activity is exactly
//! one window old is already invalid.

pub mod index;
pub mod subscription;

pub use index::SubscriptionIndex;
pub use subscription::Subscription;
