//! Identifier and numeric newtypes for the market data service.
//!
//! Prices use fixed-point arithmetic with 2 decimal places (cent
//! resolution) to avoid floating-point drift in quote updates. Conversion
//! from `f64` rounds half-up at the second decimal.

use derive_more::{Add, AddAssign, From, Into, Neg, Sub, SubAssign};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// =============================================================================
// Constants
// =============================================================================

/// Price scale factor: 100 means 2 decimal places.
/// - `100` = $1.00
/// - `1` = $0.01 (smallest price increment)
pub const PRICE_SCALE: i64 = 100;

// =============================================================================
// Symbol Type
// =============================================================================

/// Instrument ticker symbol (e.g., "AAPL", "GOOGL").
///
/// Symbols are canonically upper-case; use [`canonical_symbol`] at every
/// boundary that accepts caller-supplied symbols.
pub type Symbol = String;

/// Canonicalize a caller-supplied symbol: trim whitespace and upper-case.
pub fn canonical_symbol(raw: &str) -> Symbol {
    raw.trim().to_ascii_uppercase()
}

// =============================================================================
// Instrument Id
// =============================================================================

/// Stable numeric identifier for an instrument.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default, From,
    Into,
)]
pub struct InstrumentId(pub u64);

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instrument#{}", self.0)
    }
}

// =============================================================================
// Fixed-Point Price Type
// =============================================================================

/// Fixed-point price with 2 decimal places.
///
/// # Examples
/// - `Price(100)` = $1.00
/// - `Price(15005)` = $150.05
/// - `Price(1)` = $0.01
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Add,
    Sub,
    Neg,
    AddAssign,
    SubAssign,
    From,
    Into,
)]
pub struct Price(pub i64);

impl Price {
    pub const ZERO: Price = Price(0);

    /// Create a Price from a floating-point dollar value, rounding half-up
    /// at the second decimal place.
    ///
    /// Decimal half-cents land just below `.5` after the binary multiply
    /// (`1.005 * 100.0` is `100.4999…`); the nudge away from zero keeps
    /// them rounding up.
    #[inline]
    pub fn from_float(v: f64) -> Self {
        let scaled = v * PRICE_SCALE as f64;
        Self((scaled * (1.0 + 1e-12)).round() as i64)
    }

    /// Convert to floating-point dollars for display/calculations.
    #[inline]
    pub fn to_float(self) -> f64 {
        self.0 as f64 / PRICE_SCALE as f64
    }

    /// Raw internal value in cents.
    #[inline]
    pub fn raw(self) -> i64 {
        self.0
    }

    /// Check if price is positive.
    #[inline]
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Absolute value.
    #[inline]
    pub fn abs(self) -> Self {
        Price(self.0.abs())
    }

    /// Larger of two prices.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        Price(self.0.max(other.0))
    }
}

impl fmt::Debug for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Price(${:.2})", self.to_float())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.to_float())
    }
}

// Prices cross the wire as plain JSON numbers in dollars, not raw cents.
impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_float())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let v = f64::deserialize(deserializer)?;
        Ok(Price::from_float(v))
    }
}

// =============================================================================
// Quantity Type
// =============================================================================

/// Traded volume in shares (newtype for type safety).
#[derive(
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Default,
    Add,
    Sub,
    AddAssign,
    SubAssign,
    From,
    Into,
)]
pub struct Quantity(pub u64);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);

    /// Get raw value.
    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }

    /// Check if zero.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Apply a signed delta, clamping the result at zero.
    #[inline]
    pub fn saturating_add_signed(self, delta: i64) -> Self {
        Quantity((self.0 as i64 + delta).max(0) as u64)
    }
}

impl fmt::Debug for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Qty({})", self.0)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Allow `volume == 1000` comparisons
impl PartialEq<u64> for Quantity {
    fn eq(&self, other: &u64) -> bool {
        self.0 == *other
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_symbol() {
        assert_eq!(canonical_symbol("aapl"), "AAPL");
        assert_eq!(canonical_symbol("  msft "), "MSFT");
        assert_eq!(canonical_symbol("GOOGL"), "GOOGL");
    }

    #[test]
    fn test_price_from_float_rounds_half_up() {
        assert_eq!(Price::from_float(1.0), Price(100));
        assert_eq!(Price::from_float(150.05), Price(15005));
        assert_eq!(Price::from_float(1.005), Price(101));
        assert_eq!(Price::from_float(1.004), Price(100));
        // Another half-cent that sits below .5 in binary.
        assert_eq!(Price::from_float(2.675), Price(268));
    }

    #[test]
    fn test_price_round_trip() {
        for cents in [0_i64, 1, 99, 100, 15005, 9_999_999] {
            let p = Price(cents);
            assert_eq!(Price::from_float(p.to_float()), p);
        }
    }

    #[test]
    fn test_price_arithmetic() {
        let a = Price::from_float(150.05);
        let b = Price::from_float(149.95);
        assert_eq!((a - b).raw(), 10);
        assert_eq!((a + b).to_float(), 300.0);
    }

    #[test]
    fn test_price_serializes_as_dollars() {
        let json = serde_json::to_string(&Price(15005)).unwrap();
        assert_eq!(json, "150.05");

        let back: Price = serde_json::from_str("150.05").unwrap();
        assert_eq!(back, Price(15005));
    }

    #[test]
    fn test_quantity_saturating_delta() {
        assert_eq!(Quantity(1000).saturating_add_signed(-250), 750);
        assert_eq!(Quantity(100).saturating_add_signed(-500), 0);
        assert_eq!(Quantity(0).saturating_add_signed(42), 42);
    }

    #[test]
    fn test_instrument_id_display() {
        assert_eq!(InstrumentId(7).to_string(), "Instrument#7");
    }
}
