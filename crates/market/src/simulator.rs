//! Synthetic price process.
//!
//! Each tick, every instrument takes one gaussian step:
//!
//! 1. draw δ ~ N(0, 1), scaled by the configured volatility
//! 2. `last' = round2(last * (1 + δ))`, floored at $0.01
//! 3. `spread = round2(last' * 0.001)` (0.1% of price)
//! 4. `bid' / ask' = round2(last' ∓ spread / 2)`
//! 5. volume moves by `round(N(0,1) * 1000)`, clamped at zero
//! 6. timestamp refreshes to the current wall clock
//!
//! All rounding is half-up at two decimal places. Bid and ask are computed
//! in half-cents so the midpoint rounds exactly, without a float detour.
//! Zero volatility leaves prices unchanged but still refreshes timestamps.

use rand::Rng;
use rand_distr::StandardNormal;
use types::{now_local, Price, Quote};

/// Hard floor for simulated prices; the random walk must not collapse an
/// instrument to zero or below.
pub const MIN_PRICE: Price = Price(1);

/// Fraction of the last price used as the full bid/ask spread.
const SPREAD_BASIS: f64 = 0.001;

/// Scale of the per-tick volume perturbation.
const VOLUME_NOISE: f64 = 1000.0;

/// Pure stateful transformer: current quote in, next quote out.
///
/// The RNG is owned by the caller (the tick task), so the simulator itself
/// needs no synchronization.
#[derive(Debug, Clone, Copy)]
pub struct PriceSimulator {
    volatility: f64,
}

impl PriceSimulator {
    /// Create a simulator with the given per-tick volatility (standard
    /// deviation of the relative price change).
    pub fn new(volatility: f64) -> Self {
        Self { volatility }
    }

    /// Configured volatility.
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Advance one quote by one tick.
    pub fn next(&self, quote: &Quote, rng: &mut impl Rng) -> Quote {
        let delta: f64 = rng.sample::<f64, _>(StandardNormal) * self.volatility;

        let last = Price::from_float(quote.last_price.to_float() * (1.0 + delta)).max(MIN_PRICE);
        let spread = Price::from_float(last.to_float() * SPREAD_BASIS);

        // last ± spread/2 in half-cents; rounding the midpoint half-up.
        let bid = Price(half_cents_to_cents(last.raw() * 2 - spread.raw()));
        let ask = Price(half_cents_to_cents(last.raw() * 2 + spread.raw()));

        let volume_delta = (rng.sample::<f64, _>(StandardNormal) * VOLUME_NOISE).round() as i64;

        Quote {
            last_price: last,
            bid: Some(bid),
            ask: Some(ask),
            volume: quote.volume.saturating_add_signed(volume_delta),
            timestamp: now_local(),
            ..quote.clone()
        }
    }
}

/// Convert a half-cent amount to cents, rounding the half-cent up.
#[inline]
fn half_cents_to_cents(half_cents: i64) -> i64 {
    debug_assert!(half_cents >= 0, "prices are clamped positive");
    (half_cents + 1) / 2
}
