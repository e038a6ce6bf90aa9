//! Central configuration for the market data service.
//!
//! Every parameter has a sensible default and an environment override, so
//! a bare `cargo run` serves simulated data immediately.

use std::time::Duration;

/// Master configuration for the service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    // ─────────────────────────────────────────────────────────────────────────
    // Simulation
    // ─────────────────────────────────────────────────────────────────────────
    /// Per-tick standard deviation of the relative price change.
    pub volatility: f64,
    /// Broadcast tick period in milliseconds.
    pub tick_period_ms: u64,
    /// Seed catalog file path.
    pub data_file: String,

    // ─────────────────────────────────────────────────────────────────────────
    // Subscriptions
    // ─────────────────────────────────────────────────────────────────────────
    /// Liveness window in minutes; inactive subscriptions past this are swept.
    pub subscription_timeout_min: u64,
    /// Expiry sweep period in seconds.
    pub sweep_period_sec: u64,
    /// Maximum subscription actions per session per minute.
    pub rate_limit_per_min: u32,

    // ─────────────────────────────────────────────────────────────────────────
    // Health monitoring
    // ─────────────────────────────────────────────────────────────────────────
    /// Quote age in seconds before a symbol is reported stale.
    pub health_stale_sec: u64,
    /// Quote age in seconds before a symbol is reported unavailable.
    pub health_unavailable_sec: u64,
    /// Health check period in seconds.
    pub health_check_sec: u64,

    // ─────────────────────────────────────────────────────────────────────────
    // Server
    // ─────────────────────────────────────────────────────────────────────────
    /// Base64-encoded HMAC key for bearer-token validation. Unset means
    /// anonymous connections.
    pub jwt_secret: Option<String>,
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            volatility: 0.02,
            tick_period_ms: 5000,
            data_file: "data/market.json".to_string(),
            subscription_timeout_min: 5,
            sweep_period_sec: 60,
            rate_limit_per_min: 60,
            health_stale_sec: 30,
            health_unavailable_sec: 60,
            health_check_sec: 10,
            jwt_secret: None,
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            volatility: env_parse("MARKET_VOLATILITY", defaults.volatility),
            tick_period_ms: env_parse("MARKET_TICK_PERIOD_MS", defaults.tick_period_ms),
            data_file: env_string("MARKET_DATA_FILE", defaults.data_file),
            subscription_timeout_min: env_parse(
                "MARKET_SUBSCRIPTION_TIMEOUT_MIN",
                defaults.subscription_timeout_min,
            ),
            sweep_period_sec: env_parse("MARKET_SWEEP_PERIOD_SEC", defaults.sweep_period_sec),
            rate_limit_per_min: env_parse("MARKET_RATE_LIMIT_PER_MIN", defaults.rate_limit_per_min),
            health_stale_sec: env_parse("MARKET_HEALTH_STALE_SEC", defaults.health_stale_sec),
            health_unavailable_sec: env_parse(
                "MARKET_HEALTH_UNAVAILABLE_SEC",
                defaults.health_unavailable_sec,
            ),
            health_check_sec: env_parse("MARKET_HEALTH_CHECK_SEC", defaults.health_check_sec),
            jwt_secret: std::env::var("JWT_SECRET").ok().filter(|s| !s.trim().is_empty()),
            host: env_string("SERVER_HOST", defaults.host),
            port: env_parse("SERVER_PORT", defaults.port),
        }
    }

    /// Broadcast tick period.
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// Expiry sweep period.
    pub fn sweep_period(&self) -> Duration {
        Duration::from_secs(self.sweep_period_sec)
    }

    /// Health check period.
    pub fn health_check_period(&self) -> Duration {
        Duration::from_secs(self.health_check_sec)
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_string(key: &str, default: String) -> String {
    std::env::var(key).ok().filter(|s| !s.is_empty()).unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_service_contract() {
        let config = ServiceConfig::default();
        assert_eq!(config.volatility, 0.02);
        assert_eq!(config.tick_period_ms, 5000);
        assert_eq!(config.subscription_timeout_min, 5);
        assert_eq!(config.sweep_period_sec, 60);
        assert!(config.jwt_secret.is_none());
    }

    #[test]
    fn test_period_helpers() {
        let config = ServiceConfig::default();
        assert_eq!(config.tick_period(), Duration::from_millis(5000));
        assert_eq!(config.sweep_period(), Duration::from_secs(60));
    }

    #[test]
    fn test_bind_addr() {
        let config = ServiceConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }
}
