//! Market data fan-out service.
//!
//! Wires the components together and runs them:
//!
//! ```text
//! ┌────────────┐  every tick   ┌────────────┐   publish   ┌────────────┐
//! │ TickEngine │ ────────────► │ Dispatcher │ ──────────► │ MessageHub │──► WS clients
//! └────────────┘               └────────────┘             └────────────┘
//!       │                            ▲                          ▲
//!       │ sweep              replies │                          │ frames
//!       ▼                            │                          │
//! ┌───────────────────┐       ┌────────────────┐         ┌─────────────┐
//! │ SubscriptionIndex │ ◄──── │ SessionGateway │ ◄────── │ axum /ws    │
//! └───────────────────┘       └────────────────┘         │ axum REST   │
//!                                                        └─────────────┘
//! ```
//!
//! Startup is fatal only when the seed catalog cannot be loaded; the
//! service is useless without instruments.

mod config;

use anyhow::{Context, Result};
use chrono::Duration as ChronoDuration;
use feed::{
    Dispatcher, HealthMonitor, HealthThresholds, SessionGateway, TickEngine, TickEngineConfig,
    Transport,
};
use market::{Catalog, PriceSimulator};
use server::{create_app, ActionRateLimiter, AppState, JwtAuthenticator, MessageHub};
use std::sync::Arc;
use std::time::{Duration, Instant};
use subscriptions::SubscriptionIndex;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use config::ServiceConfig;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = ServiceConfig::from_env();
    info!(
        tick_ms = config.tick_period_ms,
        volatility = config.volatility,
        sweep_sec = config.sweep_period_sec,
        "starting market data service"
    );

    // Seed catalog: fatal if missing or unreadable.
    let catalog = Arc::new(
        Catalog::load(&config.data_file)
            .with_context(|| format!("failed to load seed catalog from {}", config.data_file))?,
    );

    let index = Arc::new(SubscriptionIndex::new(ChronoDuration::minutes(
        config.subscription_timeout_min as i64,
    )));
    let hub = Arc::new(MessageHub::new());
    let transport: Arc<dyn Transport> = hub.clone();
    let dispatcher = Arc::new(Dispatcher::new(transport));
    let lifecycle = Arc::new(SessionGateway::new(
        catalog.clone(),
        index.clone(),
        dispatcher.clone(),
    ));
    let auth = Arc::new(
        JwtAuthenticator::from_base64_secret(config.jwt_secret.as_deref())
            .context("invalid JWT secret (must be base64)")?,
    );
    let health = Arc::new(HealthMonitor::new(
        catalog.clone(),
        HealthThresholds {
            stale_after: Duration::from_secs(config.health_stale_sec),
            unavailable_after: Duration::from_secs(config.health_unavailable_sec),
        },
    ));

    // Periodic freshness checks (transition logging only).
    spawn_health_checks(health.clone(), config.health_check_period());

    // The tick engine: broadcast tick + expiry sweep.
    let engine = TickEngine::new(
        catalog.clone(),
        index.clone(),
        dispatcher.clone(),
        PriceSimulator::new(config.volatility),
        TickEngineConfig {
            tick_period: config.tick_period(),
            sweep_period: config.sweep_period(),
        },
    )
    .spawn();

    let state = AppState {
        catalog,
        index,
        dispatcher,
        lifecycle,
        hub,
        auth,
        health,
        rate_limiter: Arc::new(ActionRateLimiter::new(config.rate_limit_per_min)),
        started_at: Instant::now(),
    };

    let app = create_app(state);
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "market data service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // Let an in-flight tick finish before tearing the scheduler down.
    engine.shutdown().await;
    info!("market data service stopped");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "market_service=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn spawn_health_checks(health: Arc<HealthMonitor>, period: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await; // immediate first tick
        loop {
            ticker.tick().await;
            health.check();
        }
    });
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
