//! The tick engine: one logical clock, two periodic tasks.
//!
//! - **Broadcast tick** (default 5 s): advance every instrument through
//!   the price simulator, freeze one timestamp, snapshot, dispatch.
//! - **Expiry sweep** (default 60 s): drop subscriptions past their
//!   liveness window.
//!
//! Each task is serial with itself — the loop body runs to completion
//! before the next firing is observed, so ticks never overlap. The two
//! tasks run independently of each other; they touch different state.
//! The initial delay of each task equals its period.
//!
//! Shutdown is observed only between runs, so an in-flight tick always
//! completes before [`EngineHandle::shutdown`] returns.

use crate::dispatcher::Dispatcher;
use crate::snapshot::TickSnapshot;
use market::{Catalog, PriceSimulator};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use subscriptions::SubscriptionIndex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, error, info};
use types::{iso_timestamp, now_local};

/// Periods for the two scheduled tasks.
#[derive(Debug, Clone, Copy)]
pub struct TickEngineConfig {
    /// Broadcast tick period.
    pub tick_period: Duration,
    /// Expiry sweep period.
    pub sweep_period: Duration,
}

impl Default for TickEngineConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(5),
            sweep_period: Duration::from_secs(60),
        }
    }
}

/// Drives price advancement, snapshotting, and the expiry sweep.
pub struct TickEngine {
    catalog: Arc<Catalog>,
    index: Arc<SubscriptionIndex>,
    dispatcher: Arc<Dispatcher>,
    simulator: PriceSimulator,
    config: TickEngineConfig,
}

impl TickEngine {
    pub fn new(
        catalog: Arc<Catalog>,
        index: Arc<SubscriptionIndex>,
        dispatcher: Arc<Dispatcher>,
        simulator: PriceSimulator,
        config: TickEngineConfig,
    ) -> Self {
        Self {
            catalog,
            index,
            dispatcher,
            simulator,
            config,
        }
    }

    /// Run one broadcast tick to completion.
    ///
    /// Steps: copy the catalog, skip if empty, advance every entry under
    /// the catalog's mutation discipline, freeze one timestamp, snapshot,
    /// dispatch.
    pub fn tick_once(&self, rng: &mut StdRng) {
        let current = self.catalog.snapshot();
        if current.is_empty() {
            debug!("catalog empty; skipping tick");
            return;
        }

        for symbol in current.keys() {
            self.catalog
                .mutate(symbol, |quote| *quote = self.simulator.next(quote, rng));
        }

        let timestamp = iso_timestamp(now_local());
        let snapshot = TickSnapshot::new(self.catalog.snapshot(), timestamp);
        self.dispatcher.broadcast(&snapshot, &self.index);
    }

    /// Run one expiry sweep to completion.
    pub fn sweep_once(&self) {
        self.index.sweep_expired();
    }

    /// Spawn both periodic tasks and return their handle.
    pub fn spawn(self) -> EngineHandle {
        let engine = Arc::new(self);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let broadcast = tokio::spawn(Self::broadcast_loop(engine.clone(), shutdown_rx.clone()));
        let sweep = tokio::spawn(Self::sweep_loop(engine, shutdown_rx));

        EngineHandle {
            shutdown: shutdown_tx,
            tasks: vec![broadcast, sweep],
        }
    }

    async fn broadcast_loop(engine: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let period = engine.config.tick_period;
        let mut ticker = interval_at(Instant::now() + period, period);
        let mut rng = StdRng::from_entropy();
        info!(period_ms = period.as_millis() as u64, "broadcast tick schedule started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }
            // A panicking tick must not kill the schedule.
            if catch_unwind(AssertUnwindSafe(|| engine.tick_once(&mut rng))).is_err() {
                error!("broadcast tick panicked; schedule continues");
            }
        }
        info!("broadcast tick schedule stopped");
    }

    async fn sweep_loop(engine: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let period = engine.config.sweep_period;
        let mut ticker = interval_at(Instant::now() + period, period);
        info!(period_sec = period.as_secs(), "expiry sweep schedule started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }
            if catch_unwind(AssertUnwindSafe(|| engine.sweep_once())).is_err() {
                error!("expiry sweep panicked; schedule continues");
            }
        }
        info!("expiry sweep schedule stopped");
    }
}

/// Handle for stopping the scheduled tasks.
pub struct EngineHandle {
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl EngineHandle {
    /// Signal both tasks to stop and wait for them.
    ///
    /// An in-flight tick or sweep completes before this returns.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for task in self.tasks {
            let _ = task.await;
        }
    }
}
