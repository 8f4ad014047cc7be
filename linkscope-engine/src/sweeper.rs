//! Periodic staleness and removal sweeps over the neighbor store

use linkscope_core::{DiscoveryConfig, Error, Result};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::store::NeighborStore;

/// How often the sweeper runs by default
pub const DEFAULT_SWEEP_PERIOD: Duration = Duration::from_secs(1);

/// Thresholds for one sweep; zero disables the respective action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepThresholds {
    pub staleness: Duration,
    pub removal: Duration,
}

impl From<&DiscoveryConfig> for SweepThresholds {
    fn from(config: &DiscoveryConfig) -> Self {
        Self {
            staleness: config.staleness_threshold(),
            removal: config.removal_threshold(),
        }
    }
}

/// Result of a single sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub marked_stale: usize,
    pub removed: usize,
}

struct Inner {
    store: Arc<NeighborStore>,
    thresholds: RwLock<SweepThresholds>,
}

impl Inner {
    fn sweep(&self) -> SweepReport {
        let thresholds = *self.thresholds.read();
        SweepReport {
            marked_stale: self.store.mark_stale(thresholds.staleness),
            removed: self.store.remove_stale(thresholds.removal),
        }
    }
}

/// Tokio task that keeps `is_stale` current and prunes silent neighbors
pub struct StalenessSweeper {
    inner: Arc<Inner>,
    period: Duration,
    shutdown: Arc<Notify>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StalenessSweeper {
    pub fn new(store: Arc<NeighborStore>, thresholds: SweepThresholds) -> Self {
        Self::with_period(store, thresholds, DEFAULT_SWEEP_PERIOD)
    }

    pub fn with_period(
        store: Arc<NeighborStore>,
        thresholds: SweepThresholds,
        period: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                thresholds: RwLock::new(thresholds),
            }),
            period: period.max(Duration::from_millis(1)),
            shutdown: Arc::new(Notify::new()),
            task: Mutex::new(None),
        }
    }

    /// Spawn the sweep loop on the current runtime; a no-op while running
    pub fn start(&self) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            Error::invalid_parameter("runtime".to_string(), e.to_string())
        })?;

        let mut task = self.task.lock();
        if task.is_some() {
            return Ok(());
        }

        let inner = Arc::clone(&self.inner);
        let shutdown = Arc::clone(&self.shutdown);
        let period = self.period;
        *task = Some(runtime.spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.notified() => break,
                    _ = ticker.tick() => {}
                }
                let report = inner.sweep();
                if report != SweepReport::default() {
                    debug!(stale = report.marked_stale, removed = report.removed, "Sweep");
                }
            }
        }));

        info!(period_ms = self.period.as_millis() as u64, "Staleness sweeper started");
        Ok(())
    }

    /// Stop the loop and wait for it; a no-op when not running
    pub async fn stop(&self) {
        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            self.shutdown.notify_one();
            if let Err(e) = handle.await {
                warn!(error = %e, "Staleness sweeper task ended abnormally");
            }
            info!("Staleness sweeper stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.lock().is_some()
    }

    /// Change thresholds; the next sweep uses them
    pub fn set_thresholds(&self, thresholds: SweepThresholds) {
        *self.inner.thresholds.write() = thresholds;
    }

    pub fn thresholds(&self) -> SweepThresholds {
        *self.inner.thresholds.read()
    }

    /// Run one sweep on the calling thread
    pub fn sweep_now(&self) -> SweepReport {
        self.inner.sweep()
    }
}
