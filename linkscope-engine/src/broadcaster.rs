//! Periodic CDP/LLDP advertisement

use linkscope_core::{
    DiscoveryConfig, Error, FrameSender, InterfaceDescriptor, ProtocolKind, Result,
};
use linkscope_protocols::protocol_for;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Frames sent and send failures per protocol
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastStats {
    pub cdp_sent: u64,
    pub cdp_failed: u64,
    pub lldp_sent: u64,
    pub lldp_failed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    cdp_sent: AtomicU64,
    cdp_failed: AtomicU64,
    lldp_sent: AtomicU64,
    lldp_failed: AtomicU64,
}

impl Counters {
    fn record(&self, kind: ProtocolKind, ok: bool) {
        let counter = match (kind, ok) {
            (ProtocolKind::Cdp, true) => &self.cdp_sent,
            (ProtocolKind::Cdp, false) => &self.cdp_failed,
            (ProtocolKind::Lldp, true) => &self.lldp_sent,
            (ProtocolKind::Lldp, false) => &self.lldp_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> BroadcastStats {
        BroadcastStats {
            cdp_sent: self.cdp_sent.load(Ordering::Relaxed),
            cdp_failed: self.cdp_failed.load(Ordering::Relaxed),
            lldp_sent: self.lldp_sent.load(Ordering::Relaxed),
            lldp_failed: self.lldp_failed.load(Ordering::Relaxed),
        }
    }
}

struct Shared {
    config: RwLock<DiscoveryConfig>,
    interface: InterfaceDescriptor,
    sender: Arc<dyn FrameSender>,
    counters: Counters,
}

impl Shared {
    /// Build and send one frame per enabled protocol; returns how many went out
    fn send_all(&self) -> usize {
        let (adv, protocols) = {
            let config = self.config.read();
            let mut protocols = Vec::with_capacity(2);
            if config.cdp_broadcast {
                protocols.push(ProtocolKind::Cdp);
            }
            if config.lldp_broadcast {
                protocols.push(ProtocolKind::Lldp);
            }
            (config.advertisement(), protocols)
        };

        let mut sent = 0;
        for kind in protocols {
            let result = protocol_for(kind)
                .build_frame(&adv, &self.interface)
                .and_then(|frame| self.sender.send_frame(&frame));

            match result {
                Ok(()) => {
                    debug!(interface = %self.interface.name, protocol = %kind, "Advertisement sent");
                    self.counters.record(kind, true);
                    sent += 1;
                }
                Err(e) => {
                    warn!(interface = %self.interface.name, protocol = %kind, error = %e, "Advertisement failed");
                    self.counters.record(kind, false);
                }
            }
        }
        sent
    }

    fn interval(&self) -> Duration {
        self.config.read().advertise_interval()
    }
}

/// A live tick loop and the signal that ends it
struct Run {
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

/// Restartable periodic transmitter of this host's discovery frames
///
/// Stopped until [`start`](Self::start), which sends immediately and then once
/// per configured interval. Each tick re-reads the configuration, so
/// [`update_config`](Self::update_config) takes effect on the next tick.
pub struct Broadcaster {
    shared: Arc<Shared>,
    /// `Some` exactly while a loop is running; start and stop both hold it
    run: Mutex<Option<Run>>,
}

impl Broadcaster {
    pub fn new(
        config: DiscoveryConfig,
        interface: InterfaceDescriptor,
        sender: Arc<dyn FrameSender>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                config: RwLock::new(config),
                interface,
                sender,
                counters: Counters::default(),
            }),
            run: Mutex::new(None),
        }
    }

    /// Start ticking on the current tokio runtime; a no-op while running
    pub fn start(&self) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            Error::invalid_parameter("runtime".to_string(), e.to_string())
        })?;

        let mut run = self.run.lock();
        if run.is_some() {
            return Ok(());
        }

        let shutdown = Arc::new(Notify::new());
        let shared = Arc::clone(&self.shared);
        info!(
            interface = %shared.interface.name,
            interval_secs = shared.interval().as_secs(),
            "Broadcaster started"
        );

        let task = runtime.spawn(tick_loop(shared, Arc::clone(&shutdown)));
        *run = Some(Run { shutdown, task });
        Ok(())
    }

    /// Signal the tick loop to exit; a no-op when stopped
    ///
    /// The loop winds down on its own; use [`stop_and_wait`](Self::stop_and_wait)
    /// to wait for it.
    pub fn stop(&self) {
        let _ = self.halt();
    }

    /// [`stop`](Self::stop) and wait for the tick loop to finish
    pub async fn stop_and_wait(&self) {
        if let Some(task) = self.halt() {
            if let Err(e) = task.await {
                warn!(error = %e, "Broadcaster task ended abnormally");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.run.lock().is_some()
    }

    /// Take the running loop out under the lock and signal it
    fn halt(&self) -> Option<JoinHandle<()>> {
        let Run { shutdown, task } = self.run.lock().take()?;
        // notify_one stores a permit, so a loop busy sending still sees it.
        shutdown.notify_one();
        info!(interface = %self.shared.interface.name, "Broadcaster stopped");
        Some(task)
    }

    /// Replace the configuration used from the next tick on
    ///
    /// An empty system name keeps the one already advertised.
    pub fn update_config(&self, mut config: DiscoveryConfig) {
        let mut current = self.shared.config.write();
        if config.system_name.is_empty() {
            config.system_name = std::mem::take(&mut current.system_name);
        }
        if config.advertise_interval() != current.advertise_interval() {
            info!(
                interval_secs = config.advertise_interval().as_secs(),
                "Advertise interval changed"
            );
        }
        *current = config;
    }

    pub fn config(&self) -> DiscoveryConfig {
        self.shared.config.read().clone()
    }

    /// Send the enabled advertisements now, outside the schedule
    pub fn send_now(&self) -> usize {
        self.shared.send_all()
    }

    pub fn stats(&self) -> BroadcastStats {
        self.shared.counters.snapshot()
    }
}

async fn tick_loop(shared: Arc<Shared>, shutdown: Arc<Notify>) {
    let mut period = shared.interval();
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.notified() => break,
            _ = ticker.tick() => {}
        }

        let current = shared.interval();
        if current != period {
            period = current;
            ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }

        shared.send_all();
    }

    debug!(interface = %shared.interface.name, "Broadcaster loop exited");
}
