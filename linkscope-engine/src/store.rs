//! Neighbor table keyed by interface and source address

use linkscope_core::NeighborRecord;
use parking_lot::RwLock;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::debug;

use crate::observer::NeighborObserver;

/// What [`NeighborStore::update`] did with a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    New,
    Updated,
}

/// Thread-safe neighbor table
///
/// Writers are the capture pipeline and the staleness sweeper; readers take
/// snapshot copies.
#[derive(Default)]
pub struct NeighborStore {
    neighbors: RwLock<HashMap<String, NeighborRecord>>,
    observer: Option<Arc<dyn NeighborObserver>>,
}

impl NeighborStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that reports every insert and merge to `observer`
    pub fn with_observer(observer: Arc<dyn NeighborObserver>) -> Self {
        Self {
            neighbors: RwLock::new(HashMap::new()),
            observer: Some(observer),
        }
    }

    /// Insert a new neighbor or merge into the one with the same key
    pub fn update(&self, record: NeighborRecord) -> UpdateOutcome {
        let key = record.key();

        let (outcome, current) = {
            let mut neighbors = self.neighbors.write();
            match neighbors.entry(key) {
                Entry::Occupied(mut entry) => {
                    let existing = entry.get_mut();
                    existing.merge_from(&record);
                    (UpdateOutcome::Updated, existing.clone())
                }
                Entry::Vacant(entry) => {
                    let mut record = record;
                    record.first_seen = record.last_seen;
                    record.is_new = true;
                    record.is_stale = false;
                    (UpdateOutcome::New, entry.insert(record).clone())
                }
            }
        };

        if let Some(observer) = &self.observer {
            match outcome {
                UpdateOutcome::New => observer.on_new(&current),
                UpdateOutcome::Updated => observer.on_updated(&current),
            }
        }

        outcome
    }

    /// Flag neighbors silent for longer than `threshold`; returns how many became stale
    pub fn mark_stale(&self, threshold: Duration) -> usize {
        self.mark_stale_at(threshold, SystemTime::now())
    }

    /// [`mark_stale`](Self::mark_stale) against an explicit clock reading
    ///
    /// `is_stale` is recomputed from each entry's current `last_seen`. A zero
    /// threshold disables staleness and clears every flag.
    pub fn mark_stale_at(&self, threshold: Duration, now: SystemTime) -> usize {
        let mut neighbors = self.neighbors.write();
        let mut newly_stale = 0;

        for record in neighbors.values_mut() {
            let stale = !threshold.is_zero() && silent_for(record, now) > threshold;
            if stale && !record.is_stale {
                newly_stale += 1;
            }
            record.is_stale = stale;
        }

        if newly_stale > 0 {
            debug!(count = newly_stale, "Neighbors marked stale");
        }
        newly_stale
    }

    /// Delete neighbors silent for longer than `threshold`; zero never removes
    pub fn remove_stale(&self, threshold: Duration) -> usize {
        self.remove_stale_at(threshold, SystemTime::now())
    }

    pub fn remove_stale_at(&self, threshold: Duration, now: SystemTime) -> usize {
        if threshold.is_zero() {
            return 0;
        }

        let mut neighbors = self.neighbors.write();
        let before = neighbors.len();
        neighbors.retain(|_, record| silent_for(record, now) <= threshold);
        let removed = before - neighbors.len();

        if removed > 0 {
            debug!(count = removed, "Stale neighbors removed");
        }
        removed
    }

    /// Clear `is_new` once a consumer has shown the new entries
    pub fn clear_new_flags(&self) {
        for record in self.neighbors.write().values_mut() {
            record.is_new = false;
        }
    }

    /// Snapshot of every neighbor, ordered by key
    pub fn get_all(&self) -> Vec<NeighborRecord> {
        let neighbors = self.neighbors.read();
        let mut keys: Vec<&String> = neighbors.keys().collect();
        keys.sort();
        keys.into_iter()
            .filter_map(|key| neighbors.get(key).cloned())
            .collect()
    }

    pub fn get_by_interface(&self, interface: &str) -> Vec<NeighborRecord> {
        self.get_all()
            .into_iter()
            .filter(|record| record.interface == interface)
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<NeighborRecord> {
        self.neighbors.read().get(&key.to_lowercase()).cloned()
    }

    pub fn count(&self) -> usize {
        self.neighbors.read().len()
    }

    pub fn clear(&self) {
        self.neighbors.write().clear();
    }
}

/// Time since `last_seen`; a timestamp in the future counts as zero
fn silent_for(record: &NeighborRecord, now: SystemTime) -> Duration {
    now.duration_since(record.last_seen).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkscope_core::{Capability, MacAddr, ProtocolKind, ProtocolPresence};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{OnceLock, Weak};
    use std::thread;

    const MAC: MacAddr = MacAddr::new([0x00, 0x1B, 0x54, 0xAA, 0xBB, 0xCC]);

    fn base_time() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    fn record(kind: ProtocolKind, seen: SystemTime) -> NeighborRecord {
        let mut rec = NeighborRecord::new(kind, seen);
        rec.interface = "eth0".to_string();
        rec.source_mac = Some(MAC);
        rec
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<(&'static str, String)>>,
    }

    impl NeighborObserver for Recorder {
        fn on_new(&self, record: &NeighborRecord) {
            self.events.lock().push(("new", record.display_name().to_string()));
        }

        fn on_updated(&self, record: &NeighborRecord) {
            self.events.lock().push(("updated", record.display_name().to_string()));
        }
    }

    #[test]
    fn test_first_update_is_new() {
        let store = NeighborStore::new();
        let mut rec = record(ProtocolKind::Cdp, base_time());
        rec.first_seen = SystemTime::UNIX_EPOCH;
        rec.is_stale = true;

        assert_eq!(store.update(rec.clone()), UpdateOutcome::New);

        let stored = store.get(&rec.key()).unwrap();
        assert!(stored.is_new);
        assert!(!stored.is_stale);
        assert_eq!(stored.first_seen, stored.last_seen);
        assert_eq!(stored.protocol(), ProtocolPresence::Cdp);
    }

    #[test]
    fn test_partial_records_merge_across_protocols() {
        let store = NeighborStore::new();

        let mut from_cdp = record(ProtocolKind::Cdp, base_time());
        from_cdp.hostname = "dist-sw".to_string();
        from_cdp.capabilities.insert(Capability::Switch);

        let mut from_lldp = record(ProtocolKind::Lldp, base_time() + Duration::from_secs(3));
        from_lldp.port_id = "Gi1/0/24".to_string();
        from_lldp.capabilities.insert(Capability::Bridge);

        assert_eq!(store.update(from_cdp), UpdateOutcome::New);
        assert_eq!(store.update(from_lldp), UpdateOutcome::Updated);
        assert_eq!(store.count(), 1);

        let merged = &store.get_all()[0];
        assert_eq!(merged.hostname, "dist-sw");
        assert_eq!(merged.port_id, "Gi1/0/24");
        assert_eq!(merged.protocol(), ProtocolPresence::Both);
        assert_eq!(merged.capabilities_string(), "bridge,switch");
        assert_eq!(merged.first_seen, base_time());
        assert_eq!(merged.last_seen, base_time() + Duration::from_secs(3));
    }

    #[test]
    fn test_observer_gets_one_event_per_update() {
        let recorder = Arc::new(Recorder::default());
        let store = NeighborStore::with_observer(recorder.clone());

        let mut rec = record(ProtocolKind::Lldp, base_time());
        rec.id = "00:1b:54:aa:bb:cc".to_string();
        store.update(rec.clone());
        rec.hostname = "edge-1".to_string();
        store.update(rec);

        let events = recorder.events.lock().clone();
        assert_eq!(
            events,
            vec![
                ("new", "00:1b:54:aa:bb:cc".to_string()),
                ("updated", "edge-1".to_string()),
            ]
        );
    }

    #[test]
    fn test_staleness_boundary() {
        let store = NeighborStore::new();
        let threshold = Duration::from_secs(60);
        let now = base_time();
        let ms = Duration::from_millis(1);

        let mut old = record(ProtocolKind::Cdp, now - threshold - ms);
        old.source_mac = Some(MacAddr::new([2, 0, 0, 0, 0, 1]));
        let mut fresh = record(ProtocolKind::Cdp, now - threshold + ms);
        fresh.source_mac = Some(MacAddr::new([2, 0, 0, 0, 0, 2]));
        let (old_key, fresh_key) = (old.key(), fresh.key());
        store.update(old);
        store.update(fresh);

        assert_eq!(store.mark_stale_at(threshold, now), 1);
        assert!(store.get(&old_key).unwrap().is_stale);
        assert!(!store.get(&fresh_key).unwrap().is_stale);

        // Already stale entries are not counted again
        assert_eq!(store.mark_stale_at(threshold, now), 0);

        assert_eq!(store.remove_stale_at(threshold, now), 1);
        assert!(store.get(&old_key).is_none());
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_zero_threshold_disables_sweeps() {
        let store = NeighborStore::new();
        store.update(record(ProtocolKind::Lldp, SystemTime::UNIX_EPOCH));
        let now = base_time();

        assert_eq!(store.mark_stale_at(Duration::ZERO, now), 0);
        assert!(!store.get_all()[0].is_stale);
        assert_eq!(store.remove_stale_at(Duration::ZERO, now), 0);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_update_clears_stale_flag() {
        let store = NeighborStore::new();
        let rec = record(ProtocolKind::Cdp, base_time());
        store.update(rec.clone());
        store.mark_stale_at(Duration::from_secs(10), base_time() + Duration::from_secs(30));
        assert!(store.get_all()[0].is_stale);

        let mut refreshed = rec;
        refreshed.last_seen = base_time() + Duration::from_secs(31);
        store.update(refreshed);
        assert!(!store.get_all()[0].is_stale);
    }

    #[test]
    fn test_future_last_seen_is_not_stale() {
        let store = NeighborStore::new();
        store.update(record(ProtocolKind::Cdp, base_time() + Duration::from_secs(600)));
        assert_eq!(store.mark_stale_at(Duration::from_secs(1), base_time()), 0);
    }

    #[test]
    fn test_queries_and_flags() {
        let store = NeighborStore::new();
        let mut a = record(ProtocolKind::Cdp, base_time());
        a.interface = "eth1".to_string();
        let b = record(ProtocolKind::Lldp, base_time());
        store.update(a);
        store.update(b);

        assert_eq!(store.count(), 2);
        assert_eq!(store.get_by_interface("eth1").len(), 1);
        assert_eq!(store.get_by_interface("wlan0").len(), 0);
        assert!(store.get("ETH0:00:1B:54:AA:BB:CC").is_some());
        assert!(store.get_all().iter().all(|r| r.is_new));

        store.clear_new_flags();
        assert!(store.get_all().iter().all(|r| !r.is_new));

        store.clear();
        assert_eq!(store.count(), 0);
    }

    fn peer(index: u16, seen: SystemTime) -> NeighborRecord {
        let [hi, lo] = index.to_be_bytes();
        let mut rec = NeighborRecord::new(ProtocolKind::Lldp, seen);
        rec.interface = "eth0".to_string();
        rec.source_mac = Some(MacAddr::new([0x02, 0x00, 0x00, 0x00, hi, lo]));
        rec
    }

    #[test]
    fn test_concurrent_writer_sweeper_and_reader() {
        const PEERS: u16 = 256;

        let recorder = Arc::new(Recorder::default());
        let store = NeighborStore::with_observer(recorder.clone());

        let done = AtomicBool::new(false);

        thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..2 {
                    for index in 0..PEERS {
                        store.update(peer(index, SystemTime::now()));
                    }
                }
                done.store(true, Ordering::SeqCst);
            });

            scope.spawn(|| {
                while !done.load(Ordering::SeqCst) {
                    let now = SystemTime::now();
                    assert_eq!(store.mark_stale_at(Duration::from_secs(3600), now), 0);
                    assert_eq!(store.remove_stale_at(Duration::from_secs(7200), now), 0);
                }
            });

            scope.spawn(|| {
                while !done.load(Ordering::SeqCst) {
                    let all = store.get_all();
                    assert!(all.len() <= PEERS as usize);
                    assert!(all.windows(2).all(|w| w[0].key() < w[1].key()));
                }
            });
        });

        let all = store.get_all();
        assert_eq!(all.len(), PEERS as usize);
        assert!(all.iter().all(|r| r.is_new && !r.is_stale));

        let events = recorder.events.lock();
        assert_eq!(events.iter().filter(|(kind, _)| *kind == "new").count(), PEERS as usize);
        assert_eq!(events.iter().filter(|(kind, _)| *kind == "updated").count(), PEERS as usize);
    }

    /// Observer that reads and writes the store from inside its callbacks
    #[derive(Default)]
    struct ReentrantObserver {
        store: OnceLock<Weak<NeighborStore>>,
        seen: Mutex<Vec<(Option<NeighborRecord>, usize)>>,
    }

    impl ReentrantObserver {
        fn look_up(&self, record: &NeighborRecord) {
            let Some(store) = self.store.get().and_then(Weak::upgrade) else {
                return;
            };
            let found = store.get(&record.key());
            let count = store.count();
            store.clear_new_flags();
            self.seen.lock().push((found, count));
        }
    }

    impl NeighborObserver for ReentrantObserver {
        fn on_new(&self, record: &NeighborRecord) {
            self.look_up(record);
        }

        fn on_updated(&self, record: &NeighborRecord) {
            self.look_up(record);
        }
    }

    #[test]
    fn test_observer_can_call_back_into_store() {
        let observer = Arc::new(ReentrantObserver::default());
        let store = Arc::new(NeighborStore::with_observer(observer.clone()));
        assert!(observer.store.set(Arc::downgrade(&store)).is_ok());

        let mut first = record(ProtocolKind::Cdp, base_time());
        first.hostname = "sw1".to_string();
        assert_eq!(store.update(first), UpdateOutcome::New);
        assert_eq!(
            store.update(record(ProtocolKind::Lldp, base_time() + Duration::from_secs(5))),
            UpdateOutcome::Updated
        );

        let seen = observer.seen.lock();
        assert_eq!(seen.len(), 2);
        let (found, count) = &seen[0];
        assert_eq!(found.as_ref().map(|r| r.hostname.as_str()), Some("sw1"));
        assert_eq!(*count, 1);
        let (found, count) = &seen[1];
        assert!(found.as_ref().is_some_and(|r| r.protocol_seen.cdp && r.protocol_seen.lldp));
        assert_eq!(*count, 1);

        // The write lock taken inside the callback went through
        assert!(!store.get_all()[0].is_new);
    }
}
