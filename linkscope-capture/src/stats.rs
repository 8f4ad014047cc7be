//! Capture counters

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Point-in-time view of a capture's counters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureStats {
    pub packets_received: u64,
    pub bytes_received: u64,
    /// Packets the kernel dropped, reported when the capture stops
    pub packets_dropped: u64,
    pub duration: Duration,
    pub packets_per_second: f64,
}

impl CaptureStats {
    /// Dropped packets as a percentage of everything offered
    pub fn drop_rate(&self) -> f64 {
        let total = self.packets_received + self.packets_dropped;
        if total == 0 {
            return 0.0;
        }
        (self.packets_dropped as f64 / total as f64) * 100.0
    }
}

/// Counters shared between the capture thread and its owner
#[derive(Debug, Clone)]
pub struct StatsAccumulator {
    packets_received: Arc<AtomicU64>,
    bytes_received: Arc<AtomicU64>,
    packets_dropped: Arc<AtomicU64>,
    start_time: Instant,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self {
            packets_received: Arc::new(AtomicU64::new(0)),
            bytes_received: Arc::new(AtomicU64::new(0)),
            packets_dropped: Arc::new(AtomicU64::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn record_packet(&self, size: usize) {
        self.packets_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(size as u64, Ordering::Relaxed);
    }

    pub fn record_drops(&self, count: u64) {
        self.packets_dropped.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CaptureStats {
        let packets_received = self.packets_received.load(Ordering::Relaxed);
        let duration = self.start_time.elapsed();
        let secs = duration.as_secs_f64();

        CaptureStats {
            packets_received,
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            packets_dropped: self.packets_dropped.load(Ordering::Relaxed),
            duration,
            packets_per_second: if secs > 0.0 {
                packets_received as f64 / secs
            } else {
                0.0
            },
        }
    }
}

impl Default for StatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accumulator_is_shared_between_clones() {
        let stats = StatsAccumulator::new();
        let worker = stats.clone();

        worker.record_packet(60);
        worker.record_packet(100);
        worker.record_drops(2);

        let snap = stats.snapshot();
        assert_eq!(snap.packets_received, 2);
        assert_eq!(snap.bytes_received, 160);
        assert_eq!(snap.packets_dropped, 2);
        assert!((snap.drop_rate() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_drop_rate_empty() {
        assert_eq!(CaptureStats::default().drop_rate(), 0.0);
    }
}
