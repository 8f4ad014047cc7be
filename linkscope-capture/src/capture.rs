//! pcap-backed frame source

use linkscope_core::{Error, FrameSink, FrameSource, Packet, Result};
use parking_lot::RwLock;
use pcap::{Active, Capture, Device};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::SystemTime;
use tracing::{debug, error, info, warn};

use crate::filters;
use crate::stats::{CaptureStats, StatsAccumulator};

/// Default snapshot length (maximum bytes per packet)
const DEFAULT_SNAPLEN: i32 = 65535;

/// Read timeout; bounds how long `stop` waits for the capture thread
const DEFAULT_TIMEOUT_MS: i32 = 1000;

/// Configuration for packet capture
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Maximum bytes to capture per packet
    pub snaplen: i32,
    /// Read timeout in milliseconds
    pub timeout_ms: i32,
    /// Enable promiscuous mode
    pub promiscuous: bool,
    /// Kernel buffer size (0 = libpcap default)
    pub buffer_size: i32,
    /// Deliver packets as soon as they arrive
    pub immediate_mode: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            snaplen: DEFAULT_SNAPLEN,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            promiscuous: true,
            buffer_size: 0,
            immediate_mode: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Stopped,
    Running,
}

/// Live capture of discovery frames on one interface
///
/// The BPF filter is [`filters::discovery_filter`], so only frames sent to
/// the CDP or LLDP multicast addresses reach the sink.
pub struct PacketCapture {
    interface: String,
    config: CaptureConfig,
    state: Arc<RwLock<CaptureState>>,
    stats: StatsAccumulator,
    worker: Option<JoinHandle<()>>,
}

impl PacketCapture {
    /// Create a stopped capture for `interface`
    pub fn new(interface: impl Into<String>) -> Self {
        Self::with_config(interface, CaptureConfig::default())
    }

    pub fn with_config(interface: impl Into<String>, config: CaptureConfig) -> Self {
        Self {
            interface: interface.into(),
            config,
            state: Arc::new(RwLock::new(CaptureState::Stopped)),
            stats: StatsAccumulator::new(),
            worker: None,
        }
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn state(&self) -> CaptureState {
        *self.state.read()
    }

    /// Counters so far; kernel drops are folded in once the capture stops
    pub fn stats(&self) -> CaptureStats {
        self.stats.snapshot()
    }

    fn open(&self) -> Result<Capture<Active>> {
        debug!(interface = %self.interface, "Opening pcap handle");

        let device = Device::from(self.interface.as_str());
        let mut capture = Capture::from_device(device)
            .map_err(|e| Error::Capture(format!("Failed to create capture: {}", e)))?
            .promisc(self.config.promiscuous)
            .snaplen(self.config.snaplen)
            .timeout(self.config.timeout_ms)
            .immediate_mode(self.config.immediate_mode);

        if self.config.buffer_size > 0 {
            capture = capture.buffer_size(self.config.buffer_size);
        }

        let mut capture = capture
            .open()
            .map_err(|e| Error::Capture(format!("Failed to open {}: {}", self.interface, e)))?;

        let filter = filters::discovery_filter();
        capture
            .filter(&filter, true)
            .map_err(|e| Error::Capture(format!("Invalid filter '{}': {}", filter, e)))?;

        Ok(capture)
    }
}

impl FrameSource for PacketCapture {
    fn start(&mut self, mut sink: FrameSink) -> Result<()> {
        if self.state() == CaptureState::Running {
            return Err(Error::Capture(format!(
                "Capture already running on {}",
                self.interface
            )));
        }

        // Open on the caller's thread so permission and device errors surface here.
        let mut capture = self.open()?;
        *self.state.write() = CaptureState::Running;
        info!(interface = %self.interface, "Starting capture");

        let state = Arc::clone(&self.state);
        let stats = self.stats.clone();
        let interface = self.interface.clone();

        let handle = thread::Builder::new()
            .name(format!("capture-{}", self.interface))
            .spawn(move || {
                while *state.read() == CaptureState::Running {
                    match capture.next_packet() {
                        Ok(raw) => {
                            let data = raw.data.to_vec();
                            let wire_len = raw.header.len as usize;
                            stats.record_packet(data.len());

                            sink(Packet {
                                timestamp: SystemTime::now(),
                                interface: interface.clone(),
                                data,
                                len: wire_len,
                            });
                        }
                        Err(pcap::Error::TimeoutExpired) => continue,
                        Err(e) => {
                            error!(interface = %interface, error = %e, "Capture failed");
                            break;
                        }
                    }
                }

                match capture.stats() {
                    Ok(kernel) => stats.record_drops(u64::from(kernel.dropped)),
                    Err(e) => debug!(interface = %interface, error = %e, "No pcap stats"),
                }

                *state.write() = CaptureState::Stopped;
                info!(interface = %interface, "Capture thread finished");
            })
            .map_err(|e| {
                *self.state.write() = CaptureState::Stopped;
                Error::Capture(format!("Failed to spawn capture thread: {}", e))
            })?;

        self.worker = Some(handle);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        info!(interface = %self.interface, "Stopping capture");
        *self.state.write() = CaptureState::Stopped;

        if worker.join().is_err() {
            warn!(interface = %self.interface, "Capture thread panicked");
            return Err(Error::Capture("Capture thread panicked".to_string()));
        }

        Ok(())
    }

    fn is_running(&self) -> bool {
        self.state() == CaptureState::Running
    }
}

impl Drop for PacketCapture {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_config_default() {
        let config = CaptureConfig::default();
        assert_eq!(config.snaplen, DEFAULT_SNAPLEN);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(config.promiscuous);
        assert!(config.immediate_mode);
    }

    #[test]
    fn test_new_capture_is_stopped() {
        let mut capture = PacketCapture::new("eth0");
        assert_eq!(capture.interface(), "eth0");
        assert_eq!(capture.state(), CaptureState::Stopped);
        assert!(!capture.is_running());

        // Stopping a capture that never started is a no-op
        assert!(capture.stop().is_ok());
        assert!(capture.stop().is_ok());

        let stats = capture.stats();
        assert_eq!(stats.packets_received, 0);
        assert_eq!(stats.packets_dropped, 0);
        assert_eq!(stats.drop_rate(), 0.0);
    }

    #[test]
    fn test_start_on_missing_device_fails() {
        let mut capture = PacketCapture::new("linkscope-no-such-if0");
        let result = capture.start(Box::new(|_| {}));
        assert!(result.is_err());
        assert!(!capture.is_running());
        assert_eq!(capture.stats().packets_received, 0);
    }
}
