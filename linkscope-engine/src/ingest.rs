//! Captured frame to neighbor store pipeline

use linkscope_core::{Error, FrameSource, MacAddr, Packet, ProtocolKind, Result};
use linkscope_protocols::{classify, protocol_for, source_mac};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::store::{NeighborStore, UpdateOutcome};

/// What happened to one captured frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Not addressed to a discovery protocol, or not a discovery PDU
    Ignored,
    /// Sent by one of our own interfaces
    SelfOriginated,
    /// Addressed to a discovery protocol but failed to decode
    Malformed,
    Stored(UpdateOutcome),
}

/// Snapshot of [`IngestStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSnapshot {
    pub frames_seen: u64,
    pub ignored: u64,
    pub self_originated: u64,
    pub malformed: u64,
    pub cdp_decoded: u64,
    pub lldp_decoded: u64,
}

/// Per-pipeline counters
#[derive(Debug, Default)]
pub struct IngestStats {
    frames_seen: AtomicU64,
    ignored: AtomicU64,
    self_originated: AtomicU64,
    malformed: AtomicU64,
    cdp_decoded: AtomicU64,
    lldp_decoded: AtomicU64,
}

impl IngestStats {
    pub fn snapshot(&self) -> IngestSnapshot {
        IngestSnapshot {
            frames_seen: self.frames_seen.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            self_originated: self.self_originated.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            cdp_decoded: self.cdp_decoded.load(Ordering::Relaxed),
            lldp_decoded: self.lldp_decoded.load(Ordering::Relaxed),
        }
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Classify, decode and store captured frames
///
/// Malformed and foreign frames are counted and dropped; nothing a frame
/// contains can make ingestion fail.
pub struct IngestPipeline {
    store: Arc<NeighborStore>,
    local_macs: HashSet<MacAddr>,
    stats: IngestStats,
}

impl IngestPipeline {
    pub fn new(store: Arc<NeighborStore>) -> Self {
        Self {
            store,
            local_macs: HashSet::new(),
            stats: IngestStats::default(),
        }
    }

    /// Drop frames whose source is `mac`, so our own advertisements are not stored
    pub fn with_local_mac(mut self, mac: MacAddr) -> Self {
        if !mac.is_zero() {
            self.local_macs.insert(mac);
        }
        self
    }

    pub fn store(&self) -> &Arc<NeighborStore> {
        &self.store
    }

    pub fn stats(&self) -> IngestSnapshot {
        self.stats.snapshot()
    }

    pub fn ingest(&self, packet: &Packet) -> IngestOutcome {
        IngestStats::bump(&self.stats.frames_seen);

        let Some(kind) = classify(packet.data()) else {
            trace!(interface = %packet.interface, bytes = packet.len(), "Frame not of interest");
            IngestStats::bump(&self.stats.ignored);
            return IngestOutcome::Ignored;
        };

        if source_mac(packet.data()).is_some_and(|src| self.local_macs.contains(&src)) {
            IngestStats::bump(&self.stats.self_originated);
            return IngestOutcome::SelfOriginated;
        }

        let record = match protocol_for(kind).decode_frame(packet) {
            Ok(record) => record,
            Err(e @ Error::Malformed(_)) => {
                debug!(interface = %packet.interface, protocol = %kind, error = %e, "Dropping malformed frame");
                IngestStats::bump(&self.stats.malformed);
                return IngestOutcome::Malformed;
            }
            Err(e) => {
                trace!(interface = %packet.interface, protocol = %kind, error = %e, "Ignoring frame");
                IngestStats::bump(&self.stats.ignored);
                return IngestOutcome::Ignored;
            }
        };

        match kind {
            ProtocolKind::Cdp => IngestStats::bump(&self.stats.cdp_decoded),
            ProtocolKind::Lldp => IngestStats::bump(&self.stats.lldp_decoded),
        }

        let key = record.key();
        let outcome = self.store.update(record);
        trace!(key = %key, protocol = %kind, ?outcome, "Neighbor stored");
        IngestOutcome::Stored(outcome)
    }
}

/// A frame source feeding an ingest pipeline
pub struct CaptureSession<S: FrameSource> {
    source: S,
    pipeline: Arc<IngestPipeline>,
}

impl<S: FrameSource> CaptureSession<S> {
    pub fn new(source: S, pipeline: Arc<IngestPipeline>) -> Self {
        Self { source, pipeline }
    }

    /// Start the source with every frame routed into the pipeline
    pub fn start(&mut self) -> Result<()> {
        let pipeline = Arc::clone(&self.pipeline);
        self.source.start(Box::new(move |packet| {
            pipeline.ingest(&packet);
        }))
    }

    /// Stop the source; safe to call when it is not running
    pub fn stop(&mut self) -> Result<()> {
        self.source.stop()
    }

    pub fn is_running(&self) -> bool {
        self.source.is_running()
    }

    pub fn pipeline(&self) -> &Arc<IngestPipeline> {
        &self.pipeline
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
