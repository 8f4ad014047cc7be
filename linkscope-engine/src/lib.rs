//! Neighbor discovery engine for linkscope
//!
//! Ties the codecs to the outside world:
//!
//! - [`NeighborStore`] - the deduplicated neighbor table, with a
//!   [`NeighborObserver`] hook for new and refreshed neighbors
//! - [`IngestPipeline`] / [`CaptureSession`] - captured frames into the store
//! - [`Broadcaster`] - periodic transmission of this host's own CDP/LLDP frames
//! - [`StalenessSweeper`] - periodic `mark_stale` / `remove_stale`
//!
//! The store is guarded by its own lock; the broadcaster keeps its
//! configuration behind a separate one.

pub mod broadcaster;
pub mod ingest;
pub mod observer;
pub mod store;
pub mod sweeper;

pub use broadcaster::{BroadcastStats, Broadcaster};
pub use ingest::{CaptureSession, IngestOutcome, IngestPipeline, IngestSnapshot, IngestStats};
pub use observer::NeighborObserver;
pub use store::{NeighborStore, UpdateOutcome};
pub use sweeper::{StalenessSweeper, SweepReport, SweepThresholds, DEFAULT_SWEEP_PERIOD};
