//! Raw frame transport seams
//!
//! Capture and transmission live outside the engine; these traits are the
//! shape the engine expects from them.

use crate::{Packet, Result};

/// Receives every frame delivered by a [`FrameSource`]
pub type FrameSink = Box<dyn FnMut(Packet) + Send + 'static>;

/// A source of raw Ethernet frames for one interface
pub trait FrameSource: Send {
    /// Start delivering frames to `sink` on a background thread
    fn start(&mut self, sink: FrameSink) -> Result<()>;

    /// Stop delivering frames; a no-op when already stopped
    fn stop(&mut self) -> Result<()>;

    fn is_running(&self) -> bool;
}

/// Transmits fully built Ethernet frames
pub trait FrameSender: Send + Sync {
    fn send_frame(&self, frame: &[u8]) -> Result<()>;
}
