//! linkscope core library
//!
//! This crate provides the fundamental types, traits and error handling
//! shared by the linkscope neighbor discovery crates:
//!
//! - [`NeighborRecord`] - the normalized result of decoding a CDP or LLDP frame
//! - [`Protocol`] - the codec trait implemented by each discovery protocol
//! - [`FrameSource`] / [`FrameSender`] - the raw frame transport seams
//! - [`DiscoveryConfig`] - identity and timing configuration

pub mod config;
pub mod error;
pub mod interface;
pub mod neighbor;
pub mod packet;
pub mod protocol;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use config::{Advertisement, DiscoveryConfig};
pub use error::{Error, Result};
pub use interface::InterfaceDescriptor;
pub use neighbor::{Capability, NeighborRecord, ProtocolPresence, ProtocolSeen};
pub use packet::Packet;
pub use protocol::Protocol;
pub use transport::{FrameSender, FrameSink, FrameSource};
pub use types::*;
