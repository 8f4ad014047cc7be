//! Link-layer I/O for linkscope
//!
//! Thin adapters between the operating system and the engine:
//!
//! - [`PacketCapture`] - pcap capture implementing [`linkscope_core::FrameSource`],
//!   filtered to the CDP and LLDP multicast destinations
//! - [`DatalinkSender`] - pnet datalink channel implementing [`linkscope_core::FrameSender`]
//! - Interface enumeration into [`linkscope_core::InterfaceDescriptor`]
//!
//! ## Example
//!
//! ```no_run
//! use linkscope_capture::PacketCapture;
//! use linkscope_core::FrameSource;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut capture = PacketCapture::new("eth0");
//! capture.start(Box::new(|packet| {
//!     println!("discovery frame: {} bytes", packet.len());
//! }))?;
//!
//! capture.stop()?;
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod filters;
pub mod interface;
pub mod sender;
pub mod stats;

pub use capture::{CaptureConfig, CaptureState, PacketCapture};
pub use interface::{
    default_interface, get_interface, list_capture_interfaces, list_interfaces, InterfaceInfo,
};
pub use sender::DatalinkSender;
pub use stats::{CaptureStats, StatsAccumulator};
