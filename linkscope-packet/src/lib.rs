//! Link-layer framing helpers for linkscope
//!
//! - [`ethernet`] - Ethernet II / 802.3 frame construction and parsing
//! - [`llc`] - LLC and SNAP headers used by CDP
//! - [`checksum`] - Internet checksum (RFC 1071)
//! - [`reader`] - bounds-checked cursor for TLV walking

pub mod checksum;
pub mod ethernet;
pub mod llc;
pub mod reader;

pub use checksum::{insert_checksum, internet_checksum};
pub use ethernet::{EtherType, EthernetFrame};
pub use llc::{LlcHeader, LlcSnapFrame, Oui, SnapHeader, SnapProtocolId};
pub use reader::ByteReader;
