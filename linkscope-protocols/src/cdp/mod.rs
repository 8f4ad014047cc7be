//! Cisco Discovery Protocol (CDP)
//!
//! CDP uses LLC/SNAP encapsulation over 802.3:
//! - Destination MAC: 01:00:0C:CC:CC:CC (CDP multicast)
//! - LLC: DSAP=0xAA, SSAP=0xAA, Control=0x03
//! - SNAP: OUI=0x00000C (Cisco), Type=0x2000 (CDP)
//!
//! The PDU header carries an RFC 1071 checksum over the whole PDU. Inbound
//! checksums are not verified.

pub mod packet;
pub mod protocol;


pub use packet::{CdpPacket, CdpTlv, CDP_VERSION};
pub use protocol::{CdpProtocol, CDP_PLATFORM};
