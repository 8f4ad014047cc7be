//! Link Layer Discovery Protocol (LLDP, IEEE 802.1AB)
//!
//! LLDP frames go to 01:80:C2:00:00:0E with EtherType 0x88CC and carry a
//! flat TLV sequence: chassis ID, port ID and TTL first, optional TLVs after,
//! End-of-LLDPDU last.

pub mod packet;
pub mod protocol;


pub use packet::{LldpPacket, LldpTlv, LldpTlvType, LLDP_MAX_TLV_LEN, LLDP_TTL_DEFAULT};
pub use protocol::LldpProtocol;
