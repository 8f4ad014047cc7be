//! Discovery protocol codecs for linkscope
//!
//! ### CDP (Cisco Discovery Protocol)
//! LLC/SNAP encapsulated, checksummed TLV PDU. See [`cdp`].
//!
//! ### LLDP (Link Layer Discovery Protocol)
//! EtherType 0x88CC, 7/9-bit packed TLV headers. See [`lldp`].
//!
//! Both codecs implement [`linkscope_core::Protocol`]. [`capability`] holds the
//! per-protocol capability bit tables and [`classify`] routes raw frames to
//! the right codec by destination address.

pub mod capability;
pub mod cdp;
pub mod classify;
pub mod lldp;
pub mod text;

pub use cdp::CdpProtocol;
pub use classify::{classify, source_mac};
pub use lldp::LldpProtocol;

use linkscope_core::{Protocol, ProtocolKind};

/// Codec for a protocol kind
pub fn protocol_for(kind: ProtocolKind) -> &'static dyn Protocol {
    static CDP: CdpProtocol = CdpProtocol;
    static LLDP: LldpProtocol = LldpProtocol;
    match kind {
        ProtocolKind::Cdp => &CDP,
        ProtocolKind::Lldp => &LLDP,
    }
}
