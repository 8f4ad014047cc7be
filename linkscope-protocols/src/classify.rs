//! Inbound frame classification
//!
//! Only the destination address is inspected; decoding happens later and only
//! for frames classified here.

use linkscope_core::{MacAddr, ProtocolKind};

const HEADER_SIZE: usize = 14;

/// Which discovery protocol a raw Ethernet frame is addressed to, if any
pub fn classify(frame: &[u8]) -> Option<ProtocolKind> {
    let dst = destination_mac(frame)?;
    if dst == MacAddr::CDP_MULTICAST {
        Some(ProtocolKind::Cdp)
    } else if dst == MacAddr::LLDP_MULTICAST {
        Some(ProtocolKind::Lldp)
    } else {
        None
    }
}

/// Destination address of a frame holding at least a full Ethernet header
pub fn destination_mac(frame: &[u8]) -> Option<MacAddr> {
    if frame.len() < HEADER_SIZE {
        return None;
    }
    MacAddr::from_slice(&frame[0..6])
}

/// Source address of a frame holding at least a full Ethernet header
pub fn source_mac(frame: &[u8]) -> Option<MacAddr> {
    if frame.len() < HEADER_SIZE {
        return None;
    }
    MacAddr::from_slice(&frame[6..12])
}
