//! LLC (802.2) and SNAP headers
//!
//! CDP frames carry `AA AA 03` followed by the Cisco OUI and SNAP protocol
//! ID 0x2000.

use bytes::{BufMut, BytesMut};
use linkscope_core::protocol_constants::{
    CDP_LLC_CONTROL, CDP_LLC_DSAP, CDP_LLC_SSAP, CDP_SNAP_OUI, CDP_SNAP_TYPE,
};

/// OUI (Organizationally Unique Identifier) - 3 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Oui(pub [u8; 3]);

impl Oui {
    /// Cisco OUI (0x00000C)
    pub const CISCO: Oui = Oui(CDP_SNAP_OUI);

    pub fn as_bytes(&self) -> &[u8; 3] {
        &self.0
    }
}

/// SNAP Protocol ID (2 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapProtocolId(pub u16);

impl SnapProtocolId {
    /// CDP (0x2000)
    pub const CDP: SnapProtocolId = SnapProtocolId(CDP_SNAP_TYPE);
    /// VTP (0x2003), shares the CDP multicast address
    pub const VTP: SnapProtocolId = SnapProtocolId(0x2003);
}

/// LLC header (3 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlcHeader {
    pub dsap: u8,
    pub ssap: u8,
    pub control: u8,
}

impl LlcHeader {
    pub const SIZE: usize = 3;

    /// Standard SNAP LLC header (DSAP=0xAA, SSAP=0xAA, Control=0x03)
    pub const fn snap() -> Self {
        LlcHeader {
            dsap: CDP_LLC_DSAP,
            ssap: CDP_LLC_SSAP,
            control: CDP_LLC_CONTROL,
        }
    }

    pub fn is_snap(&self) -> bool {
        *self == Self::snap()
    }

    pub fn to_bytes(&self) -> [u8; 3] {
        [self.dsap, self.ssap, self.control]
    }

    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        match data {
            [dsap, ssap, control, ..] => Some(LlcHeader {
                dsap: *dsap,
                ssap: *ssap,
                control: *control,
            }),
            _ => None,
        }
    }
}

/// SNAP header (5 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapHeader {
    pub oui: Oui,
    pub protocol_id: SnapProtocolId,
}

impl SnapHeader {
    pub const SIZE: usize = 5;

    /// Cisco OUI + CDP protocol ID
    pub const fn cdp() -> Self {
        SnapHeader {
            oui: Oui::CISCO,
            protocol_id: SnapProtocolId::CDP,
        }
    }

    pub fn to_bytes(&self) -> [u8; 5] {
        let mut bytes = [0u8; 5];
        bytes[0..3].copy_from_slice(self.oui.as_bytes());
        bytes[3..5].copy_from_slice(&self.protocol_id.0.to_be_bytes());
        bytes
    }

    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        match data {
            [a, b, c, hi, lo, ..] => Some(SnapHeader {
                oui: Oui([*a, *b, *c]),
                protocol_id: SnapProtocolId(u16::from_be_bytes([*hi, *lo])),
            }),
            _ => None,
        }
    }
}

/// LLC + SNAP encapsulated payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlcSnapFrame {
    pub llc: LlcHeader,
    pub snap: SnapHeader,
    pub payload: Vec<u8>,
}

impl LlcSnapFrame {
    /// Total LLC/SNAP header size (LLC + SNAP)
    pub const HEADER_SIZE: usize = LlcHeader::SIZE + SnapHeader::SIZE;

    pub fn cdp(payload: Vec<u8>) -> Self {
        LlcSnapFrame {
            llc: LlcHeader::snap(),
            snap: SnapHeader::cdp(),
            payload,
        }
    }

    /// True for the exact LLC/SNAP header CDP uses
    pub fn is_cdp(&self) -> bool {
        self.llc.is_snap() && self.snap == SnapHeader::cdp()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = BytesMut::with_capacity(Self::HEADER_SIZE + self.payload.len());
        buffer.put_slice(&self.llc.to_bytes());
        buffer.put_slice(&self.snap.to_bytes());
        buffer.put_slice(&self.payload);
        buffer.to_vec()
    }

    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        let llc = LlcHeader::from_bytes(data)?;
        let snap = SnapHeader::from_bytes(data.get(LlcHeader::SIZE..)?)?;
        let payload = data.get(Self::HEADER_SIZE..)?.to_vec();

        Some(LlcSnapFrame { llc, snap, payload })
    }

    pub fn len(&self) -> usize {
        Self::HEADER_SIZE + self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}
