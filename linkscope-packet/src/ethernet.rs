//! Ethernet II and IEEE 802.3 framing
//!
//! LLDP rides directly on an EtherType; CDP uses an 802.3 length field
//! followed by LLC/SNAP. Frames are emitted without minimum-size padding,
//! the driver pads short frames on the wire.

use bytes::{BufMut, BytesMut};
use linkscope_core::{Error, MacAddr, Result};
use std::fmt;

/// Largest value of the type/length field that is a length (IEEE 802.3)
pub const MAX_8023_LENGTH: u16 = 1500;

/// Smallest value of the type/length field that is an EtherType
pub const MIN_ETHERTYPE: u16 = 0x0600;

/// Type/length field of an Ethernet header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EtherType {
    /// LLDP (0x88CC)
    Lldp,
    /// 802.3 length field, payload starts with an LLC header
    Llc,
    /// Any other EtherType
    Custom(u16),
}

impl EtherType {
    /// Wire value; for [`EtherType::Llc`] the length is filled in when encoding
    pub fn to_u16(self) -> u16 {
        match self {
            EtherType::Lldp => 0x88CC,
            EtherType::Llc => 0,
            EtherType::Custom(val) => val,
        }
    }

    pub fn from_u16(value: u16) -> Self {
        match value {
            0x88CC => EtherType::Lldp,
            val if val <= MAX_8023_LENGTH => EtherType::Llc,
            val => EtherType::Custom(val),
        }
    }
}

impl fmt::Display for EtherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EtherType::Lldp => write!(f, "LLDP"),
            EtherType::Llc => write!(f, "LLC"),
            EtherType::Custom(val) => write!(f, "0x{:04X}", val),
        }
    }
}

/// Ethernet frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthernetFrame {
    pub destination: MacAddr,
    pub source: MacAddr,
    pub ethertype: EtherType,
    pub payload: Vec<u8>,
}

impl EthernetFrame {
    /// Ethernet header size (dst + src + type/length)
    pub const HEADER_SIZE: usize = 14;

    /// Maximum payload size (MTU)
    pub const MAX_PAYLOAD_SIZE: usize = 1500;

    pub fn new(destination: MacAddr, source: MacAddr, ethertype: EtherType, payload: Vec<u8>) -> Self {
        EthernetFrame {
            destination,
            source,
            ethertype,
            payload,
        }
    }

    /// Serialize the frame
    ///
    /// LLC frames get the payload length in the type/length field. Payloads
    /// larger than the MTU are rejected.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.payload.len() > Self::MAX_PAYLOAD_SIZE {
            return Err(Error::PacketConstruction(format!(
                "payload of {} bytes exceeds the {} byte MTU",
                self.payload.len(),
                Self::MAX_PAYLOAD_SIZE
            )));
        }

        let mut buffer = BytesMut::with_capacity(Self::HEADER_SIZE + self.payload.len());
        buffer.put_slice(self.destination.as_bytes());
        buffer.put_slice(self.source.as_bytes());
        match self.ethertype {
            EtherType::Llc => buffer.put_u16(self.payload.len() as u16),
            other => buffer.put_u16(other.to_u16()),
        }
        buffer.put_slice(&self.payload);

        Ok(buffer.to_vec())
    }

    /// Parse a captured frame
    ///
    /// For 802.3 frames the payload is cut at the declared length, dropping
    /// trailing padding; a declared length past the captured bytes is malformed.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::HEADER_SIZE {
            return Err(Error::malformed(format!(
                "{} bytes is shorter than an Ethernet header",
                data.len()
            )));
        }

        let destination = MacAddr::new(header_mac(data, 0));
        let source = MacAddr::new(header_mac(data, 6));
        let type_or_len = u16::from_be_bytes([data[12], data[13]]);
        let body = &data[Self::HEADER_SIZE..];

        let (ethertype, payload) = if type_or_len <= MAX_8023_LENGTH {
            let declared = type_or_len as usize;
            if declared > body.len() {
                return Err(Error::malformed(format!(
                    "802.3 length {} exceeds the {} captured payload bytes",
                    declared,
                    body.len()
                )));
            }
            (EtherType::Llc, &body[..declared])
        } else if type_or_len < MIN_ETHERTYPE {
            return Err(Error::malformed(format!(
                "type/length field 0x{:04X} is neither a length nor an EtherType",
                type_or_len
            )));
        } else {
            (EtherType::from_u16(type_or_len), body)
        };

        Ok(EthernetFrame {
            destination,
            source,
            ethertype,
            payload: payload.to_vec(),
        })
    }

    /// Total frame size in bytes
    pub fn len(&self) -> usize {
        Self::HEADER_SIZE + self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Destination (`offset` 0) or source (`offset` 6) address of a frame known
/// to hold at least a full header
fn header_mac(data: &[u8], offset: usize) -> [u8; 6] {
    let mut mac = [0u8; 6];
    mac.copy_from_slice(&data[offset..offset + 6]);
    mac
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: MacAddr = MacAddr::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);

    #[test]
    fn test_ethertype_conversion() {
        assert_eq!(EtherType::Lldp.to_u16(), 0x88CC);
        assert_eq!(EtherType::from_u16(0x88CC), EtherType::Lldp);
        assert_eq!(EtherType::from_u16(0x0800), EtherType::Custom(0x0800));
        assert_eq!(EtherType::from_u16(46), EtherType::Llc);
        assert_eq!(EtherType::Custom(0x0800).to_string(), "0x0800");
    }

    #[test]
    fn test_lldp_frame_is_not_padded() {
        let frame = EthernetFrame::new(MacAddr::LLDP_MULTICAST, SRC, EtherType::Lldp, vec![0x00, 0x00]);
        let bytes = frame.to_bytes().unwrap();

        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[0..6], MacAddr::LLDP_MULTICAST.as_bytes());
        assert_eq!(&bytes[6..12], SRC.as_bytes());
        assert_eq!(&bytes[12..14], &[0x88, 0xCC]);
        assert_eq!(frame.len(), 16);
    }

    #[test]
    fn test_llc_frame_uses_length() {
        let payload = vec![0xAA, 0xAA, 0x03, 0x00, 0x00, 0x0C, 0x20, 0x00];
        let frame = EthernetFrame::new(MacAddr::CDP_MULTICAST, SRC, EtherType::Llc, payload.clone());
        let bytes = frame.to_bytes().unwrap();

        assert_eq!(u16::from_be_bytes([bytes[12], bytes[13]]), payload.len() as u16);
        assert_eq!(EthernetFrame::from_bytes(&bytes).unwrap(), frame);
    }

    #[test]
    fn test_from_bytes_strips_padding_after_length() {
        let mut data = vec![
            0x01, 0x00, 0x0C, 0xCC, 0xCC, 0xCC, // dst
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, // src
            0x00, 0x03, // length
            0xAA, 0xAA, 0x03,
        ];
        data.resize(60, 0);

        let frame = EthernetFrame::from_bytes(&data).unwrap();
        assert_eq!(frame.ethertype, EtherType::Llc);
        assert_eq!(frame.payload, vec![0xAA, 0xAA, 0x03]);
    }

    #[test]
    fn test_from_bytes_rejects_bad_input() {
        assert!(EthernetFrame::from_bytes(&[0u8; 13]).unwrap_err().is_malformed());

        let mut overlong = vec![0u8; 12];
        overlong.extend_from_slice(&[0x00, 0x10, 0xAA]);
        assert!(EthernetFrame::from_bytes(&overlong).unwrap_err().is_malformed());

        let mut reserved = vec![0u8; 12];
        reserved.extend_from_slice(&[0x05, 0xFF]);
        assert!(EthernetFrame::from_bytes(&reserved).is_err());
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let frame = EthernetFrame::new(MacAddr::LLDP_MULTICAST, SRC, EtherType::Lldp, vec![0; 1501]);
        assert!(frame.to_bytes().is_err());
    }
}
