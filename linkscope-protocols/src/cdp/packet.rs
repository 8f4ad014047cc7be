//! CDP PDU parser and builder
//!
//! The PDU is a 4-byte header (version, TTL, checksum) followed by TLVs whose
//! 16-bit length includes their own 4-byte header.

use bytes::{BufMut, BytesMut};
use linkscope_core::{Error, Result};
use linkscope_packet::{insert_checksum, ByteReader};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::text::clean_text;

/// CDP Protocol version
pub const CDP_VERSION: u8 = 0x02;

/// CDP header size (version + ttl + checksum)
pub const CDP_HEADER_SIZE: usize = 4;

/// TLV header size (type + length)
pub const CDP_TLV_HEADER_SIZE: usize = 4;

pub const CDP_TYPE_DEVID: u16 = 0x0001;
pub const CDP_TYPE_ADDRESS: u16 = 0x0002;
pub const CDP_TYPE_PORTID: u16 = 0x0003;
pub const CDP_TYPE_CAPABILITY: u16 = 0x0004;
pub const CDP_TYPE_VERSION: u16 = 0x0005;
pub const CDP_TYPE_PLATFORM: u16 = 0x0006;
pub const CDP_TYPE_NATIVE_VLAN: u16 = 0x000A;
pub const CDP_TYPE_DUPLEX: u16 = 0x000B;
pub const CDP_TYPE_SYSTEM_NAME: u16 = 0x0014;
pub const CDP_TYPE_MANAGEMENT_ADDR: u16 = 0x0016;
pub const CDP_TYPE_LOCATION: u16 = 0x0017;

/// Address entry protocol type: NLPID
const ADDR_PROTO_NLPID: u8 = 0x01;
/// Address entry protocol type: 802.2 LLC/SNAP
const ADDR_PROTO_8022: u8 = 0x02;
/// NLPID for IPv4
const NLPID_IPV4: [u8; 1] = [0xCC];
/// LLC/SNAP header identifying IPv6
const SNAP_IPV6: [u8; 8] = [0xAA, 0xAA, 0x03, 0x00, 0x00, 0x00, 0x86, 0xDD];

/// Location TLV subtype for a plain string
const LOCATION_SUBTYPE_STRING: u8 = 0x01;

/// A CDP PDU
#[derive(Debug, Clone, PartialEq)]
pub struct CdpPacket {
    pub version: u8,
    /// Hold time in seconds
    pub ttl: u8,
    /// Checksum as received, or as computed by [`CdpPacket::build`]
    pub checksum: u16,
    pub tlvs: Vec<CdpTlv>,
}

impl CdpPacket {
    pub fn new(ttl: u8) -> Self {
        Self {
            version: CDP_VERSION,
            ttl,
            checksum: 0,
            tlvs: Vec::new(),
        }
    }

    pub fn add_tlv(mut self, tlv: CdpTlv) -> Self {
        self.tlvs.push(tlv);
        self
    }

    /// Serialize the PDU and fill in the checksum
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut buffer = BytesMut::with_capacity(256);
        buffer.put_u8(self.version);
        buffer.put_u8(self.ttl);
        buffer.put_u16(0);

        for tlv in &self.tlvs {
            tlv.encode(&mut buffer)?;
        }

        let mut bytes = buffer.to_vec();
        insert_checksum(&mut bytes, 2)
            .ok_or_else(|| Error::PacketConstruction("CDP header missing".to_string()))?;
        Ok(bytes)
    }

    /// Parse a PDU; the checksum is kept but not verified
    ///
    /// Every TLV must fit exactly inside the buffer. Dangling bytes shorter
    /// than a TLV header are a malformed PDU.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data);
        let version = reader.read_u8()?;
        let ttl = reader.read_u8()?;
        let checksum = reader.read_u16()?;

        let mut tlvs = Vec::new();
        while !reader.is_empty() {
            let tlv_type = reader.read_u16()?;
            let tlv_len = reader.read_u16()? as usize;
            if tlv_len < CDP_TLV_HEADER_SIZE {
                return Err(Error::malformed(format!(
                    "CDP TLV 0x{:04X} declares length {}",
                    tlv_type, tlv_len
                )));
            }
            let value = reader.read_bytes(tlv_len - CDP_TLV_HEADER_SIZE)?;
            tlvs.push(CdpTlv::decode(tlv_type, value)?);
        }

        Ok(CdpPacket {
            version,
            ttl,
            checksum,
            tlvs,
        })
    }
}

/// CDP TLVs understood by linkscope
#[derive(Debug, Clone, PartialEq)]
pub enum CdpTlv {
    DeviceId(String),
    /// Network addresses of the sender
    Addresses(Vec<IpAddr>),
    PortId(String),
    /// Raw 32-bit capability mask
    Capabilities(u32),
    SoftwareVersion(String),
    Platform(String),
    NativeVlan(u16),
    /// true for full duplex
    Duplex(bool),
    SystemName(String),
    ManagementAddresses(Vec<IpAddr>),
    Location(String),
    Unknown(u16, Vec<u8>),
}

impl CdpTlv {
    pub fn type_code(&self) -> u16 {
        match self {
            CdpTlv::DeviceId(_) => CDP_TYPE_DEVID,
            CdpTlv::Addresses(_) => CDP_TYPE_ADDRESS,
            CdpTlv::PortId(_) => CDP_TYPE_PORTID,
            CdpTlv::Capabilities(_) => CDP_TYPE_CAPABILITY,
            CdpTlv::SoftwareVersion(_) => CDP_TYPE_VERSION,
            CdpTlv::Platform(_) => CDP_TYPE_PLATFORM,
            CdpTlv::NativeVlan(_) => CDP_TYPE_NATIVE_VLAN,
            CdpTlv::Duplex(_) => CDP_TYPE_DUPLEX,
            CdpTlv::SystemName(_) => CDP_TYPE_SYSTEM_NAME,
            CdpTlv::ManagementAddresses(_) => CDP_TYPE_MANAGEMENT_ADDR,
            CdpTlv::Location(_) => CDP_TYPE_LOCATION,
            CdpTlv::Unknown(code, _) => *code,
        }
    }

    fn encode(&self, buffer: &mut BytesMut) -> Result<()> {
        let mut value = BytesMut::new();
        match self {
            CdpTlv::DeviceId(s)
            | CdpTlv::PortId(s)
            | CdpTlv::SoftwareVersion(s)
            | CdpTlv::Platform(s)
            | CdpTlv::SystemName(s) => value.put_slice(s.as_bytes()),
            CdpTlv::Location(s) => {
                value.put_u8(LOCATION_SUBTYPE_STRING);
                value.put_slice(s.as_bytes());
            }
            CdpTlv::Addresses(addrs) | CdpTlv::ManagementAddresses(addrs) => {
                encode_addresses(addrs, &mut value)
            }
            CdpTlv::Capabilities(bits) => value.put_u32(*bits),
            CdpTlv::NativeVlan(vlan) => value.put_u16(*vlan),
            CdpTlv::Duplex(full) => value.put_u8(u8::from(*full)),
            CdpTlv::Unknown(_, data) => value.put_slice(data),
        }

        let total = CDP_TLV_HEADER_SIZE + value.len();
        let length = u16::try_from(total).map_err(|_| {
            Error::PacketConstruction(format!(
                "CDP TLV 0x{:04X} of {} bytes exceeds the 16-bit length field",
                self.type_code(),
                total
            ))
        })?;

        buffer.put_u16(self.type_code());
        buffer.put_u16(length);
        buffer.put_slice(&value);
        Ok(())
    }

    fn decode(tlv_type: u16, data: &[u8]) -> Result<Self> {
        Ok(match tlv_type {
            CDP_TYPE_DEVID => CdpTlv::DeviceId(clean_text(data)),
            CDP_TYPE_PORTID => CdpTlv::PortId(clean_text(data)),
            CDP_TYPE_VERSION => CdpTlv::SoftwareVersion(clean_text(data)),
            CDP_TYPE_PLATFORM => CdpTlv::Platform(clean_text(data)),
            CDP_TYPE_SYSTEM_NAME => CdpTlv::SystemName(clean_text(data)),
            CDP_TYPE_ADDRESS => CdpTlv::Addresses(decode_addresses(data)?),
            CDP_TYPE_MANAGEMENT_ADDR => CdpTlv::ManagementAddresses(decode_addresses(data)?),
            CDP_TYPE_CAPABILITY => {
                let mut reader = ByteReader::new(data);
                CdpTlv::Capabilities(reader.read_u32()?)
            }
            CDP_TYPE_NATIVE_VLAN => {
                let mut reader = ByteReader::new(data);
                CdpTlv::NativeVlan(reader.read_u16()?)
            }
            CDP_TYPE_DUPLEX => {
                let mut reader = ByteReader::new(data);
                CdpTlv::Duplex(reader.read_u8()? == 0x01)
            }
            CDP_TYPE_LOCATION => match data.split_first() {
                Some((&LOCATION_SUBTYPE_STRING, rest)) => CdpTlv::Location(clean_text(rest)),
                _ => CdpTlv::Location(clean_text(data)),
            },
            other => CdpTlv::Unknown(other, data.to_vec()),
        })
    }
}

/// Address list: 4-byte count, then per entry protocol type, protocol length,
/// protocol bytes, 2-byte address length and the address
fn encode_addresses(addrs: &[IpAddr], buffer: &mut BytesMut) {
    buffer.put_u32(addrs.len() as u32);
    for addr in addrs {
        match addr {
            IpAddr::V4(v4) => {
                buffer.put_u8(ADDR_PROTO_NLPID);
                buffer.put_u8(NLPID_IPV4.len() as u8);
                buffer.put_slice(&NLPID_IPV4);
                buffer.put_u16(4);
                buffer.put_slice(&v4.octets());
            }
            IpAddr::V6(v6) => {
                buffer.put_u8(ADDR_PROTO_8022);
                buffer.put_u8(SNAP_IPV6.len() as u8);
                buffer.put_slice(&SNAP_IPV6);
                buffer.put_u16(16);
                buffer.put_slice(&v6.octets());
            }
        }
    }
}

/// Decode an address list, keeping the IPv4 and IPv6 entries
///
/// Entries for other network protocols are skipped; an entry that overruns
/// the TLV is malformed.
fn decode_addresses(data: &[u8]) -> Result<Vec<IpAddr>> {
    let mut reader = ByteReader::new(data);
    let count = reader.read_u32()?;
    let mut addrs = Vec::new();

    for _ in 0..count {
        let proto_type = reader.read_u8()?;
        let proto_len = reader.read_u8()? as usize;
        let protocol = reader.read_bytes(proto_len)?;
        let addr_len = reader.read_u16()? as usize;
        let addr = reader.read_bytes(addr_len)?;

        match (proto_type, protocol, addr.len()) {
            (ADDR_PROTO_NLPID, p, 4) if p == NLPID_IPV4.as_slice() => {
                let octets: [u8; 4] = [addr[0], addr[1], addr[2], addr[3]];
                addrs.push(IpAddr::V4(Ipv4Addr::from(octets)));
            }
            (ADDR_PROTO_8022, p, 16) if p == SNAP_IPV6.as_slice() => {
                let mut octets = [0u8; 16];
                octets.copy_from_slice(addr);
                addrs.push(IpAddr::V6(Ipv6Addr::from(octets)));
            }
            _ => {}
        }
    }

    Ok(addrs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkscope_packet::internet_checksum;

    #[test]
    fn test_build_header_and_checksum() {
        let bytes = CdpPacket::new(180)
            .add_tlv(CdpTlv::DeviceId("Router1".to_string()))
            .add_tlv(CdpTlv::PortId("FastEthernet0/1".to_string()))
            .build()
            .unwrap();

        assert_eq!(bytes[0], CDP_VERSION);
        assert_eq!(bytes[1], 180);
        assert_eq!(&bytes[4..8], &[0x00, 0x01, 0x00, 0x0B]);
        assert_eq!(internet_checksum(&bytes), 0);
    }

    #[test]
    fn test_parse_roundtrip() {
        let original = CdpPacket::new(120)
            .add_tlv(CdpTlv::DeviceId("TestDevice".to_string()))
            .add_tlv(CdpTlv::Addresses(vec![
                IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1)),
                "2001:db8::1".parse().unwrap(),
            ]))
            .add_tlv(CdpTlv::Capabilities(0x29))
            .add_tlv(CdpTlv::NativeVlan(10))
            .add_tlv(CdpTlv::Duplex(true))
            .add_tlv(CdpTlv::Location("rack 4".to_string()))
            .add_tlv(CdpTlv::Unknown(0x1001, vec![1, 2, 3]));

        let bytes = original.build().unwrap();
        let parsed = CdpPacket::parse(&bytes).unwrap();

        assert_eq!(parsed.tlvs, original.tlvs);
        assert_eq!(parsed.ttl, 120);
        assert_eq!(parsed.checksum, u16::from_be_bytes([bytes[2], bytes[3]]));
    }

    #[test]
    fn test_parse_rejects_bad_tlv_lengths() {
        // length below the TLV header size
        let data = [0x02, 0xB4, 0x00, 0x00, 0x00, 0x01, 0x00, 0x03];
        assert!(CdpPacket::parse(&data).unwrap_err().is_malformed());

        // length past the end of the buffer
        let data = [0x02, 0xB4, 0x00, 0x00, 0x00, 0x01, 0x00, 0x09, b's', b'w'];
        assert!(CdpPacket::parse(&data).unwrap_err().is_malformed());

        // dangling partial TLV header
        let data = [0x02, 0xB4, 0x00, 0x00, 0x00, 0x01];
        assert!(CdpPacket::parse(&data).unwrap_err().is_malformed());

        // capabilities TLV too short for its mask
        let data = [0x02, 0xB4, 0x00, 0x00, 0x00, 0x04, 0x00, 0x06, 0x00, 0x08];
        assert!(CdpPacket::parse(&data).unwrap_err().is_malformed());
    }

    #[test]
    fn test_addresses_skip_foreign_protocols() {
        let value = [
            0x00, 0x00, 0x00, 0x02, // two entries
            0x01, 0x01, 0x81, 0x00, 0x01, 0x07, // NLPID CLNS, 1-byte address
            0x01, 0x01, 0xCC, 0x00, 0x04, 10, 1, 1, 1, // IPv4
        ];
        let addrs = decode_addresses(&value).unwrap();
        assert_eq!(addrs, vec![IpAddr::V4(Ipv4Addr::new(10, 1, 1, 1))]);

        // entry count larger than the entries present
        let value = [0x00, 0x00, 0x00, 0x02, 0x01, 0x01, 0xCC, 0x00, 0x04, 10, 1, 1, 1];
        assert!(decode_addresses(&value).unwrap_err().is_malformed());
    }

    #[test]
    fn test_location_subtype_is_optional() {
        assert_eq!(
            CdpTlv::decode(CDP_TYPE_LOCATION, b"\x01Building 2").unwrap(),
            CdpTlv::Location("Building 2".to_string())
        );
        assert_eq!(
            CdpTlv::decode(CDP_TYPE_LOCATION, b"Building 2").unwrap(),
            CdpTlv::Location("Building 2".to_string())
        );
    }
}
