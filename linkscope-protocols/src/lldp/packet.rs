//! LLDP PDU structures and parsing
//!
//! Each TLV header packs a 7-bit type and a 9-bit length into 16 bits. An
//! LLDPDU ends with a zero-length End-of-LLDPDU TLV.

use bytes::{BufMut, BytesMut};
use linkscope_core::{Error, MacAddr, Result};
use linkscope_packet::ByteReader;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Largest value the 9-bit TLV length can carry
pub const LLDP_MAX_TLV_LEN: usize = 0x1FF;

/// Default TTL (seconds)
pub const LLDP_TTL_DEFAULT: u16 = 120;

/// LLDP TLV Types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LldpTlvType {
    EndOfLldpdu,
    ChassisId,
    PortId,
    Ttl,
    PortDescription,
    SystemName,
    SystemDescription,
    SystemCapabilities,
    ManagementAddress,
    OrganizationallySpecific,
    Reserved(u8),
}

impl LldpTlvType {
    pub fn code(self) -> u8 {
        match self {
            LldpTlvType::EndOfLldpdu => 0,
            LldpTlvType::ChassisId => 1,
            LldpTlvType::PortId => 2,
            LldpTlvType::Ttl => 3,
            LldpTlvType::PortDescription => 4,
            LldpTlvType::SystemName => 5,
            LldpTlvType::SystemDescription => 6,
            LldpTlvType::SystemCapabilities => 7,
            LldpTlvType::ManagementAddress => 8,
            LldpTlvType::OrganizationallySpecific => 127,
            LldpTlvType::Reserved(code) => code,
        }
    }
}

impl From<u8> for LldpTlvType {
    fn from(value: u8) -> Self {
        match value {
            0 => LldpTlvType::EndOfLldpdu,
            1 => LldpTlvType::ChassisId,
            2 => LldpTlvType::PortId,
            3 => LldpTlvType::Ttl,
            4 => LldpTlvType::PortDescription,
            5 => LldpTlvType::SystemName,
            6 => LldpTlvType::SystemDescription,
            7 => LldpTlvType::SystemCapabilities,
            8 => LldpTlvType::ManagementAddress,
            127 => LldpTlvType::OrganizationallySpecific,
            other => LldpTlvType::Reserved(other),
        }
    }
}

/// Chassis ID Subtypes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ChassisIdSubtype {
    ChassisComponent = 1,
    InterfaceAlias = 2,
    PortComponent = 3,
    MacAddress = 4,
    NetworkAddress = 5,
    InterfaceName = 6,
    LocallyAssigned = 7,
}

/// Port ID Subtypes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PortIdSubtype {
    InterfaceAlias = 1,
    PortComponent = 2,
    MacAddress = 3,
    NetworkAddress = 4,
    InterfaceName = 5,
    AgentCircuitId = 6,
    LocallyAssigned = 7,
}

/// IANA address family numbers used by network-address subtypes
pub const ADDRESS_FAMILY_IPV4: u8 = 1;
pub const ADDRESS_FAMILY_IPV6: u8 = 2;

/// Interface numbering subtype: ifIndex
pub const IF_NUMBERING_IFINDEX: u8 = 2;

/// LLDP TLV (Type-Length-Value)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LldpTlv {
    pub tlv_type: LldpTlvType,
    pub value: Vec<u8>,
}

impl LldpTlv {
    pub fn new(tlv_type: LldpTlvType, value: Vec<u8>) -> Self {
        Self { tlv_type, value }
    }

    pub fn chassis_id_mac(mac: MacAddr) -> Self {
        let mut value = Vec::with_capacity(7);
        value.push(ChassisIdSubtype::MacAddress as u8);
        value.extend_from_slice(mac.as_bytes());
        Self::new(LldpTlvType::ChassisId, value)
    }

    pub fn port_id_interface(name: &str) -> Self {
        let mut value = Vec::with_capacity(name.len() + 1);
        value.push(PortIdSubtype::InterfaceName as u8);
        value.extend_from_slice(name.as_bytes());
        Self::new(LldpTlvType::PortId, value)
    }

    pub fn ttl(seconds: u16) -> Self {
        Self::new(LldpTlvType::Ttl, seconds.to_be_bytes().to_vec())
    }

    pub fn port_description(desc: &str) -> Self {
        Self::new(LldpTlvType::PortDescription, desc.as_bytes().to_vec())
    }

    pub fn system_name(name: &str) -> Self {
        Self::new(LldpTlvType::SystemName, name.as_bytes().to_vec())
    }

    pub fn system_description(desc: &str) -> Self {
        Self::new(LldpTlvType::SystemDescription, desc.as_bytes().to_vec())
    }

    pub fn system_capabilities(capabilities: u16, enabled: u16) -> Self {
        let mut value = Vec::with_capacity(4);
        value.extend_from_slice(&capabilities.to_be_bytes());
        value.extend_from_slice(&enabled.to_be_bytes());
        Self::new(LldpTlvType::SystemCapabilities, value)
    }

    /// Management address TLV for an IPv4 address, numbered as ifIndex 1
    pub fn management_address_ipv4(addr: Ipv4Addr) -> Self {
        let mut value = Vec::with_capacity(12);
        value.push(5); // address string length: subtype + 4 octets
        value.push(ADDRESS_FAMILY_IPV4);
        value.extend_from_slice(&addr.octets());
        value.push(IF_NUMBERING_IFINDEX);
        value.extend_from_slice(&1u32.to_be_bytes());
        value.push(0); // OID length
        Self::new(LldpTlvType::ManagementAddress, value)
    }

    pub fn end_of_lldpdu() -> Self {
        Self::new(LldpTlvType::EndOfLldpdu, vec![])
    }

    /// Encode the TLV; values longer than 511 bytes are truncated
    pub fn encode(&self, buffer: &mut BytesMut) {
        let len = self.value.len().min(LLDP_MAX_TLV_LEN);
        let type_length = ((self.tlv_type.code() as u16) << 9) | len as u16;
        buffer.put_u16(type_length);
        buffer.put_slice(&self.value[..len]);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = BytesMut::with_capacity(2 + self.value.len());
        self.encode(&mut buffer);
        buffer.to_vec()
    }

    /// Read one TLV from the cursor
    pub fn read(reader: &mut ByteReader<'_>) -> Result<Self> {
        let type_length = reader.read_u16()?;
        let tlv_type = LldpTlvType::from((type_length >> 9) as u8);
        let length = (type_length & 0x1FF) as usize;
        let value = reader.read_bytes(length)?;
        Ok(Self::new(tlv_type, value.to_vec()))
    }
}

/// LLDP Packet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LldpPacket {
    /// TLVs before the End-of-LLDPDU marker (which is not stored)
    pub tlvs: Vec<LldpTlv>,
}

impl LldpPacket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tlv(mut self, tlv: LldpTlv) -> Self {
        self.tlvs.push(tlv);
        self
    }

    /// Encode the TLVs followed by End-of-LLDPDU
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = BytesMut::with_capacity(128);
        for tlv in &self.tlvs {
            tlv.encode(&mut buffer);
        }
        LldpTlv::end_of_lldpdu().encode(&mut buffer);
        buffer.to_vec()
    }

    /// Parse TLVs up to End-of-LLDPDU; bytes after it are padding
    ///
    /// Running out of data before the end marker is malformed. An End TLV
    /// with a non-zero length is malformed.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data);
        let mut tlvs = Vec::new();

        while !reader.is_empty() {
            let tlv = LldpTlv::read(&mut reader)?;
            if tlv.tlv_type == LldpTlvType::EndOfLldpdu {
                if !tlv.value.is_empty() {
                    return Err(Error::malformed(format!(
                        "End-of-LLDPDU TLV with length {}",
                        tlv.value.len()
                    )));
                }
                return Ok(LldpPacket { tlvs });
            }
            tlvs.push(tlv);
        }

        Err(Error::malformed("LLDPDU ended without End-of-LLDPDU TLV"))
    }

    pub fn find(&self, tlv_type: LldpTlvType) -> Option<&LldpTlv> {
        self.tlvs.iter().find(|tlv| tlv.tlv_type == tlv_type)
    }
}

/// Address carried in a management address TLV
///
/// Only the address is returned; interface numbering and OID are validated
/// for length and discarded. Address families other than IPv4/IPv6 yield `None`.
pub fn parse_management_address(value: &[u8]) -> Result<Option<IpAddr>> {
    let mut reader = ByteReader::new(value);
    let addr_str_len = reader.read_u8()? as usize;
    if addr_str_len == 0 {
        return Err(Error::malformed("management address string length 0"));
    }
    let subtype = reader.read_u8()?;
    let addr = reader.read_bytes(addr_str_len - 1)?;
    let _if_subtype = reader.read_u8()?;
    let _if_number = reader.read_u32()?;
    let oid_len = reader.read_u8()? as usize;
    reader.skip(oid_len)?;

    Ok(network_address(subtype, addr))
}

/// Interpret an IANA family + address pair
pub fn network_address(family: u8, addr: &[u8]) -> Option<IpAddr> {
    match family {
        ADDRESS_FAMILY_IPV4 => {
            let octets: [u8; 4] = addr.try_into().ok()?;
            Some(IpAddr::V4(Ipv4Addr::from(octets)))
        }
        ADDRESS_FAMILY_IPV6 => {
            let octets: [u8; 16] = addr.try_into().ok()?;
            Some(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tlv_encoding() {
        let tlv = LldpTlv::system_name("TestRouter");
        let bytes = tlv.to_bytes();

        // Type 5 (SystemName), length 10
        assert_eq!(bytes[0], 0x0A);
        assert_eq!(bytes[1], 0x0A);
        assert_eq!(&bytes[2..], b"TestRouter");
    }

    #[test]
    fn test_tlv_length_uses_ninth_bit() {
        let tlv = LldpTlv::system_description(&"x".repeat(300));
        let bytes = tlv.to_bytes();
        assert_eq!(u16::from_be_bytes([bytes[0], bytes[1]]), (6 << 9) | 300);
        assert_eq!(bytes.len(), 302);
    }

    #[test]
    fn test_tlv_length_is_clamped() {
        let tlv = LldpTlv::system_description(&"y".repeat(600));
        let bytes = tlv.to_bytes();
        assert_eq!(u16::from_be_bytes([bytes[0], bytes[1]]) & 0x1FF, 511);
        assert_eq!(bytes.len(), 2 + 511);

        let parsed = LldpTlv::read(&mut ByteReader::new(&bytes)).unwrap();
        assert_eq!(parsed.value.len(), 511);
    }

    #[test]
    fn test_packet_roundtrip() {
        let mac = MacAddr::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        let packet = LldpPacket::new()
            .add_tlv(LldpTlv::chassis_id_mac(mac))
            .add_tlv(LldpTlv::port_id_interface("eth0"))
            .add_tlv(LldpTlv::ttl(120));

        let bytes = packet.to_bytes();
        assert_eq!(&bytes[bytes.len() - 2..], &[0x00, 0x00]);

        let parsed = LldpPacket::parse(&bytes).unwrap();
        assert_eq!(parsed, packet);
        assert_eq!(
            parsed.find(LldpTlvType::Ttl).map(|t| t.value.clone()),
            Some(vec![0x00, 0x78])
        );
    }

    #[test]
    fn test_padding_after_end_is_ignored() {
        let mut bytes = LldpPacket::new().add_tlv(LldpTlv::ttl(30)).to_bytes();
        bytes.extend_from_slice(&[0u8; 20]);
        assert_eq!(LldpPacket::parse(&bytes).unwrap().tlvs.len(), 1);
    }

    #[test]
    fn test_parse_requires_end() {
        let bytes = LldpTlv::ttl(30).to_bytes();
        assert!(LldpPacket::parse(&bytes).unwrap_err().is_malformed());
        assert!(LldpPacket::parse(&[]).unwrap_err().is_malformed());

        // End TLV with a length
        assert!(LldpPacket::parse(&[0x00, 0x01, 0xFF]).unwrap_err().is_malformed());
    }

    #[test]
    fn test_management_address() {
        let tlv = LldpTlv::management_address_ipv4(Ipv4Addr::new(192, 0, 2, 7));
        assert_eq!(
            tlv.value,
            vec![0x05, 0x01, 192, 0, 2, 7, 0x02, 0x00, 0x00, 0x00, 0x01, 0x00]
        );
        assert_eq!(
            parse_management_address(&tlv.value).unwrap(),
            Some(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 7)))
        );

        let mut v6 = vec![17, ADDRESS_FAMILY_IPV6];
        v6.extend_from_slice(&"fe80::1".parse::<Ipv6Addr>().unwrap().octets());
        v6.extend_from_slice(&[0x02, 0x00, 0x00, 0x00, 0x03, 0x00]);
        assert_eq!(
            parse_management_address(&v6).unwrap(),
            Some("fe80::1".parse().unwrap())
        );

        // truncated before the OID length
        assert!(parse_management_address(&tlv.value[..11]).is_err());
        assert!(parse_management_address(&[0x00]).is_err());
    }
}
