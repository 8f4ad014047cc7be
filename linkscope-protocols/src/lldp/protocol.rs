//! LLDP codec

use linkscope_core::{
    Advertisement, Capability, Error, InterfaceDescriptor, MacAddr, NeighborRecord, Packet,
    Protocol, ProtocolKind, Result,
};
use linkscope_packet::{ByteReader, EtherType, EthernetFrame};
use std::net::IpAddr;
use std::time::SystemTime;
use tracing::trace;

use super::packet::{
    network_address, parse_management_address, ChassisIdSubtype, LldpPacket, LldpTlv,
    LldpTlvType, PortIdSubtype,
};
use crate::capability::{lldp_bits_from_names, lldp_bits_to_capabilities};
use crate::text::{clean_text, is_printable};

/// IEEE 802.1AB Link Layer Discovery Protocol codec
#[derive(Debug, Clone, Copy, Default)]
pub struct LldpProtocol;

impl LldpProtocol {
    pub fn new() -> Self {
        Self
    }

    /// Decode an LLDPDU (Ethernet header already stripped) observed at `seen`
    ///
    /// Chassis ID, port ID and TTL must all be present. A PDU without a
    /// capabilities TLV is reported as a switch.
    pub fn decode_payload(payload: &[u8], seen: SystemTime) -> Result<NeighborRecord> {
        let pdu = LldpPacket::parse(payload)?;
        let mut record = NeighborRecord::new(ProtocolKind::Lldp, seen);

        let mut chassis_id = None;
        let mut port_id = None;
        let mut ttl = None;
        let mut enabled_caps = None;
        let mut mgmt_v6 = None;

        for tlv in &pdu.tlvs {
            let value = tlv.value.as_slice();
            match tlv.tlv_type {
                LldpTlvType::ChassisId => chassis_id = Some(render_chassis_id(value)?),
                LldpTlvType::PortId => port_id = Some(render_port_id(value)?),
                LldpTlvType::Ttl => ttl = Some(ByteReader::new(value).read_u16()?),
                LldpTlvType::PortDescription => record.port_description = clean_text(value),
                LldpTlvType::SystemName => record.hostname = clean_text(value),
                LldpTlvType::SystemDescription => record.description = clean_text(value),
                LldpTlvType::SystemCapabilities => {
                    let mut reader = ByteReader::new(value);
                    let _system = reader.read_u16()?;
                    enabled_caps = Some(reader.read_u16()?);
                }
                LldpTlvType::ManagementAddress => match parse_management_address(value)? {
                    Some(ip @ IpAddr::V4(_)) => {
                        record.management_ip.get_or_insert(ip);
                    }
                    Some(ip @ IpAddr::V6(_)) => {
                        mgmt_v6.get_or_insert(ip);
                    }
                    None => {}
                },
                LldpTlvType::OrganizationallySpecific
                | LldpTlvType::Reserved(_)
                | LldpTlvType::EndOfLldpdu => {
                    trace!(
                        tlv_type = tlv.tlv_type.code(),
                        value = %hex::encode(value),
                        "skipping LLDP TLV"
                    );
                }
            }
        }

        record.id = chassis_id.ok_or_else(|| Error::malformed("LLDPDU without chassis ID"))?;
        record.port_id = port_id.ok_or_else(|| Error::malformed("LLDPDU without port ID"))?;
        record.ttl_secs = ttl.ok_or_else(|| Error::malformed("LLDPDU without TTL"))?;
        record.capabilities = match enabled_caps {
            Some(bits) => lldp_bits_to_capabilities(bits),
            None => [Capability::Switch].into_iter().collect(),
        };
        if record.management_ip.is_none() {
            record.management_ip = mgmt_v6;
        }

        Ok(record)
    }

    /// Build the LLDPDU for `adv` (no Ethernet header)
    pub fn build_payload(adv: &Advertisement, iface: &InterfaceDescriptor) -> Vec<u8> {
        let bits = lldp_bits_from_names(&adv.capabilities);

        let mut pdu = LldpPacket::new()
            .add_tlv(LldpTlv::chassis_id_mac(iface.mac_address))
            .add_tlv(LldpTlv::port_id_interface(&iface.name))
            .add_tlv(LldpTlv::ttl(adv.ttl_secs))
            .add_tlv(LldpTlv::port_description(&iface.name))
            .add_tlv(LldpTlv::system_name(&adv.name_or_mac(iface.mac_address)))
            .add_tlv(LldpTlv::system_description(adv.description_or_default()))
            .add_tlv(LldpTlv::system_capabilities(bits, bits));

        if let Some(ip) = iface.first_ipv4() {
            pdu = pdu.add_tlv(LldpTlv::management_address_ipv4(ip));
        }

        pdu.to_bytes()
    }
}

/// Render a chassis ID value (subtype byte + ID)
fn render_chassis_id(value: &[u8]) -> Result<String> {
    let (&subtype, id) = value
        .split_first()
        .ok_or_else(|| Error::malformed("empty chassis ID TLV"))?;
    Ok(render_id(
        subtype == ChassisIdSubtype::MacAddress as u8,
        subtype == ChassisIdSubtype::NetworkAddress as u8,
        id,
    ))
}

/// Render a port ID value (subtype byte + ID)
fn render_port_id(value: &[u8]) -> Result<String> {
    let (&subtype, id) = value
        .split_first()
        .ok_or_else(|| Error::malformed("empty port ID TLV"))?;
    Ok(render_id(
        subtype == PortIdSubtype::MacAddress as u8,
        subtype == PortIdSubtype::NetworkAddress as u8,
        id,
    ))
}

fn render_id(is_mac: bool, is_network: bool, id: &[u8]) -> String {
    if is_mac {
        if let Some(mac) = MacAddr::from_slice(id) {
            return mac.to_string();
        }
    }
    if is_network {
        if let Some((&family, addr)) = id.split_first() {
            if let Some(ip) = network_address(family, addr) {
                return ip.to_string();
            }
        }
    }
    if is_printable(id) {
        clean_text(id)
    } else {
        hex::encode(id)
    }
}

impl Protocol for LldpProtocol {
    fn name(&self) -> &'static str {
        "Link Layer Discovery Protocol"
    }

    fn shortname(&self) -> &'static str {
        "lldp"
    }

    fn kind(&self) -> ProtocolKind {
        ProtocolKind::Lldp
    }

    fn decode_frame(&self, packet: &Packet) -> Result<NeighborRecord> {
        let frame = EthernetFrame::from_bytes(packet.data())?;
        if frame.destination != MacAddr::LLDP_MULTICAST {
            return Err(Error::not_discovery(format!(
                "destination {} is not the LLDP address",
                frame.destination
            )));
        }
        if frame.ethertype != EtherType::Lldp {
            return Err(Error::not_discovery(format!(
                "EtherType {} on the LLDP address",
                frame.ethertype
            )));
        }

        let mut record = Self::decode_payload(&frame.payload, packet.timestamp)?;
        record.source_mac = Some(frame.source);
        record.interface = packet.interface.clone();
        if record.id.is_empty() {
            record.id = frame.source.to_string();
        }
        Ok(record)
    }

    fn build_frame(&self, adv: &Advertisement, iface: &InterfaceDescriptor) -> Result<Vec<u8>> {
        EthernetFrame::new(
            MacAddr::LLDP_MULTICAST,
            iface.mac_address,
            EtherType::Lldp,
            Self::build_payload(adv, iface),
        )
        .to_bytes()
    }
}
