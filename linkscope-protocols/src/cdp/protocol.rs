//! CDP codec
//!
//! Maps CDP PDUs to [`NeighborRecord`]s and builds advertisements from an
//! [`Advertisement`] and the local interface.

use linkscope_core::{
    Advertisement, Error, InterfaceDescriptor, MacAddr, NeighborRecord, Packet, Protocol,
    ProtocolKind, Result,
};
use linkscope_packet::{EtherType, EthernetFrame, LlcSnapFrame};
use std::net::IpAddr;
use std::time::SystemTime;
use tracing::trace;

use super::packet::{CdpPacket, CdpTlv};
use crate::capability::{cdp_bits_from_names, cdp_bits_to_capabilities};

/// Platform string advertised in outbound frames
pub const CDP_PLATFORM: &str = "linkscope";

/// Cisco Discovery Protocol codec
#[derive(Debug, Clone, Copy, Default)]
pub struct CdpProtocol;

impl CdpProtocol {
    pub fn new() -> Self {
        Self
    }

    /// Decode a CDP PDU (framing already stripped) observed at `seen`
    ///
    /// `source_mac` and `interface` are left for the caller to fill in.
    pub fn decode_payload(payload: &[u8], seen: SystemTime) -> Result<NeighborRecord> {
        let pdu = CdpPacket::parse(payload)?;
        let mut record = NeighborRecord::new(ProtocolKind::Cdp, seen);
        record.ttl_secs = pdu.ttl as u16;

        let mut system_name = String::new();
        let mut addresses: Vec<IpAddr> = Vec::new();
        let mut mgmt_addresses: Vec<IpAddr> = Vec::new();

        for tlv in pdu.tlvs {
            match tlv {
                CdpTlv::DeviceId(id) => record.id = id,
                CdpTlv::SystemName(name) => system_name = name,
                CdpTlv::PortId(port) => record.port_id = port,
                CdpTlv::Platform(platform) => record.platform = platform,
                CdpTlv::SoftwareVersion(version) => record.description = version,
                CdpTlv::Location(location) => record.location = location,
                CdpTlv::Capabilities(bits) => {
                    record.capabilities = cdp_bits_to_capabilities(bits);
                }
                CdpTlv::Addresses(addrs) => addresses.extend(addrs),
                CdpTlv::ManagementAddresses(addrs) => mgmt_addresses.extend(addrs),
                CdpTlv::NativeVlan(_) | CdpTlv::Duplex(_) => {}
                CdpTlv::Unknown(code, value) => {
                    trace!(tlv_type = code, value = %hex::encode(&value), "skipping CDP TLV");
                }
            }
        }

        record.hostname = if system_name.is_empty() {
            record.id.clone()
        } else {
            system_name
        };
        record.management_ip = pick_management_ip(addresses.iter().chain(mgmt_addresses.iter()));

        Ok(record)
    }

    /// Build the CDP PDU for `adv` (no Ethernet/LLC/SNAP framing)
    pub fn build_payload(adv: &Advertisement, iface: &InterfaceDescriptor) -> Result<Vec<u8>> {
        let ttl = u8::try_from(adv.ttl_secs).unwrap_or(u8::MAX);

        let mut pdu = CdpPacket::new(ttl)
            .add_tlv(CdpTlv::DeviceId(adv.name_or_mac(iface.mac_address)))
            .add_tlv(CdpTlv::PortId(iface.name.clone()))
            .add_tlv(CdpTlv::Capabilities(cdp_bits_from_names(&adv.capabilities)))
            .add_tlv(CdpTlv::Platform(CDP_PLATFORM.to_string()))
            .add_tlv(CdpTlv::SoftwareVersion(
                adv.description_or_default().to_string(),
            ));

        if !iface.ipv4_addresses.is_empty() {
            let addrs = iface.ipv4_addresses.iter().map(|a| IpAddr::V4(*a)).collect();
            pdu = pdu.add_tlv(CdpTlv::Addresses(addrs));
        }

        pdu.build()
    }
}

/// First IPv4 address, else the first address of any family
fn pick_management_ip<'a, I>(addrs: I) -> Option<IpAddr>
where
    I: Iterator<Item = &'a IpAddr> + Clone,
{
    addrs
        .clone()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.clone().next())
        .copied()
}

impl Protocol for CdpProtocol {
    fn name(&self) -> &'static str {
        "Cisco Discovery Protocol"
    }

    fn shortname(&self) -> &'static str {
        "cdp"
    }

    fn kind(&self) -> ProtocolKind {
        ProtocolKind::Cdp
    }

    fn decode_frame(&self, packet: &Packet) -> Result<NeighborRecord> {
        let frame = EthernetFrame::from_bytes(packet.data())?;
        if frame.destination != MacAddr::CDP_MULTICAST {
            return Err(Error::not_discovery(format!(
                "destination {} is not the CDP address",
                frame.destination
            )));
        }
        if frame.ethertype != EtherType::Llc {
            return Err(Error::not_discovery(format!(
                "EtherType {} on the CDP address",
                frame.ethertype
            )));
        }

        let llc = LlcSnapFrame::from_bytes(&frame.payload).ok_or_else(|| {
            Error::malformed(format!(
                "802.3 payload of {} bytes cannot hold LLC/SNAP",
                frame.payload.len()
            ))
        })?;
        if !llc.is_cdp() {
            return Err(Error::not_discovery(format!(
                "SNAP protocol 0x{:04X} is not CDP",
                llc.snap.protocol_id.0
            )));
        }

        let mut record = Self::decode_payload(&llc.payload, packet.timestamp)?;
        record.source_mac = Some(frame.source);
        record.interface = packet.interface.clone();
        if record.id.is_empty() {
            record.id = frame.source.to_string();
        }
        Ok(record)
    }

    fn build_frame(&self, adv: &Advertisement, iface: &InterfaceDescriptor) -> Result<Vec<u8>> {
        let payload = Self::build_payload(adv, iface)?;
        let llc = LlcSnapFrame::cdp(payload);
        EthernetFrame::new(
            MacAddr::CDP_MULTICAST,
            iface.mac_address,
            EtherType::Llc,
            llc.to_bytes(),
        )
        .to_bytes()
    }
}
