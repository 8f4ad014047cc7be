//! Interface enumeration via pnet

use ipnetwork::IpNetwork;
use linkscope_core::{Error, InterfaceDescriptor, MacAddr, Result};
use pnet_datalink::{self, NetworkInterface};

/// An enumerated interface plus the flags used to pick capture candidates
#[derive(Debug, Clone)]
pub struct InterfaceInfo {
    pub descriptor: InterfaceDescriptor,
    /// Platform description (often empty outside Windows)
    pub description: String,
    pub is_up: bool,
    pub is_loopback: bool,
    pub is_multicast: bool,
}

impl From<&NetworkInterface> for InterfaceInfo {
    fn from(iface: &NetworkInterface) -> Self {
        let mac = iface
            .mac
            .map(|m| MacAddr::new([m.0, m.1, m.2, m.3, m.4, m.5]))
            .unwrap_or_else(MacAddr::zero);

        let mut descriptor = InterfaceDescriptor::new(iface.name.clone(), iface.index, mac);
        for network in &iface.ips {
            match network {
                IpNetwork::V4(v4) => descriptor.ipv4_addresses.push(v4.ip()),
                IpNetwork::V6(v6) => descriptor.ipv6_addresses.push(v6.ip()),
            }
        }

        InterfaceInfo {
            descriptor,
            description: iface.description.clone(),
            is_up: iface.is_up(),
            is_loopback: iface.is_loopback(),
            is_multicast: iface.is_multicast(),
        }
    }
}

impl InterfaceInfo {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Up, not loopback, and with a hardware address to advertise
    pub fn is_capture_capable(&self) -> bool {
        self.is_up && !self.is_loopback && !self.descriptor.mac_address.is_zero()
    }
}

/// List all network interfaces
pub fn list_interfaces() -> Result<Vec<InterfaceInfo>> {
    let interfaces = pnet_datalink::interfaces();

    if interfaces.is_empty() {
        return Err(Error::Interface(
            "No network interfaces found. Are you running with sufficient privileges?".to_string(),
        ));
    }

    Ok(interfaces.iter().map(InterfaceInfo::from).collect())
}

/// Interfaces suitable for capturing and advertising on
pub fn list_capture_interfaces() -> Result<Vec<InterfaceInfo>> {
    Ok(list_interfaces()?
        .into_iter()
        .filter(InterfaceInfo::is_capture_capable)
        .collect())
}

pub fn get_interface(name: &str) -> Result<InterfaceInfo> {
    pnet_datalink::interfaces()
        .iter()
        .find(|iface| iface.name == name)
        .map(InterfaceInfo::from)
        .ok_or_else(|| Error::InterfaceNotFound(name.to_string()))
}

/// First capture-capable interface
pub fn default_interface() -> Result<InterfaceInfo> {
    list_capture_interfaces()?
        .into_iter()
        .next()
        .ok_or_else(|| Error::Interface("No suitable default interface found".to_string()))
}
