//! Network interface descriptor

use crate::MacAddr;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// What the codecs need to know about the local interface when building frames
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDescriptor {
    /// Interface name (e.g., "eth0", "en0")
    pub name: String,
    /// OS interface index
    pub index: u32,
    /// Hardware address
    pub mac_address: MacAddr,
    /// IPv4 addresses assigned to the interface
    pub ipv4_addresses: Vec<Ipv4Addr>,
    /// IPv6 addresses assigned to the interface
    pub ipv6_addresses: Vec<Ipv6Addr>,
}

impl InterfaceDescriptor {
    /// Create a descriptor without any addresses
    pub fn new(name: impl Into<String>, index: u32, mac_address: MacAddr) -> Self {
        Self {
            name: name.into(),
            index,
            mac_address,
            ipv4_addresses: Vec::new(),
            ipv6_addresses: Vec::new(),
        }
    }

    pub fn with_ipv4(mut self, addr: Ipv4Addr) -> Self {
        self.ipv4_addresses.push(addr);
        self
    }

    pub fn with_ipv6(mut self, addr: Ipv6Addr) -> Self {
        self.ipv6_addresses.push(addr);
        self
    }

    /// First IPv4 address, used as the advertised management address
    pub fn first_ipv4(&self) -> Option<Ipv4Addr> {
        self.ipv4_addresses.first().copied()
    }
}

impl fmt::Display for InterfaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.mac_address)?;
        if let Some(ip) = self.first_ipv4() {
            write!(f, " {}", ip)?;
        }
        Ok(())
    }
}
