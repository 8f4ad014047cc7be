//! Common types used throughout linkscope

use std::fmt;
use std::str::FromStr;

/// MAC Address (6 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// CDP multicast address (01:00:0c:cc:cc:cc)
    pub const CDP_MULTICAST: MacAddr = MacAddr([0x01, 0x00, 0x0C, 0xCC, 0xCC, 0xCC]);

    /// LLDP nearest-bridge multicast address (01:80:c2:00:00:0e)
    pub const LLDP_MULTICAST: MacAddr = MacAddr([0x01, 0x80, 0xC2, 0x00, 0x00, 0x0E]);

    /// Create a new MAC address
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Zero MAC address (00:00:00:00:00:00)
    pub const fn zero() -> Self {
        Self([0x00; 6])
    }

    /// Create a MAC address from a slice of exactly six bytes
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; 6] = slice.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Get bytes as slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Convert to array
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 6]
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl FromStr for MacAddr {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split([':', '-']).collect();
        if parts.len() != 6 {
            return Err(crate::Error::invalid_parameter("mac", "expected six octets"));
        }

        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            bytes[i] = u8::from_str_radix(part, 16)
                .map_err(|_| crate::Error::invalid_parameter("mac", "invalid hex octet"))?;
        }

        Ok(MacAddr(bytes))
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(bytes: [u8; 6]) -> Self {
        MacAddr(bytes)
    }
}

/// The two link-layer discovery protocols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolKind {
    /// Cisco Discovery Protocol
    Cdp,
    /// IEEE 802.1AB Link Layer Discovery Protocol
    Lldp,
}

impl ProtocolKind {
    /// Destination address the protocol is multicast to
    pub fn multicast_mac(self) -> MacAddr {
        match self {
            ProtocolKind::Cdp => MacAddr::CDP_MULTICAST,
            ProtocolKind::Lldp => MacAddr::LLDP_MULTICAST,
        }
    }
}

impl fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolKind::Cdp => write!(f, "CDP"),
            ProtocolKind::Lldp => write!(f, "LLDP"),
        }
    }
}

/// Protocol-specific constants
pub mod protocol_constants {
    /// CDP uses LLC/SNAP with OUI 00-00-0C and type 0x2000
    pub const CDP_LLC_DSAP: u8 = 0xAA;
    pub const CDP_LLC_SSAP: u8 = 0xAA;
    pub const CDP_LLC_CONTROL: u8 = 0x03;
    pub const CDP_SNAP_OUI: [u8; 3] = [0x00, 0x00, 0x0C];
    pub const CDP_SNAP_TYPE: u16 = 0x2000;

    /// LLDP ethertype
    pub const LLDP_ETHERTYPE: u16 = 0x88CC;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_display_is_lowercase() {
        let mac = MacAddr::new([0x00, 0x1E, 0x14, 0xAB, 0xCD, 0xEF]);
        assert_eq!(mac.to_string(), "00:1e:14:ab:cd:ef");
    }

    #[test]
    fn test_mac_parse() {
        let mac: MacAddr = "00:1E:14:ab:cd:ef".parse().unwrap();
        assert_eq!(mac.octets(), [0x00, 0x1E, 0x14, 0xAB, 0xCD, 0xEF]);

        let dashed: MacAddr = "00-1e-14-ab-cd-ef".parse().unwrap();
        assert_eq!(mac, dashed);

        assert!("00:11:22".parse::<MacAddr>().is_err());
        assert!("zz:11:22:33:44:55".parse::<MacAddr>().is_err());
    }

    #[test]
    fn test_mac_from_slice() {
        assert!(MacAddr::from_slice(&[1, 2, 3]).is_none());
        assert_eq!(
            MacAddr::from_slice(&[1, 2, 3, 4, 5, 6]),
            Some(MacAddr::new([1, 2, 3, 4, 5, 6]))
        );
    }

    #[test]
    fn test_protocol_multicast() {
        assert_eq!(ProtocolKind::Cdp.multicast_mac(), MacAddr::CDP_MULTICAST);
        assert_eq!(ProtocolKind::Lldp.multicast_mac(), MacAddr::LLDP_MULTICAST);
        assert_eq!(ProtocolKind::Lldp.to_string(), "LLDP");
    }
}
