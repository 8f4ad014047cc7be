//! Normalized neighbor model shared by both discovery codecs and the store

use crate::{MacAddr, ProtocolKind};
use std::collections::BTreeSet;
use std::fmt;
use std::net::IpAddr;
use std::time::SystemTime;

/// Network role advertised by a neighbor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    Router,
    Bridge,
    Switch,
    Station,
    Phone,
    AccessPoint,
    Repeater,
    Other,
}

impl Capability {
    /// Every capability in display order
    pub const ALL: [Capability; 8] = [
        Capability::Router,
        Capability::Bridge,
        Capability::Switch,
        Capability::Station,
        Capability::Phone,
        Capability::AccessPoint,
        Capability::Repeater,
        Capability::Other,
    ];

    /// Parse a configured capability name (case-insensitive, common aliases accepted)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "router" => Some(Capability::Router),
            "bridge" => Some(Capability::Bridge),
            "switch" => Some(Capability::Switch),
            "station" | "host" => Some(Capability::Station),
            "phone" | "telephone" => Some(Capability::Phone),
            "access-point" | "accesspoint" | "ap" | "wlan" => Some(Capability::AccessPoint),
            "repeater" => Some(Capability::Repeater),
            "other" => Some(Capability::Other),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Capability::Router => "router",
            Capability::Bridge => "bridge",
            Capability::Switch => "switch",
            Capability::Station => "station",
            Capability::Phone => "phone",
            Capability::AccessPoint => "access-point",
            Capability::Repeater => "repeater",
            Capability::Other => "other",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which protocols have reported a neighbor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProtocolSeen {
    pub cdp: bool,
    pub lldp: bool,
}

impl ProtocolSeen {
    /// Flags for a record produced by a single protocol
    pub fn from_kind(kind: ProtocolKind) -> Self {
        match kind {
            ProtocolKind::Cdp => Self { cdp: true, lldp: false },
            ProtocolKind::Lldp => Self { cdp: false, lldp: true },
        }
    }

    pub fn merge(&mut self, other: ProtocolSeen) {
        self.cdp |= other.cdp;
        self.lldp |= other.lldp;
    }

    pub fn presence(self) -> ProtocolPresence {
        ProtocolPresence::combine(self.cdp, self.lldp)
    }
}

/// Derived view of [`ProtocolSeen`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolPresence {
    None,
    Cdp,
    Lldp,
    Both,
}

impl ProtocolPresence {
    pub fn combine(seen_cdp: bool, seen_lldp: bool) -> Self {
        match (seen_cdp, seen_lldp) {
            (true, true) => ProtocolPresence::Both,
            (true, false) => ProtocolPresence::Cdp,
            (false, true) => ProtocolPresence::Lldp,
            (false, false) => ProtocolPresence::None,
        }
    }
}

impl fmt::Display for ProtocolPresence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolPresence::None => write!(f, "-"),
            ProtocolPresence::Cdp => write!(f, "CDP"),
            ProtocolPresence::Lldp => write!(f, "LLDP"),
            ProtocolPresence::Both => write!(f, "CDP+LLDP"),
        }
    }
}

/// Normalized result of decoding a CDP or LLDP frame
///
/// Free-text fields are empty strings when the protocol did not carry them.
/// `is_stale` and `is_new` are owned by the neighbor store.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborRecord {
    /// Chassis / device identifier
    pub id: String,
    pub hostname: String,
    pub port_id: String,
    pub port_description: String,
    pub platform: String,
    pub description: String,
    pub location: String,
    pub management_ip: Option<IpAddr>,
    pub capabilities: BTreeSet<Capability>,
    pub protocol_seen: ProtocolSeen,
    /// Hold time advertised by the neighbor, in seconds
    pub ttl_secs: u16,
    pub source_mac: Option<MacAddr>,
    /// Name of the capture interface
    pub interface: String,
    pub first_seen: SystemTime,
    pub last_seen: SystemTime,
    pub is_stale: bool,
    pub is_new: bool,
}

impl NeighborRecord {
    /// Empty record attributed to one protocol, observed at `seen`
    pub fn new(kind: ProtocolKind, seen: SystemTime) -> Self {
        Self {
            id: String::new(),
            hostname: String::new(),
            port_id: String::new(),
            port_description: String::new(),
            platform: String::new(),
            description: String::new(),
            location: String::new(),
            management_ip: None,
            capabilities: BTreeSet::new(),
            protocol_seen: ProtocolSeen::from_kind(kind),
            ttl_secs: 0,
            source_mac: None,
            interface: String::new(),
            first_seen: seen,
            last_seen: seen,
            is_stale: false,
            is_new: false,
        }
    }

    pub fn protocol(&self) -> ProtocolPresence {
        self.protocol_seen.presence()
    }

    /// Store identity: `interface:mac`, else `interface:id`, else `interface:unknown`
    pub fn key(&self) -> String {
        let key = if let Some(mac) = self.source_mac {
            format!("{}:{}", self.interface, mac)
        } else if !self.id.is_empty() {
            format!("{}:{}", self.interface, self.id)
        } else {
            format!("{}:unknown", self.interface)
        };
        key.to_lowercase()
    }

    /// Hostname if known, otherwise the device identifier
    pub fn display_name(&self) -> &str {
        if self.hostname.is_empty() {
            &self.id
        } else {
            &self.hostname
        }
    }

    /// Fold a newer observation of the same neighbor into this record
    ///
    /// Non-empty incoming fields win; empty ones never erase known values.
    pub fn merge_from(&mut self, incoming: &NeighborRecord) {
        merge_text(&mut self.id, &incoming.id);
        merge_text(&mut self.hostname, &incoming.hostname);
        merge_text(&mut self.port_id, &incoming.port_id);
        merge_text(&mut self.port_description, &incoming.port_description);
        merge_text(&mut self.platform, &incoming.platform);
        merge_text(&mut self.description, &incoming.description);
        merge_text(&mut self.location, &incoming.location);

        if incoming.management_ip.is_some() {
            self.management_ip = incoming.management_ip;
        }
        if incoming.source_mac.is_some() {
            self.source_mac = incoming.source_mac;
        }
        if incoming.ttl_secs != 0 {
            self.ttl_secs = incoming.ttl_secs;
        }

        self.capabilities
            .extend(incoming.capabilities.iter().copied());
        self.protocol_seen.merge(incoming.protocol_seen);
        self.last_seen = incoming.last_seen;
        self.is_stale = false;
    }

    pub fn capabilities_string(&self) -> String {
        self.capabilities
            .iter()
            .map(|c| c.name())
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn merge_text(current: &mut String, incoming: &str) {
    if !incoming.is_empty() {
        current.clear();
        current.push_str(incoming);
    }
}
