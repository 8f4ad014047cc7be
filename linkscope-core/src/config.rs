//! Discovery identity and timing configuration

use crate::MacAddr;
use std::time::Duration;

/// Shortest interval the broadcaster will ever tick at
pub const MIN_ADVERTISE_INTERVAL: Duration = Duration::from_secs(1);

/// Default system description when none is configured
pub const DEFAULT_SYSTEM_DESCRIPTION: &str = "linkscope network discovery";

/// Identity and schedule for advertising and sweeping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    pub system_name: String,
    pub system_description: String,
    /// Capability names (see [`crate::Capability::from_name`])
    pub capabilities: Vec<String>,
    pub advertise_interval_secs: u64,
    pub ttl_secs: u16,
    pub cdp_broadcast: bool,
    pub lldp_broadcast: bool,
    /// Mark neighbors stale after this many seconds of silence (0 = never)
    pub staleness_timeout_secs: u64,
    /// Remove neighbors after this many seconds of silence (0 = never)
    pub stale_removal_secs: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            system_name: String::new(),
            system_description: String::new(),
            capabilities: vec!["station".to_string()],
            advertise_interval_secs: 30,
            ttl_secs: 120,
            cdp_broadcast: false,
            lldp_broadcast: false,
            staleness_timeout_secs: 180,
            stale_removal_secs: 0,
        }
    }
}

impl DiscoveryConfig {
    /// Advertise interval, never shorter than [`MIN_ADVERTISE_INTERVAL`]
    pub fn advertise_interval(&self) -> Duration {
        Duration::from_secs(self.advertise_interval_secs).max(MIN_ADVERTISE_INTERVAL)
    }

    pub fn staleness_threshold(&self) -> Duration {
        Duration::from_secs(self.staleness_timeout_secs)
    }

    pub fn removal_threshold(&self) -> Duration {
        Duration::from_secs(self.stale_removal_secs)
    }

    /// True when at least one protocol is advertised
    pub fn broadcasting(&self) -> bool {
        self.cdp_broadcast || self.lldp_broadcast
    }

    /// What the codecs put on the wire
    pub fn advertisement(&self) -> Advertisement {
        Advertisement {
            system_name: self.system_name.clone(),
            system_description: self.system_description.clone(),
            capabilities: self.capabilities.clone(),
            ttl_secs: self.ttl_secs,
        }
    }
}

/// Codec input for an outbound discovery frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advertisement {
    pub system_name: String,
    pub system_description: String,
    pub capabilities: Vec<String>,
    pub ttl_secs: u16,
}

impl Advertisement {
    /// Configured description, or the built-in default when empty
    pub fn description_or_default(&self) -> &str {
        if self.system_description.is_empty() {
            DEFAULT_SYSTEM_DESCRIPTION
        } else {
            &self.system_description
        }
    }

    /// Advertised system name, or the interface MAC string when unnamed
    pub fn name_or_mac(&self, mac: MacAddr) -> String {
        if self.system_name.is_empty() {
            mac.to_string()
        } else {
            self.system_name.clone()
        }
    }
}

impl Default for Advertisement {
    fn default() -> Self {
        DiscoveryConfig::default().advertisement()
    }
}
