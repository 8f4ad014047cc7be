//! CLI argument parsing

use clap::{Args, Parser, Subcommand};
use linkscope_core::{Capability, DiscoveryConfig};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "linkscope")]
#[command(version, about = "CDP/LLDP neighbor discovery", long_about = None)]
pub struct Cli {
    /// Verbose output (-v, -vv, -vvv for increasing verbosity)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List network interfaces
    Interfaces {
        /// Include loopback and down interfaces
        #[arg(short, long)]
        all: bool,
    },

    /// Listen for neighbors and optionally advertise this host
    Watch(WatchArgs),
}

#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    /// Interface to listen on (default: first usable interface)
    #[arg(short = 'I', long)]
    pub interface: Option<String>,

    /// Advertise this host with CDP
    #[arg(long)]
    pub cdp: bool,

    /// Advertise this host with LLDP
    #[arg(long)]
    pub lldp: bool,

    /// System name to advertise
    #[arg(short = 'n', long)]
    pub system_name: Option<String>,

    /// System description to advertise
    #[arg(short = 'd', long)]
    pub system_description: Option<String>,

    /// Capabilities to advertise (router, bridge, switch, station, phone, access-point, repeater, other)
    #[arg(
        short = 'c',
        long,
        value_delimiter = ',',
        default_value = "station",
        value_parser = parse_capability
    )]
    pub capabilities: Vec<String>,

    /// Seconds between advertisements
    #[arg(long, value_name = "SECONDS", default_value = "30")]
    pub interval: u64,

    /// Hold time advertised to neighbors
    #[arg(long, value_name = "SECONDS", default_value = "120")]
    pub ttl: u16,

    /// Mark neighbors stale after this much silence (0 = never)
    #[arg(long, value_name = "SECONDS", default_value = "180")]
    pub stale_after: u64,

    /// Forget neighbors after this much silence (0 = never)
    #[arg(long, value_name = "SECONDS", default_value = "0")]
    pub remove_after: u64,

    /// Seconds between neighbor table printouts
    #[arg(long, value_name = "SECONDS", default_value = "5")]
    pub refresh: u64,

    /// Do not put the interface into promiscuous mode
    #[arg(long)]
    pub no_promisc: bool,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl WatchArgs {
    pub fn discovery_config(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            system_name: self.system_name.clone().unwrap_or_default(),
            system_description: self.system_description.clone().unwrap_or_default(),
            capabilities: self.capabilities.clone(),
            advertise_interval_secs: self.interval,
            ttl_secs: self.ttl,
            cdp_broadcast: self.cdp,
            lldp_broadcast: self.lldp,
            staleness_timeout_secs: self.stale_after,
            stale_removal_secs: self.remove_after,
        }
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.refresh.max(1))
    }
}

fn parse_capability(name: &str) -> Result<String, String> {
    Capability::from_name(name)
        .map(|cap| cap.name().to_string())
        .ok_or_else(|| format!("unknown capability '{}'", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn watch(args: &[&str]) -> WatchArgs {
        let mut argv = vec!["linkscope", "watch"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Watch(args) => args,
            other => panic!("expected watch, got {:?}", other),
        }
    }

    #[test]
    fn test_watch_defaults_match_config_defaults() {
        let args = watch(&[]);
        assert_eq!(args.discovery_config(), DiscoveryConfig::default());
        assert_eq!(args.refresh_period(), Duration::from_secs(5));
    }

    #[test]
    fn test_watch_flags() {
        let args = watch(&[
            "-I", "eth1", "--cdp", "--lldp", "-n", "lab-host", "-c", "Router,ap",
            "--interval", "10", "--ttl", "60", "--remove-after", "600", "--refresh", "0",
        ]);
        assert_eq!(args.interface.as_deref(), Some("eth1"));

        let config = args.discovery_config();
        assert!(config.cdp_broadcast && config.lldp_broadcast);
        assert_eq!(config.system_name, "lab-host");
        assert_eq!(config.capabilities, vec!["router", "access-point"]);
        assert_eq!(config.advertise_interval_secs, 10);
        assert_eq!(config.ttl_secs, 60);
        assert_eq!(config.stale_removal_secs, 600);
        assert_eq!(args.refresh_period(), Duration::from_secs(1));
    }

    #[test]
    fn test_unknown_capability_is_rejected() {
        assert!(Cli::try_parse_from(["linkscope", "watch", "-c", "toaster"]).is_err());
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["linkscope", "interfaces", "-vv", "--all"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Interfaces { all: true }));
    }
}
