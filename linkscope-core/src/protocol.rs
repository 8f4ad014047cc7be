//! Discovery protocol codec trait

use crate::{
    Advertisement, InterfaceDescriptor, MacAddr, NeighborRecord, Packet, ProtocolKind, Result,
};

/// Codec implemented by every discovery protocol
///
/// Implementations are stateless; the same instance is shared between the
/// ingestion pipeline and the broadcaster.
pub trait Protocol: Send + Sync {
    /// Full name of the protocol (e.g., "Cisco Discovery Protocol")
    fn name(&self) -> &'static str;

    /// Short name used in logs and the CLI (e.g., "cdp")
    fn shortname(&self) -> &'static str;

    /// Which of the two discovery protocols this codec speaks
    fn kind(&self) -> ProtocolKind;

    /// Destination address frames of this protocol are sent to
    fn multicast_mac(&self) -> MacAddr {
        self.kind().multicast_mac()
    }

    /// Decode a captured Ethernet frame into a neighbor record
    ///
    /// Returns [`crate::Error::Malformed`] for truncated or inconsistent input
    /// and [`crate::Error::NotDiscovery`] for frames that reached the
    /// protocol's address but carry something else.
    fn decode_frame(&self, packet: &Packet) -> Result<NeighborRecord>;

    /// Build a complete Ethernet frame advertising `adv` on `iface`
    fn build_frame(&self, adv: &Advertisement, iface: &InterfaceDescriptor) -> Result<Vec<u8>>;
}
