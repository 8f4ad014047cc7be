//! Neighbor events to the log

use linkscope_core::NeighborRecord;
use linkscope_engine::NeighborObserver;
use tracing::{debug, info};

/// Logs new neighbors at info and refreshes at debug
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl NeighborObserver for LoggingObserver {
    fn on_new(&self, record: &NeighborRecord) {
        info!(
            interface = %record.interface,
            neighbor = %record.display_name(),
            port = %record.port_id,
            protocol = %record.protocol(),
            "New neighbor"
        );
    }

    fn on_updated(&self, record: &NeighborRecord) {
        debug!(
            interface = %record.interface,
            neighbor = %record.display_name(),
            protocol = %record.protocol(),
            "Neighbor refreshed"
        );
    }
}
