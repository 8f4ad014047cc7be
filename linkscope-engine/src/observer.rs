//! Store notifications

use linkscope_core::NeighborRecord;

/// Receives neighbor store events
///
/// Called synchronously on the thread that performed the update (usually the
/// capture thread) after the store lock has been released. Implementations
/// must return quickly.
pub trait NeighborObserver: Send + Sync {
    /// A neighbor key was seen for the first time
    fn on_new(&self, _record: &NeighborRecord) {}

    /// An existing neighbor was refreshed; `record` is the merged state
    fn on_updated(&self, _record: &NeighborRecord) {}
}
