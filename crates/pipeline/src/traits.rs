//! Core traits for the bus filtering pipeline.

use data_loader::Bus;

/// Core trait for filtering the live bus list.
///
/// All filters must implement this trait to be used in the FilterPipeline.
/// Filters take ownership of the list and return the buses they keep, in
/// their original order.
pub trait BusFilter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    fn apply(&self, buses: Vec<Bus>) -> Vec<Bus>;
}
