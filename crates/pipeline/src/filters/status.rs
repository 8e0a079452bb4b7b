//! Keep only buses in a given tracking status.

use crate::traits::BusFilter;
use data_loader::Bus;

/// Matches on the status's wire name ("ontime", "delay", "congestion"), so
/// an unrecognised status string simply matches nothing.
pub struct StatusFilter {
    status: String,
}

impl StatusFilter {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }
}

impl BusFilter for StatusFilter {
    fn name(&self) -> &str {
        "StatusFilter"
    }

    fn apply(&self, buses: Vec<Bus>) -> Vec<Bus> {
        buses
            .into_iter()
            .filter(|bus| bus.status.as_str() == self.status)
            .collect()
    }
}
