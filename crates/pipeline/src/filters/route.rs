//! Keep only buses running a given route.

use crate::traits::BusFilter;
use data_loader::{Bus, RouteId};

pub struct RouteFilter {
    route: RouteId,
}

impl RouteFilter {
    pub fn new(route: impl Into<RouteId>) -> Self {
        Self {
            route: route.into(),
        }
    }
}

impl BusFilter for RouteFilter {
    fn name(&self) -> &str {
        "RouteFilter"
    }

    fn apply(&self, buses: Vec<Bus>) -> Vec<Bus> {
        buses
            .into_iter()
            .filter(|bus| bus.route == self.route)
            .collect()
    }
}
