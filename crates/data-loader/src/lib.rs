//! # Data Loader Crate
//!
//! Loads the dashboard's JSON snapshots (users, dashboard statistics,
//! routes, buses, conductors) into a read-only [`FleetIndex`].
//!
//! ## Main Components
//!
//! - **types**: Domain types (User, Bus, Conductor, RouteSummary, Message, FleetIndex)
//! - **parser**: Parse the snapshot files into Rust structs
//! - **index**: Build, validate and query the FleetIndex
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::FleetIndex;
//! use std::path::Path;
//!
//! let index = FleetIndex::load_from_dir(Path::new("data"))?;
//!
//! for route in index.routes() {
//!     println!("{} runs {} buses", route.label(), route.active_buses);
//! }
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;

pub use error::{DataLoadError, Result};
pub use types::{
    // Type aliases and defaults
    RouteId,
    ConductorId,
    DEFAULT_BASE_TRIPS,
    DEFAULT_BASE_STOPS,
    // Core types
    User,
    Bus,
    Conductor,
    RouteSummary,
    DashboardStats,
    Alert,
    Message,
    FleetIndex,
    StatsSnapshot,
    FleetSnapshot,
    // Enums
    Role,
    BusStatus,
    AlertKind,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fleet_index_creation() {
        let index = FleetIndex::new();
        assert_eq!(index.counts(), (0, 0, 0, 0));
    }

    #[test]
    fn test_insert_route() {
        let mut index = FleetIndex::new();
        index.insert_route(RouteSummary::new("500D", "Majestic → Hebbal", 2));

        let retrieved = index.get_route("500D").unwrap();
        assert_eq!(retrieved.active_buses, 2);
        assert_eq!(retrieved.label(), "Majestic → Hebbal (500D)");
    }

    #[test]
    fn test_insert_conductor() {
        let mut index = FleetIndex::new();
        index.insert_conductor(Conductor {
            id: 7,
            name: "Ganesh Rao".to_string(),
            bus_number: "KA-01-F-6789".to_string(),
            route: "335E".to_string(),
            online: false,
            unread: 0,
        });

        let retrieved = index.get_conductor(7).unwrap();
        assert_eq!(retrieved.name, "Ganesh Rao");
        assert!(!retrieved.online);
    }

    #[test]
    fn test_route_counter_defaults() {
        let route = RouteSummary::new("356", "Banashankari → Koramangala", 4);
        assert_eq!(route.trips_or_default(), 10);
        assert_eq!(route.stops_or_default(), 200);

        let route = route.with_counters(3, 40);
        assert_eq!(route.trips_or_default(), 3);
        assert_eq!(route.stops_or_default(), 40);
    }

    #[test]
    fn test_role_round_trip_names() {
        assert_eq!(Role::parse("coordinator"), Some(Role::Coordinator));
        assert_eq!(Role::Conductor.as_str(), "conductor");
        assert_eq!(Role::parse("Coordinator"), None);
    }

    #[test]
    fn test_empty_queries() {
        let index = FleetIndex::new();

        assert!(index.get_route("335E").is_none());
        assert!(index.get_conductor(1).is_none());
        assert!(index.routes().is_empty());
        assert!(index.buses().is_empty());
        assert!(index.authenticate("coordinator", "coord123", "coordinator").is_none());
    }
}
