//! Core domain types for the fleet dashboard snapshots.
//!
//! Field names on the wire follow the dashboard's JSON (camelCase for most
//! records), so every type here carries explicit serde renames where the
//! Rust name differs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Route identifier as printed on the bus (e.g. "335E", "G4")
pub type RouteId = String;

/// Conductor identifier from the fleet snapshot
pub type ConductorId = u32;

/// Default classifier input when a route omits its trip counter
pub const DEFAULT_BASE_TRIPS: u32 = 10;

/// Default classifier input when a route omits its stop-event counter
pub const DEFAULT_BASE_STOPS: u32 = 200;

// =============================================================================
// Users
// =============================================================================

/// Dashboard roles. Both users and message endpoints are addressed by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Coordinator,
    Conductor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Coordinator => "coordinator",
            Role::Conductor => "conductor",
        }
    }

    /// Parse a role name as sent by the login form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "coordinator" => Some(Role::Coordinator),
            "conductor" => Some(Role::Conductor),
            _ => None,
        }
    }
}

/// A dashboard account from `user.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
    pub role: Role,
}

// =============================================================================
// Fleet
// =============================================================================

/// Live tracking status of a single bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusStatus {
    OnTime,
    Delay,
    Congestion,
}

impl BusStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BusStatus::OnTime => "ontime",
            BusStatus::Delay => "delay",
            BusStatus::Congestion => "congestion",
        }
    }
}

/// A bus currently in service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bus {
    pub number: String,
    pub conductor_id: ConductorId,
    pub conductor: String,
    pub route: RouteId,
    pub location: String,
    pub status: BusStatus,
    #[serde(rename = "statusText")]
    pub status_text: String,
    /// Occupancy as displayed, e.g. "85%"
    pub load: String,
    #[serde(rename = "loadClass")]
    pub load_class: String,
}

/// A conductor reachable from the communication page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conductor {
    pub id: ConductorId,
    pub name: String,
    pub bus_number: String,
    pub route: RouteId,
    pub online: bool,
    pub unread: u32,
}

/// Per-route summary used both by the dashboard table and as classifier input.
///
/// `base_trips` and `base_stops` are opaque counters; they only feed the
/// demand classifier and fall back to 10 / 200 when a snapshot omits them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub id: RouteId,
    pub name: String,
    pub active_buses: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_trips: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_stops: Option<u32>,
}

impl RouteSummary {
    pub fn new(id: impl Into<RouteId>, name: impl Into<String>, active_buses: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            active_buses,
            load_status: None,
            load_class: None,
            base_trips: None,
            base_stops: None,
        }
    }

    pub fn with_counters(mut self, base_trips: u32, base_stops: u32) -> Self {
        self.base_trips = Some(base_trips);
        self.base_stops = Some(base_stops);
        self
    }

    pub fn trips_or_default(&self) -> u32 {
        self.base_trips.unwrap_or(DEFAULT_BASE_TRIPS)
    }

    pub fn stops_or_default(&self) -> u32 {
        self.base_stops.unwrap_or(DEFAULT_BASE_STOPS)
    }

    /// Label used in recommendation tables, e.g. "Majestic → Hebbal (500D)"
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.id)
    }
}

// =============================================================================
// Dashboard statistics
// =============================================================================

/// Headline counters on the coordinator dashboard
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_buses: u32,
    pub low_demand_routes: u32,
    pub high_demand_routes: u32,
    pub pending_messages: u32,
    pub ml_suggestions: u32,
    pub congestion_alerts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Danger,
    Warning,
    Info,
    Success,
}

/// An entry in the dashboard alert feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    /// Human-readable age, e.g. "15 mins ago"
    pub time: String,
}

// =============================================================================
// Messages
// =============================================================================

/// A 1:1 message between a conductor and the coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub from: Role,
    pub to: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bus_number: Option<String>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
}

// =============================================================================
// Snapshot file layouts
// =============================================================================

/// Layout of `stats.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsSnapshot {
    pub dashboard_stats: DashboardStats,
    pub alerts: Vec<Alert>,
    pub routes: Vec<RouteSummary>,
}

/// Layout of `fleet.json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetSnapshot {
    pub buses: Vec<Bus>,
    pub conductors: Vec<Conductor>,
}

// =============================================================================
// FleetIndex - the read-only snapshot store
// =============================================================================

/// Holds every snapshot loaded at startup.
///
/// Routes keep their file order (recommendations must come back in the same
/// order); the side maps give O(1) lookups by id.
#[derive(Debug, Default)]
pub struct FleetIndex {
    pub(crate) users: Vec<User>,
    pub(crate) stats: DashboardStats,
    pub(crate) alerts: Vec<Alert>,
    pub(crate) routes: Vec<RouteSummary>,
    pub(crate) buses: Vec<Bus>,
    pub(crate) conductors: Vec<Conductor>,

    /// Route id -> position in `routes`
    pub(crate) route_index: HashMap<RouteId, usize>,
    /// Conductor id -> position in `conductors`
    pub(crate) conductor_index: HashMap<ConductorId, usize>,
}

impl FleetIndex {
    /// Creates a new, empty FleetIndex
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn stats(&self) -> &DashboardStats {
        &self.stats
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    /// All route summaries, in snapshot order
    pub fn routes(&self) -> &[RouteSummary] {
        &self.routes
    }

    pub fn buses(&self) -> &[Bus] {
        &self.buses
    }

    pub fn conductors(&self) -> &[Conductor] {
        &self.conductors
    }

    pub fn get_route(&self, id: &str) -> Option<&RouteSummary> {
        self.route_index.get(id).map(|&i| &self.routes[i])
    }

    pub fn get_conductor(&self, id: ConductorId) -> Option<&Conductor> {
        self.conductor_index.get(&id).map(|&i| &self.conductors[i])
    }

    /// Buses currently assigned to a route
    pub fn buses_on_route<'a>(&'a self, route_id: &'a str) -> impl Iterator<Item = &'a Bus> + 'a {
        self.buses.iter().filter(move |b| b.route == route_id)
    }

    // Mutators used while building the index

    pub fn insert_user(&mut self, user: User) {
        self.users.push(user);
    }

    /// Insert a route. Lookups by id resolve to the first route inserted
    /// under that id; `validate()` reports the duplicate.
    pub fn insert_route(&mut self, route: RouteSummary) {
        self.route_index
            .entry(route.id.clone())
            .or_insert(self.routes.len());
        self.routes.push(route);
    }

    pub fn insert_bus(&mut self, bus: Bus) {
        self.buses.push(bus);
    }

    pub fn insert_conductor(&mut self, conductor: Conductor) {
        self.conductor_index
            .insert(conductor.id, self.conductors.len());
        self.conductors.push(conductor);
    }

    pub fn insert_alert(&mut self, alert: Alert) {
        self.alerts.push(alert);
    }

    pub fn set_stats(&mut self, stats: DashboardStats) {
        self.stats = stats;
    }

    /// Get counts for debugging/validation: (users, routes, buses, conductors)
    pub fn counts(&self) -> (usize, usize, usize, usize) {
        (
            self.users.len(),
            self.routes.len(),
            self.buses.len(),
            self.conductors.len(),
        )
    }
}
