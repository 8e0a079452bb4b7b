//! FleetIndex building, validation and lookups.

use crate::error::{DataLoadError, Result};
use crate::parser::{self, FLEET_FILE, STATS_FILE, USERS_FILE};
use crate::types::*;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

impl FleetIndex {
    /// Load every snapshot from a data directory.
    ///
    /// Steps:
    /// 1. Parse the three files in parallel
    /// 2. Insert users, routes, buses, conductors
    /// 3. Validate cross references
    pub fn load_from_dir(data_dir: &Path) -> Result<Self> {
        if !data_dir.is_dir() {
            return Err(DataLoadError::DirectoryNotFound {
                path: data_dir.display().to_string(),
            });
        }
        info!("Loading fleet snapshots from {}", data_dir.display());

        let users_path = data_dir.join(USERS_FILE);
        let stats_path = data_dir.join(STATS_FILE);
        let fleet_path = data_dir.join(FLEET_FILE);

        let ((users, stats), fleet) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_users(&users_path),
                    || parser::parse_stats(&stats_path),
                )
            },
            || parser::parse_fleet(&fleet_path),
        );

        let index = Self::from_snapshots(users?, stats?, fleet?);
        index.validate()?;

        let (users, routes, buses, conductors) = index.counts();
        info!(
            "Loaded {} users, {} routes, {} buses, {} conductors",
            users, routes, buses, conductors
        );
        Ok(index)
    }

    /// Build an index from already-parsed snapshots. Does not validate.
    pub fn from_snapshots(users: Vec<User>, stats: StatsSnapshot, fleet: FleetSnapshot) -> Self {
        let mut index = FleetIndex::new();

        for user in users {
            index.insert_user(user);
        }

        index.set_stats(stats.dashboard_stats);
        for alert in stats.alerts {
            index.insert_alert(alert);
        }
        for route in stats.routes {
            index.insert_route(route);
        }

        for conductor in fleet.conductors {
            index.insert_conductor(conductor);
        }
        for bus in fleet.buses {
            index.insert_bus(bus);
        }

        index
    }

    /// Validate snapshot integrity
    ///
    /// Check that:
    /// - Route ids are unique
    /// - Every bus runs on a known route
    /// - Every bus's conductor exists
    ///
    /// Cross references are only checked when the referenced snapshot is
    /// non-empty, so a deployment that ships fleet.json without routes
    /// still loads.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for route in &self.routes {
            if !seen.insert(route.id.as_str()) {
                return Err(DataLoadError::DuplicateRoute {
                    id: route.id.clone(),
                });
            }
        }

        for bus in &self.buses {
            if !self.routes.is_empty() && !self.route_index.contains_key(&bus.route) {
                return Err(DataLoadError::MissingReference {
                    entity: "Route".to_string(),
                    id: bus.route.clone(),
                });
            }
            if !self.conductors.is_empty() && !self.conductor_index.contains_key(&bus.conductor_id) {
                return Err(DataLoadError::MissingReference {
                    entity: "Conductor".to_string(),
                    id: bus.conductor_id.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Look up a user whose username, password and role all match.
    ///
    /// An unknown role string never matches.
    pub fn authenticate(&self, username: &str, password: &str, role: &str) -> Option<&User> {
        let role = Role::parse(role)?;
        self.users
            .iter()
            .find(|u| u.username == username)
            .filter(|u| u.password == password && u.role == role)
    }
}
