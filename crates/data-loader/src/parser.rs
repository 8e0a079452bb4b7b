//! Parser for the dashboard snapshot files.
//!
//! - user.json:  `[{"username", "password", "role"}]`
//! - stats.json: `{"dashboard_stats", "alerts", "routes"}`
//! - fleet.json: `{"buses", "conductors"}`
//!
//! A missing file is logged and treated as an empty snapshot so the
//! dashboard can still start. A file that exists but does not parse is an
//! error.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, error};

pub const USERS_FILE: &str = "user.json";
pub const STATS_FILE: &str = "stats.json";
pub const FLEET_FILE: &str = "fleet.json";

/// Read and deserialize one snapshot file, or fall back to `T::default()`
/// when the file does not exist.
fn load_json_or_default<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            error!("Data file not found: {}. Check directory structure.", path.display());
            return Ok(T::default());
        }
        Err(e) => return Err(e.into()),
    };
    debug!("Loading data from {}...", path.display());
    parse_json(&content, &file_name(path))
}

/// Deserialize a snapshot from a string, attributing errors to `file`
pub fn parse_json<T: DeserializeOwned>(content: &str, file: &str) -> Result<T> {
    serde_json::from_str(content).map_err(|e| DataLoadError::ParseError {
        file: file.to_string(),
        line: e.line(),
        reason: e.to_string(),
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parse the users file
pub fn parse_users(path: &Path) -> Result<Vec<User>> {
    load_json_or_default(path)
}

/// Parse the dashboard statistics file
pub fn parse_stats(path: &Path) -> Result<StatsSnapshot> {
    load_json_or_default(path)
}

/// Parse the fleet file
pub fn parse_fleet(path: &Path) -> Result<FleetSnapshot> {
    load_json_or_default(path)
}
