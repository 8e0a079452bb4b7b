//! Error types for the data-loader crate.

use thiserror::Error;

/// Errors that can occur while loading or validating the fleet snapshots
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// Snapshot directory could not be found
    #[error("Data directory not found: {path}")]
    DirectoryNotFound { path: String },

    /// I/O error occurred while reading a file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A snapshot file is not valid JSON for its expected layout
    #[error("Parse error in {file} at line {line}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// Two routes share the same identifier
    #[error("Duplicate route id: {id}")]
    DuplicateRoute { id: String },

    /// Referenced entity doesn't exist (e.g. a bus on an unknown route)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
