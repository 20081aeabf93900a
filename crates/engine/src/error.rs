//! Error types for the migration engine
//!
//! Every engine operation is single-attempt: any of these errors aborts the
//! current run. Work committed before the failure stays committed.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for engine operations
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Error types for migration, rollback and seeding runs
#[derive(Debug, Error)]
pub enum MigrateError {
    /// The tracking table could not be created, read or written
    #[error("State store unavailable: {0}")]
    StoreUnavailable(String),

    /// A forward, backward or seed script does not exist
    #[error("Script missing for '{name}': {} not found", .path.display())]
    ScriptMissing { name: String, path: PathBuf },

    /// A script was sent to the database and the database rejected it
    #[error("Script for '{name}' failed: {source}")]
    ScriptExecutionFailed {
        name: String,
        #[source]
        source: sqlx::Error,
    },

    /// The tracking table already holds a record with this name
    #[error("Change-set '{0}' is already recorded as applied")]
    DuplicateName(String),

    /// The database could not be reached or refused the credentials
    #[error("Connection error: {0}")]
    Connection(String),

    /// The change-set or seed source could not be read
    #[error("Repository error: {0}")]
    Repository(String),
}

impl MigrateError {
    /// Name of the change-set or seed this error is attached to, if any
    pub fn subject(&self) -> Option<&str> {
        match self {
            MigrateError::ScriptMissing { name, .. }
            | MigrateError::ScriptExecutionFailed { name, .. }
            | MigrateError::DuplicateName(name) => Some(name.as_str()),
            _ => None,
        }
    }
}
