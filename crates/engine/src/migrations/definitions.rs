//! Migration Definitions - Core types and structures for migrations
//!
//! Defines the records kept in the tracking table and the results returned
//! by each engine operation.

use serde::{Deserialize, Serialize};

/// One row of the tracking table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedRecord {
    /// Store-assigned, strictly increasing with insertion order
    pub id: i64,
    /// Change-set name
    pub name: String,
    /// Batch number (for grouping migrations)
    pub batch: i32,
}

/// Which script of a change-set is being run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationDirection {
    /// Apply the change-set (run `up.sql`)
    Up,
    /// Revert the change-set (run `down.sql`)
    Down,
}

impl MigrationDirection {
    pub fn script_file(&self) -> &'static str {
        match self {
            MigrationDirection::Up => "up.sql",
            MigrationDirection::Down => "down.sql",
        }
    }
}

impl std::fmt::Display for MigrationDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationDirection::Up => write!(f, "up"),
            MigrationDirection::Down => write!(f, "down"),
        }
    }
}

/// Result of running migrations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationRunResult {
    /// Batch number the applied change-sets were recorded under
    pub batch: i32,
    /// Names applied in this run, in order
    pub applied: Vec<String>,
    /// Names skipped because they were already applied
    pub skipped: Vec<String>,
    /// Total execution time in milliseconds
    pub execution_time_ms: u128,
}

/// Result of rolling back one batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackResult {
    /// Batch that was reverted, `None` when the store was already empty
    pub batch: Option<i32>,
    /// Names reverted, in execution order
    pub rolled_back: Vec<String>,
    /// Total execution time in milliseconds
    pub execution_time_ms: u128,
}

/// Result of reverting every batch and migrating again
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResult {
    /// Batches reverted, highest first
    pub reverted_batches: Vec<i32>,
    /// Names reverted across all batches, in execution order
    pub rolled_back: Vec<String>,
    /// The final migrate run
    pub migration: MigrationRunResult,
}

/// Where a change-set stands relative to the tracking table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum MigrationStatus {
    /// Available but not yet applied
    Pending,
    /// Applied in the given batch
    Applied { batch: i32 },
    /// Recorded as applied but no longer present in the repository
    Orphaned { batch: i32 },
}

/// Status line for one change-set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSetStatus {
    pub name: String,
    #[serde(flatten)]
    pub status: MigrationStatus,
}
