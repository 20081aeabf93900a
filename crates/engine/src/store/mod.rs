//! Database seams used by the engine
//!
//! The engine never talks to sqlx directly. It drives a handle implementing
//! [`StateStore`] for bookkeeping and [`ScriptExecutor`] for running SQL, so
//! the same state machine runs against PostgreSQL or an in-memory fake.

pub mod postgres;

pub use postgres::PostgresDatabase;

use async_trait::async_trait;

use crate::error::MigrateResult;
use crate::migrations::definitions::AppliedRecord;

/// Persistent record of which change-sets are applied, and in which batch
#[async_trait]
pub trait StateStore: Send {
    /// Create the tracking table if it does not exist
    async fn ensure_schema(&mut self) -> MigrateResult<()>;

    /// All applied records, in no particular order
    async fn list_applied(&mut self) -> MigrateResult<Vec<AppliedRecord>>;

    /// Record a change-set as applied in `batch`
    async fn record_applied(&mut self, name: &str, batch: i32) -> MigrateResult<()>;

    /// Forget a change-set; absent names are ignored
    async fn remove_applied(&mut self, name: &str) -> MigrateResult<()>;
}

/// Runs raw SQL text against the database
#[async_trait]
pub trait ScriptExecutor: Send {
    /// Execute a script and return the number of affected rows
    async fn execute_script(&mut self, sql: &str) -> Result<u64, sqlx::Error>;
}

/// A handle the engine can both track state in and run scripts against
pub trait MigrationDatabase: StateStore + ScriptExecutor {}

impl<T: StateStore + ScriptExecutor> MigrationDatabase for T {}

/// Highest batch number present, 0 when nothing is applied
pub fn current_batch(records: &[AppliedRecord]) -> i32 {
    records.iter().map(|r| r.batch).max().unwrap_or(0)
}

/// Batch number the next migrate run records under
pub fn next_batch(records: &[AppliedRecord]) -> i32 {
    current_batch(records) + 1
}

/// Records of the latest batch, most recently inserted first
pub fn latest_batch_records(records: &[AppliedRecord]) -> Option<(i32, Vec<AppliedRecord>)> {
    let batch = records.iter().map(|r| r.batch).max()?;

    let mut selected: Vec<AppliedRecord> = records
        .iter()
        .filter(|r| r.batch == batch)
        .cloned()
        .collect();
    selected.sort_by(|a, b| b.id.cmp(&a.id));

    Some((batch, selected))
}
