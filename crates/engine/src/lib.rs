//! # sqlshift-engine: batched SQL change-set migrations
//!
//! Applies, reverts and reseeds versioned SQL change-sets against
//! PostgreSQL, tracking every applied change-set and the batch it was applied
//! in.
//!
//! - [`migrations`]: change-set repository and the migrate/rollback/refresh
//!   state machine
//! - [`store`]: tracking table and script execution seams, with the
//!   PostgreSQL implementation
//! - [`seeding`]: ordered seed scripts, independent of migration state
//! - [`observers`]: progress hooks for reporting
//!
//! Runs are strictly sequential over a single connection. Two runs against
//! the same database at the same time are not guarded against.

pub mod config;
pub mod error;
pub mod migrations;
pub mod observers;
pub mod seeding;
pub mod store;

#[cfg(test)]
mod testing;


pub use config::{ConfigError, ConfigSource, ConfigTrait, DatabaseConfig, MigrationConfig};
pub use error::{MigrateError, MigrateResult};
pub use migrations::*;
pub use observers::{MigrationObserver, NoopObserver};
pub use seeding::{FsSeedRepository, SeedRepository, SeedResult, SeederRunner};
pub use store::{MigrationDatabase, PostgresDatabase, ScriptExecutor, StateStore};
