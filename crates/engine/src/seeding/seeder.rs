//! Seed script runner
//!
//! Seeds are plain SQL files run in a fixed order on every invocation. No
//! state is kept about which seeds already ran, so seed scripts are expected
//! to be safe to repeat or to be run once by the operator.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{MigrateError, MigrateResult};
use crate::migrations::repository::read_script;
use crate::observers::{MigrationObserver, NoopObserver};
use crate::store::ScriptExecutor;

/// Source of seed script text
pub trait SeedRepository: Send + Sync {
    fn load_seed(&self, name: &str) -> MigrateResult<String>;
}

/// Seeds stored as `<root>/<name>.sql`
#[derive(Debug, Clone)]
pub struct FsSeedRepository {
    root: PathBuf,
}

impl FsSeedRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn seed_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.sql", name))
    }
}

impl SeedRepository for FsSeedRepository {
    fn load_seed(&self, name: &str) -> MigrateResult<String> {
        read_script(name, self.seed_path(name))
    }
}

/// Result of a seed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedResult {
    /// Seeds run, in order
    pub seeders: Vec<String>,
    /// Statements executed across all seeds
    pub statements: usize,
}

/// Split a seed script on `;`
///
/// The split is literal: a `;` inside a string literal or comment also ends a
/// statement. Whitespace-only segments, including the one after a trailing
/// `;`, are dropped.
pub fn split_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Runs a fixed, ordered list of seeds
pub struct SeederRunner<S> {
    source: S,
    seeders: Vec<String>,
    observer: Arc<dyn MigrationObserver>,
}

impl<S: SeedRepository> SeederRunner<S> {
    pub fn new(source: S, seeders: Vec<String>) -> Self {
        Self {
            source,
            seeders,
            observer: Arc::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn MigrationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Run every seed in order, statement by statement
    ///
    /// Stops at the first failing statement. Statements already executed are
    /// not undone.
    pub async fn run<D>(&self, db: &mut D) -> MigrateResult<SeedResult>
    where
        D: ScriptExecutor + ?Sized,
    {
        let mut statements = 0;

        for name in &self.seeders {
            let sql = self.source.load_seed(name)?;

            tracing::info!(seeder = %name, "seeding");
            self.observer.seed_started(name).await;

            let parts = split_statements(&sql);
            for (index, statement) in parts.iter().enumerate() {
                tracing::debug!(seeder = %name, statement = index + 1, "executing seed statement");
                db.execute_script(statement).await.map_err(|source| {
                    tracing::error!(seeder = %name, statement = index + 1, error = %source, "seed failed");
                    MigrateError::ScriptExecutionFailed {
                        name: name.clone(),
                        source,
                    }
                })?;
            }

            statements += parts.len();
            self.observer.seed_completed(name, parts.len()).await;
        }

        Ok(SeedResult {
            seeders: self.seeders.clone(),
            statements,
        })
    }
}
