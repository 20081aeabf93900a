//! In-memory database and change-set source for engine tests

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::error::{MigrateError, MigrateResult};
use crate::migrations::definitions::{AppliedRecord, MigrationDirection};
use crate::migrations::repository::ChangeSetRepository;
use crate::seeding::SeedRepository;
use crate::store::{ScriptExecutor, StateStore};

/// Tracking table and executed-script log kept in memory
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    pub records: Vec<AppliedRecord>,
    pub executed: Vec<String>,
    pub schema_created: bool,
    pub unavailable: bool,
    failing: HashSet<String>,
    hidden: HashSet<String>,
    next_id: i64,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make any script equal to `sql` fail when executed
    pub fn fail_on(&mut self, sql: &str) {
        self.failing.insert(sql.to_string());
    }

    /// Leave the record for `name` out of `list_applied` while it stays stored
    pub fn hide(&mut self, name: &str) {
        self.hidden.insert(name.to_string());
    }

    pub fn clear_failures(&mut self) {
        self.failing.clear();
    }

    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn batch_of(&self, name: &str) -> Option<i32> {
        self.records.iter().find(|r| r.name == name).map(|r| r.batch)
    }

    fn check_available(&self) -> MigrateResult<()> {
        if self.unavailable {
            return Err(MigrateError::StoreUnavailable(
                "connection refused".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl StateStore for MemoryDatabase {
    async fn ensure_schema(&mut self) -> MigrateResult<()> {
        self.check_available()?;
        self.schema_created = true;
        Ok(())
    }

    async fn list_applied(&mut self) -> MigrateResult<Vec<AppliedRecord>> {
        self.check_available()?;
        // Reverse so callers cannot rely on insertion order.
        Ok(self
            .records
            .iter()
            .rev()
            .filter(|r| !self.hidden.contains(&r.name))
            .cloned()
            .collect())
    }

    async fn record_applied(&mut self, name: &str, batch: i32) -> MigrateResult<()> {
        self.check_available()?;
        if self.records.iter().any(|r| r.name == name) {
            return Err(MigrateError::DuplicateName(name.to_string()));
        }
        self.next_id += 1;
        self.records.push(AppliedRecord {
            id: self.next_id,
            name: name.to_string(),
            batch,
        });
        Ok(())
    }

    async fn remove_applied(&mut self, name: &str) -> MigrateResult<()> {
        self.check_available()?;
        self.records.retain(|r| r.name != name);
        Ok(())
    }
}

#[async_trait]
impl ScriptExecutor for MemoryDatabase {
    async fn execute_script(&mut self, sql: &str) -> Result<u64, sqlx::Error> {
        if self.failing.contains(sql) {
            return Err(sqlx::Error::Protocol(format!("syntax error in: {}", sql)));
        }
        self.executed.push(sql.to_string());
        Ok(1)
    }
}

/// Change-sets and seeds defined in code
///
/// Each change-set's scripts are `up:<name>` and `down:<name>`.
#[derive(Debug, Default, Clone)]
pub struct StaticRepository {
    names: Vec<String>,
    missing: HashSet<(String, MigrationDirection)>,
    seeds: Vec<(String, String)>,
}

impl StaticRepository {
    pub fn new(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|n| n.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, name: &str) {
        self.names.push(name.to_string());
    }

    pub fn remove(&mut self, name: &str) {
        self.names.retain(|n| n != name);
    }

    pub fn without_script(mut self, name: &str, direction: MigrationDirection) -> Self {
        self.missing.insert((name.to_string(), direction));
        self
    }

    pub fn with_seed(mut self, name: &str, sql: &str) -> Self {
        self.seeds.push((name.to_string(), sql.to_string()));
        self
    }

    pub fn up(name: &str) -> String {
        format!("up:{}", name)
    }

    pub fn down(name: &str) -> String {
        format!("down:{}", name)
    }
}

impl ChangeSetRepository for StaticRepository {
    fn list_available(&self) -> MigrateResult<Vec<String>> {
        Ok(self.names.clone())
    }

    fn load_script(&self, name: &str, direction: MigrationDirection) -> MigrateResult<String> {
        if !self.names.iter().any(|n| n == name) || self.missing.contains(&(name.to_string(), direction)) {
            return Err(MigrateError::ScriptMissing {
                name: name.to_string(),
                path: PathBuf::from(name).join(direction.script_file()),
            });
        }
        Ok(format!("{}:{}", direction, name))
    }
}

impl SeedRepository for StaticRepository {
    fn load_seed(&self, name: &str) -> MigrateResult<String> {
        self.seeds
            .iter()
            .find(|(seed, _)| seed == name)
            .map(|(_, sql)| sql.clone())
            .ok_or_else(|| MigrateError::ScriptMissing {
                name: name.to_string(),
                path: PathBuf::from(format!("{}.sql", name)),
            })
    }
}
