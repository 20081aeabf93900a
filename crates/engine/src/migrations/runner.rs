//! Migration Runner - Executes change-sets against the database
//!
//! Decides what is pending, applies it in repository order and records every
//! success under one new batch number.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use super::definitions::{
    ChangeSetStatus, MigrationDirection, MigrationRunResult, MigrationStatus,
};
use super::repository::ChangeSetRepository;
use crate::error::{MigrateError, MigrateResult};
use crate::observers::{MigrationObserver, NoopObserver};
use crate::store::{next_batch, MigrationDatabase};

/// Longest change-set name the tracking table can hold
pub const MAX_NAME_LEN: usize = 100;

/// Migration runner that executes change-sets against a database handle
///
/// The runner owns no connection. Every operation takes the handle for the
/// current run, so one session is threaded through the whole run in order.
pub struct MigrationRunner<R> {
    repository: R,
    observer: Arc<dyn MigrationObserver>,
}

impl<R: ChangeSetRepository> MigrationRunner<R> {
    /// Create a new migration runner
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Report progress to `observer`
    pub fn with_observer(mut self, observer: Arc<dyn MigrationObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub(crate) fn observer(&self) -> &dyn MigrationObserver {
        self.observer.as_ref()
    }

    /// Run all pending change-sets as one new batch
    ///
    /// Stops at the first failing script. Change-sets applied earlier in the
    /// same run stay applied; running again resumes at the failed one.
    pub async fn run_migrations<D>(&self, db: &mut D) -> MigrateResult<MigrationRunResult>
    where
        D: MigrationDatabase + ?Sized,
    {
        let start_time = Instant::now();

        db.ensure_schema().await?;

        let applied_records = db.list_applied().await?;
        let batch = next_batch(&applied_records);
        let applied_names: HashSet<String> =
            applied_records.into_iter().map(|r| r.name).collect();

        let available = self.repository.list_available()?;

        tracing::info!(batch, available = available.len(), "migrating batch");
        self.observer.batch_started(MigrationDirection::Up, batch).await;

        let mut applied = Vec::new();
        let mut skipped = Vec::new();

        for name in available {
            if applied_names.contains(&name) {
                tracing::debug!(change_set = %name, "already migrated");
                self.observer.change_set_skipped(&name).await;
                skipped.push(name);
                continue;
            }

            if name.chars().count() > MAX_NAME_LEN {
                return Err(MigrateError::Repository(format!(
                    "Change-set name '{}' is longer than {} characters",
                    name, MAX_NAME_LEN
                )));
            }

            let sql = self.repository.load_forward(&name)?;

            tracing::debug!(change_set = %name, batch, "applying change-set");
            self.observer
                .change_set_started(MigrationDirection::Up, &name)
                .await;

            db.execute_script(&sql).await.map_err(|source| {
                tracing::error!(change_set = %name, error = %source, "change-set failed");
                MigrateError::ScriptExecutionFailed {
                    name: name.clone(),
                    source,
                }
            })?;
            db.record_applied(&name, batch).await?;

            self.observer
                .change_set_completed(MigrationDirection::Up, &name)
                .await;
            applied.push(name);
        }

        self.observer.batch_finished(MigrationDirection::Up, batch).await;
        tracing::info!(
            batch,
            applied = applied.len(),
            skipped = skipped.len(),
            "finished migrating"
        );

        Ok(MigrationRunResult {
            batch,
            applied,
            skipped,
            execution_time_ms: start_time.elapsed().as_millis(),
        })
    }

    /// Status of every available change-set, followed by orphaned records
    pub async fn get_migration_status<D>(&self, db: &mut D) -> MigrateResult<Vec<ChangeSetStatus>>
    where
        D: MigrationDatabase + ?Sized,
    {
        db.ensure_schema().await?;

        let mut applied_records = db.list_applied().await?;
        applied_records.sort_by_key(|r| r.id);

        let available = self.repository.list_available()?;
        let batches: HashMap<&str, i32> = applied_records
            .iter()
            .map(|r| (r.name.as_str(), r.batch))
            .collect();

        let mut status_list: Vec<ChangeSetStatus> = available
            .iter()
            .map(|name| ChangeSetStatus {
                name: name.clone(),
                status: match batches.get(name.as_str()) {
                    Some(&batch) => MigrationStatus::Applied { batch },
                    None => MigrationStatus::Pending,
                },
            })
            .collect();

        let known: HashSet<&str> = available.iter().map(String::as_str).collect();
        status_list.extend(
            applied_records
                .iter()
                .filter(|r| !known.contains(r.name.as_str()))
                .map(|r| ChangeSetStatus {
                    name: r.name.clone(),
                    status: MigrationStatus::Orphaned { batch: r.batch },
                }),
        );

        Ok(status_list)
    }
}
