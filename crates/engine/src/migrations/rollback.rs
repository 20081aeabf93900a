//! Migration Rollback - Reverting batches and refreshing the schema
//!
//! A rollback always targets the highest batch and walks it in reverse
//! insertion order (record id descending), independent of repository order.

use std::time::Instant;

use super::definitions::{MigrationDirection, RefreshResult, RollbackResult};
use super::repository::ChangeSetRepository;
use super::runner::MigrationRunner;
use crate::error::{MigrateError, MigrateResult};
use crate::store::{latest_batch_records, MigrationDatabase};

impl<R: ChangeSetRepository> MigrationRunner<R> {
    /// Revert every change-set of the latest batch
    ///
    /// Returns `batch: None` when nothing is applied. On failure the
    /// change-sets not yet reverted keep their records.
    pub async fn rollback_last_batch<D>(&self, db: &mut D) -> MigrateResult<RollbackResult>
    where
        D: MigrationDatabase + ?Sized,
    {
        let start_time = Instant::now();

        db.ensure_schema().await?;
        let records = db.list_applied().await?;

        let Some((batch, batch_records)) = latest_batch_records(&records) else {
            tracing::warn!("no migrations to revert");
            self.observer().nothing_to_revert().await;
            return Ok(RollbackResult {
                batch: None,
                rolled_back: Vec::new(),
                execution_time_ms: start_time.elapsed().as_millis(),
            });
        };

        tracing::info!(batch, count = batch_records.len(), "reverting batch");
        self.observer()
            .batch_started(MigrationDirection::Down, batch)
            .await;

        let mut rolled_back = Vec::with_capacity(batch_records.len());

        for record in batch_records {
            let sql = self.repository().load_backward(&record.name)?;

            tracing::debug!(change_set = %record.name, batch, "rolling back change-set");
            self.observer()
                .change_set_started(MigrationDirection::Down, &record.name)
                .await;

            db.execute_script(&sql).await.map_err(|source| {
                tracing::error!(change_set = %record.name, error = %source, "rollback failed");
                MigrateError::ScriptExecutionFailed {
                    name: record.name.clone(),
                    source,
                }
            })?;
            db.remove_applied(&record.name).await?;

            self.observer()
                .change_set_completed(MigrationDirection::Down, &record.name)
                .await;
            rolled_back.push(record.name);
        }

        self.observer()
            .batch_finished(MigrationDirection::Down, batch)
            .await;
        tracing::info!(batch, reverted = rolled_back.len(), "finished reverting");

        Ok(RollbackResult {
            batch: Some(batch),
            rolled_back,
            execution_time_ms: start_time.elapsed().as_millis(),
        })
    }

    /// Revert batches down through batch 1, then migrate everything again
    ///
    /// The revert loop ends once a rollback reports nothing to revert or the
    /// batch it just reverted is 1. The final migrate always runs.
    pub async fn refresh<D>(&self, db: &mut D) -> MigrateResult<RefreshResult>
    where
        D: MigrationDatabase + ?Sized,
    {
        let mut reverted_batches = Vec::new();
        let mut rolled_back = Vec::new();

        loop {
            let result = self.rollback_last_batch(db).await?;
            let Some(batch) = result.batch else {
                break;
            };

            reverted_batches.push(batch);
            rolled_back.extend(result.rolled_back);

            if batch <= 1 {
                break;
            }
        }

        let migration = self.run_migrations(db).await?;

        Ok(RefreshResult {
            reverted_batches,
            rolled_back,
            migration,
        })
    }
}
