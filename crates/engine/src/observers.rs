//! Progress hooks for migrate, rollback, refresh and seed runs
//!
//! The engine reports each step to a [`MigrationObserver`] before and after
//! touching the database. All methods default to no-ops.

use async_trait::async_trait;

use crate::migrations::definitions::MigrationDirection;

#[async_trait]
pub trait MigrationObserver: Send + Sync {
    /// A migrate run is about to record under `batch`, or a rollback is about to revert it
    async fn batch_started(&self, _direction: MigrationDirection, _batch: i32) {}

    /// Change-set already applied, nothing executed
    async fn change_set_skipped(&self, _name: &str) {}

    async fn change_set_started(&self, _direction: MigrationDirection, _name: &str) {}

    async fn change_set_completed(&self, _direction: MigrationDirection, _name: &str) {}

    async fn batch_finished(&self, _direction: MigrationDirection, _batch: i32) {}

    /// Rollback found an empty tracking table
    async fn nothing_to_revert(&self) {}

    async fn seed_started(&self, _name: &str) {}

    async fn seed_completed(&self, _name: &str, _statements: usize) {}
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl MigrationObserver for NoopObserver {}
