//! Colored status lines on stdout

use async_trait::async_trait;
use console::style;
use sqlshift_engine::{ChangeSetStatus, MigrationDirection, MigrationObserver, MigrationStatus};

/// Prints one colored line per engine step
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver;

#[async_trait]
impl MigrationObserver for ConsoleObserver {
    async fn batch_started(&self, direction: MigrationDirection, batch: i32) {
        let verb = match direction {
            MigrationDirection::Up => "Migrating",
            MigrationDirection::Down => "Reverting",
        };
        println!("{}", style(format!("{} batch number {}", verb, batch)).magenta());
    }

    async fn change_set_skipped(&self, name: &str) {
        println!("{}", style(format!("{} already migrated", name)).yellow());
    }

    async fn change_set_started(&self, direction: MigrationDirection, name: &str) {
        let verb = match direction {
            MigrationDirection::Up => "Migrating",
            MigrationDirection::Down => "Rolling back",
        };
        println!("{}", style(format!("{} {}", verb, name)).cyan());
    }

    async fn change_set_completed(&self, _direction: MigrationDirection, _name: &str) {
        println!("{}", style("Completed").green());
    }

    async fn batch_finished(&self, direction: MigrationDirection, _batch: i32) {
        let message = match direction {
            MigrationDirection::Up => "Finished migrating",
            MigrationDirection::Down => "Finished reverting",
        };
        println!("{}", style(message).blue());
    }

    async fn nothing_to_revert(&self) {
        println!("{}", style("No migrations to revert").yellow());
    }

    async fn seed_started(&self, name: &str) {
        println!("{}", style(format!("Seeding {}", name)).cyan());
    }

    async fn seed_completed(&self, _name: &str, _statements: usize) {
        println!("{}", style("Completed").green());
    }
}

/// One status line per change-set
pub fn status_line(entry: &ChangeSetStatus) -> String {
    match entry.status {
        MigrationStatus::Applied { batch } => style(format!("  ✔ {} (batch {})", entry.name, batch))
            .green()
            .to_string(),
        MigrationStatus::Pending => style(format!("  ⏳ {}", entry.name)).yellow().to_string(),
        MigrationStatus::Orphaned { batch } => style(format!(
            "  ✖ {} (batch {}, change-set missing on disk)",
            entry.name, batch
        ))
        .red()
        .to_string(),
    }
}
