use console::style;
use sqlshift_engine::{FsChangeSetRepository, MigrationConfig, MigrationRunner};

use super::{connect, finish, observer};
use crate::reporter::status_line;

fn runner(layout: &MigrationConfig, json: bool) -> MigrationRunner<FsChangeSetRepository> {
    MigrationRunner::new(FsChangeSetRepository::new(layout.migrations_dir()))
        .with_observer(observer(json))
}

pub async fn run(layout: &MigrationConfig, json: bool) -> anyhow::Result<()> {
    let runner = runner(layout, json);
    let mut db = connect(layout).await?;
    let outcome = runner.run_migrations(&mut db).await;
    let result = finish(db, outcome).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.applied.is_empty() {
        println!("{}", style("Nothing to migrate").yellow());
    }
    Ok(())
}

pub async fn rollback(layout: &MigrationConfig, json: bool) -> anyhow::Result<()> {
    let runner = runner(layout, json);
    let mut db = connect(layout).await?;
    let outcome = runner.rollback_last_batch(&mut db).await;
    let result = finish(db, outcome).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }
    Ok(())
}

pub async fn refresh(layout: &MigrationConfig, json: bool) -> anyhow::Result<()> {
    let runner = runner(layout, json);
    let mut db = connect(layout).await?;
    let outcome = runner.refresh(&mut db).await;
    let result = finish(db, outcome).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "{}",
            style(format!(
                "Refreshed: reverted {} batch(es), re-applied {} change-set(s) as batch {}",
                result.reverted_batches.len(),
                result.migration.applied.len(),
                result.migration.batch
            ))
            .blue()
        );
    }
    Ok(())
}

pub async fn status(layout: &MigrationConfig, json: bool) -> anyhow::Result<()> {
    let runner = runner(layout, json);
    let mut db = connect(layout).await?;
    let outcome = runner.get_migration_status(&mut db).await;
    let entries = finish(db, outcome).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Migration Status:");
    println!("================");
    if entries.is_empty() {
        println!("No change-sets found in {}", layout.migrations_dir().display());
    }
    for entry in &entries {
        println!("{}", status_line(entry));
    }
    Ok(())
}

pub fn create(layout: &MigrationConfig, name: &str) -> anyhow::Result<()> {
    let repository = FsChangeSetRepository::new(layout.migrations_dir());
    let change_set = repository.create(name)?;

    println!(
        "{}",
        style(format!(
            "Created change-set: {}",
            repository.root().join(&change_set).display()
        ))
        .green()
    );
    Ok(())
}
