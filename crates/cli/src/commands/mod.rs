pub mod migrate;
pub mod seed;

use std::sync::Arc;

use sqlshift_engine::{
    ConfigTrait, DatabaseConfig, MigrateResult, MigrationConfig, MigrationObserver,
    NoopObserver, PostgresDatabase,
};

use crate::reporter::ConsoleObserver;

/// Open the single connection used for the whole run
pub(crate) async fn connect(layout: &MigrationConfig) -> anyhow::Result<PostgresDatabase> {
    let config = DatabaseConfig::from_env()?;
    config.validate()?;

    tracing::info!(url = %config.display_url(), table = %layout.migrations_table, "connecting");
    let db = PostgresDatabase::connect(&config.connect_options(), &layout.migrations_table).await?;
    Ok(db)
}

/// Close the connection whatever the outcome, then surface the outcome
pub(crate) async fn finish<T>(db: PostgresDatabase, outcome: MigrateResult<T>) -> anyhow::Result<T> {
    let closed = db.close().await;

    match (outcome, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close_err)) => Err(close_err.into()),
        (Err(e), closed) => {
            if let Err(close_err) = closed {
                tracing::warn!(error = %close_err, "failed to close connection after error");
            }
            Err(e.into())
        }
    }
}

/// Status lines on the console, or nothing when printing JSON
pub(crate) fn observer(json: bool) -> Arc<dyn MigrationObserver> {
    if json {
        Arc::new(NoopObserver)
    } else {
        Arc::new(ConsoleObserver)
    }
}
