//! PostgreSQL state store and script executor
//!
//! Owns exactly one connection for the duration of a run.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, Executor, Row};

use super::{ScriptExecutor, StateStore};
use crate::config::is_sql_identifier;
use crate::error::{MigrateError, MigrateResult};
use crate::migrations::definitions::AppliedRecord;

/// SQLSTATE for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// A single PostgreSQL session used for one migrate, rollback, refresh or seed run
pub struct PostgresDatabase {
    conn: PgConnection,
    table: String,
}

impl PostgresDatabase {
    /// Open the connection for this run
    pub async fn connect(options: &PgConnectOptions, table: &str) -> MigrateResult<Self> {
        if !is_sql_identifier(table) {
            return Err(MigrateError::StoreUnavailable(format!(
                "'{}' is not a valid tracking table name",
                table
            )));
        }

        let conn = PgConnection::connect_with(options)
            .await
            .map_err(|e| MigrateError::Connection(format!("Failed to connect to database: {}", e)))?;

        Ok(Self::from_connection(conn, table))
    }

    /// Wrap an already open connection
    pub fn from_connection(conn: PgConnection, table: &str) -> Self {
        Self {
            conn,
            table: table.to_string(),
        }
    }

    /// Close the session, flushing the terminate message to the server
    pub async fn close(self) -> MigrateResult<()> {
        self.conn
            .close()
            .await
            .map_err(|e| MigrateError::Connection(format!("Failed to close connection: {}", e)))
    }
}

fn create_table_sql(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    \
            id SERIAL PRIMARY KEY,\n    \
            name VARCHAR(100) NOT NULL UNIQUE,\n    \
            batch INT NOT NULL\n\
        )",
        table
    )
}

/// A unique violation means the name is already tracked
fn record_error(name: &str, error: sqlx::Error) -> MigrateError {
    match &error {
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
            MigrateError::DuplicateName(name.to_string())
        }
        _ => MigrateError::StoreUnavailable(format!(
            "Failed to record migration {}: {}",
            name, error
        )),
    }
}

#[async_trait]
impl StateStore for PostgresDatabase {
    async fn ensure_schema(&mut self) -> MigrateResult<()> {
        let sql = create_table_sql(&self.table);
        sqlx::query(&sql).execute(&mut self.conn).await.map_err(|e| {
            MigrateError::StoreUnavailable(format!("Failed to create {} table: {}", self.table, e))
        })?;
        Ok(())
    }

    async fn list_applied(&mut self) -> MigrateResult<Vec<AppliedRecord>> {
        let sql = format!("SELECT id, name, batch FROM {}", self.table);
        let rows = sqlx::query(&sql).fetch_all(&mut self.conn).await.map_err(|e| {
            MigrateError::StoreUnavailable(format!("Failed to query applied migrations: {}", e))
        })?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let id: i32 = row
                .try_get("id")
                .map_err(|e| MigrateError::StoreUnavailable(format!("Failed to get id: {}", e)))?;
            let name: String = row
                .try_get("name")
                .map_err(|e| MigrateError::StoreUnavailable(format!("Failed to get name: {}", e)))?;
            let batch: i32 = row
                .try_get("batch")
                .map_err(|e| MigrateError::StoreUnavailable(format!("Failed to get batch: {}", e)))?;

            records.push(AppliedRecord {
                id: i64::from(id),
                name,
                batch,
            });
        }

        Ok(records)
    }

    async fn record_applied(&mut self, name: &str, batch: i32) -> MigrateResult<()> {
        let sql = format!("INSERT INTO {} (name, batch) VALUES ($1, $2)", self.table);
        sqlx::query(&sql)
            .bind(name)
            .bind(batch)
            .execute(&mut self.conn)
            .await
            .map_err(|e| record_error(name, e))?;
        Ok(())
    }

    async fn remove_applied(&mut self, name: &str) -> MigrateResult<()> {
        let sql = format!("DELETE FROM {} WHERE name = $1", self.table);
        sqlx::query(&sql)
            .bind(name)
            .execute(&mut self.conn)
            .await
            .map_err(|e| {
                MigrateError::StoreUnavailable(format!(
                    "Failed to remove migration record {}: {}",
                    name, e
                ))
            })?;
        Ok(())
    }
}

#[async_trait]
impl ScriptExecutor for PostgresDatabase {
    async fn execute_script(&mut self, sql: &str) -> Result<u64, sqlx::Error> {
        // No bind arguments, so sqlx uses the simple query protocol and
        // multi-statement scripts are accepted.
        let result = (&mut self.conn).execute(sql).await?;
        Ok(result.rows_affected())
    }
}
