//! Runner configuration
//!
//! Connection settings and directory layout are read from environment
//! variables. CLI flags may override the layout afterwards.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use sqlx::postgres::PgConnectOptions;
use thiserror::Error;
use url::Url;

/// Configuration loaded from the process environment
pub trait ConfigTrait: Sized {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self, ConfigError>;

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError>;

    /// Get configuration source information for debugging
    fn config_sources(&self) -> HashMap<String, ConfigSource>;
}

/// Where a configuration value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    EnvVar(String),
    Default(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}")]
    MissingEnvVar { var: String },

    #[error("Invalid value for {field}: '{value}', expected {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Validation failed for {field}: {reason}")]
    ValidationFailed { field: String, reason: String },
}

/// PostgreSQL connection settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
}

impl DatabaseConfig {
    /// Connection options for a single sqlx connection
    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.database);

        match &self.password {
            Some(password) => options.password(password),
            None => options,
        }
    }

    /// Connection URL with the password masked, for log output
    pub fn display_url(&self) -> String {
        let base = format!("postgres://{}:{}/{}", self.host, self.port, self.database);
        let Ok(mut url) = Url::parse(&base) else {
            return base;
        };

        if url.set_username(&self.user).is_err() {
            return base;
        }
        if self.password.is_some() && url.set_password(Some("****")).is_err() {
            return base;
        }
        url.to_string()
    }
}

impl ConfigTrait for DatabaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let host = get_env_or_default("DB_HOST", "localhost");
        let port = get_env_or_default("DB_PORT", "5432");
        let port = port.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
            field: "port".to_string(),
            value: port,
            expected: "valid port number (1-65535)".to_string(),
        })?;

        let user = get_env_required("DB_USER")?;
        let password = get_env_optional("DB_PASSWORD");
        let database = get_env_required("DB_NAME")?;

        Ok(DatabaseConfig {
            host,
            port,
            user,
            password,
            database,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "host".to_string(),
                reason: "Host cannot be empty".to_string(),
            });
        }

        if self.port == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "port".to_string(),
                reason: "Port cannot be 0".to_string(),
            });
        }

        if self.user.is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "user".to_string(),
                reason: "User cannot be empty".to_string(),
            });
        }

        if self.database.is_empty() {
            return Err(ConfigError::ValidationFailed {
                field: "database".to_string(),
                reason: "Database name cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    fn config_sources(&self) -> HashMap<String, ConfigSource> {
        let mut sources = HashMap::new();
        sources.insert("host".to_string(), env_source("DB_HOST", "localhost"));
        sources.insert("port".to_string(), env_source("DB_PORT", "5432"));
        sources.insert("user".to_string(), ConfigSource::EnvVar("DB_USER".to_string()));
        sources.insert(
            "password".to_string(),
            ConfigSource::EnvVar("DB_PASSWORD".to_string()),
        );
        sources.insert("database".to_string(), ConfigSource::EnvVar("DB_NAME".to_string()));
        sources
    }
}

/// Layout of the change-set and seed directories and the tracking table
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Root holding `migrations/` and `seeders/`
    pub database_dir: PathBuf,
    /// Table name for tracking applied change-sets
    pub migrations_table: String,
    /// Seed scripts to run, in order
    pub seeders: Vec<String>,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            database_dir: PathBuf::from("database"),
            migrations_table: "migrations".to_string(),
            seeders: vec!["init".to_string()],
        }
    }
}

impl MigrationConfig {
    pub fn migrations_dir(&self) -> PathBuf {
        self.database_dir.join("migrations")
    }

    pub fn seeders_dir(&self) -> PathBuf {
        self.database_dir.join("seeders")
    }
}

impl ConfigTrait for MigrationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let database_dir = PathBuf::from(get_env_or_default("SQLSHIFT_DIR", "database"));
        let migrations_table = get_env_or_default("SQLSHIFT_TABLE", "migrations");
        let seeders = parse_list(&get_env_or_default("SQLSHIFT_SEEDERS", "init"));

        Ok(MigrationConfig {
            database_dir,
            migrations_table,
            seeders,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !is_sql_identifier(&self.migrations_table) {
            return Err(ConfigError::InvalidValue {
                field: "migrations_table".to_string(),
                value: self.migrations_table.clone(),
                expected: "an unquoted SQL identifier of at most 63 characters".to_string(),
            });
        }

        if let Some(seeder) = self.seeders.iter().find(|s| s.contains(['/', '\\'])) {
            return Err(ConfigError::ValidationFailed {
                field: "seeders".to_string(),
                reason: format!("Seeder name '{}' must not contain a path separator", seeder),
            });
        }

        Ok(())
    }

    fn config_sources(&self) -> HashMap<String, ConfigSource> {
        let mut sources = HashMap::new();
        sources.insert("database_dir".to_string(), env_source("SQLSHIFT_DIR", "database"));
        sources.insert(
            "migrations_table".to_string(),
            env_source("SQLSHIFT_TABLE", "migrations"),
        );
        sources.insert("seeders".to_string(), env_source("SQLSHIFT_SEEDERS", "init"));
        sources
    }
}

/// Check that `name` can be spliced into DDL without quoting
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    starts_ok && name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_source(key: &str, default: &str) -> ConfigSource {
    if env::var(key).is_ok() {
        ConfigSource::EnvVar(key.to_string())
    } else {
        ConfigSource::Default(default.to_string())
    }
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn get_env_required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnvVar {
        var: key.to_string(),
    })
}

fn get_env_optional(key: &str) -> Option<String> {
    env::var(key).ok()
}
