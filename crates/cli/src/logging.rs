//! Tracing setup for the CLI
//!
//! Logs go to stderr so stdout carries only the colored status lines or the
//! JSON result.

use std::collections::HashMap;
use std::env;
use std::io;

use sqlshift_engine::{ConfigError, ConfigSource, ConfigTrait};
use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const FORMATS: [&str; 3] = ["compact", "pretty", "json"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl ConfigTrait for LoggingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let level = env::var("LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());
        let format = env::var("LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

        Ok(LoggingConfig { level, format })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "level".to_string(),
                value: self.level.clone(),
                expected: "trace, debug, info, warn, or error".to_string(),
            });
        }

        if !FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "format".to_string(),
                value: self.format.clone(),
                expected: "compact, pretty, or json".to_string(),
            });
        }

        Ok(())
    }

    fn config_sources(&self) -> HashMap<String, ConfigSource> {
        let mut sources = HashMap::new();
        sources.insert("level".to_string(), ConfigSource::EnvVar("LOG_LEVEL".to_string()));
        sources.insert("format".to_string(), ConfigSource::EnvVar("LOG_FORMAT".to_string()));
        sources
    }
}

/// Read `LOG_LEVEL`/`LOG_FORMAT` and install the global subscriber
pub fn init_from_env(verbose: bool) -> anyhow::Result<()> {
    let mut config = LoggingConfig::from_env()?;
    if verbose {
        config.level = "debug".to_string();
    }
    config.validate()?;
    init_logging(&config)
}

/// Install the global subscriber; `RUST_LOG` wins over the configured level
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.level.to_lowercase()))?;

    let result = match config.format.to_lowercase().as_str() {
        "json" => tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stderr).json())
            .try_init(),
        "pretty" => tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stderr).pretty())
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(filter)
            .with(Layer::new().with_writer(io::stderr).compact())
            .try_init(),
    };

    result.map_err(|e| anyhow::anyhow!("tracing subscriber already installed: {}", e))
}
