mod commands;
mod logging;
mod reporter;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use console::style;
use sqlshift_engine::{ConfigTrait, MigrationConfig};

use commands::*;

#[derive(Parser, Debug)]
#[command(name = "sqlshift")]
#[command(about = "Batched SQL change-set migrations for PostgreSQL")]
#[command(version)]
struct Cli {
    /// Directory holding migrations/ and seeders/ (overrides SQLSHIFT_DIR)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Tracking table name (overrides SQLSHIFT_TABLE)
    #[arg(long, global = true)]
    table: Option<String>,

    /// Log engine steps at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply every pending change-set as one new batch
    Migrate {
        /// Print the result as JSON instead of status lines
        #[arg(long)]
        json: bool,
    },

    /// Revert the latest batch
    Rollback {
        #[arg(long)]
        json: bool,
    },

    /// Revert every batch, then migrate everything again
    Refresh {
        #[arg(long)]
        json: bool,
    },

    /// Run seed scripts
    Seed {
        /// Seeder to run, repeatable (overrides SQLSHIFT_SEEDERS)
        #[arg(long = "seeder", value_name = "NAME")]
        seeders: Vec<String>,

        #[arg(long)]
        json: bool,
    },

    /// Show which change-sets are applied and in which batch
    Status {
        #[arg(long)]
        json: bool,
    },

    /// Create a new, empty change-set
    Make {
        /// Change-set name, e.g. "create users table"
        name: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init_from_env(cli.verbose) {
        eprintln!("{}", style(format!("Failed to initialise logging: {:#}", e)).red());
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "run aborted");
            eprintln!("{}", style(format!("Error: {:#}", e)).red());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let layout = layout_config(&cli)?;

    match cli.command {
        Commands::Migrate { json } => migrate::run(&layout, json).await,
        Commands::Rollback { json } => migrate::rollback(&layout, json).await,
        Commands::Refresh { json } => migrate::refresh(&layout, json).await,
        Commands::Seed { seeders, json } => seed::run(&layout, seeders, json).await,
        Commands::Status { json } => migrate::status(&layout, json).await,
        Commands::Make { name } => migrate::create(&layout, &name),
    }
}

/// Directory layout from the environment, with CLI flags applied on top
fn layout_config(cli: &Cli) -> anyhow::Result<MigrationConfig> {
    let mut layout = MigrationConfig::from_env()?;

    if let Some(dir) = &cli.dir {
        layout.database_dir = dir.clone();
    }
    if let Some(table) = &cli.table {
        layout.migrations_table = table.clone();
    }

    layout.validate()?;
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_migrate_with_global_flags() {
        let cli = Cli::try_parse_from(["sqlshift", "migrate", "--dir", "db", "--json"]).unwrap();
        assert_eq!(cli.dir, Some(PathBuf::from("db")));
        assert!(matches!(cli.command, Commands::Migrate { json: true }));
    }

    #[test]
    fn test_parse_seed_with_repeated_seeders() {
        let cli = Cli::try_parse_from([
            "sqlshift", "seed", "--seeder", "roles", "--seeder", "users",
        ])
        .unwrap();
        match cli.command {
            Commands::Seed { seeders, json } => {
                assert_eq!(seeders, vec!["roles", "users"]);
                assert!(!json);
            }
            other => panic!("expected seed, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_make_requires_name() {
        assert!(Cli::try_parse_from(["sqlshift", "make"]).is_err());
        let cli = Cli::try_parse_from(["sqlshift", "make", "create users"]).unwrap();
        assert!(matches!(cli.command, Commands::Make { ref name } if name == "create users"));
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(Cli::try_parse_from(["sqlshift", "dry-run"]).is_err());
    }

    #[test]
    #[serial_test::serial]
    fn test_flags_override_layout() {
        std::env::remove_var("SQLSHIFT_DIR");
        std::env::remove_var("SQLSHIFT_TABLE");
        let cli = Cli::try_parse_from([
            "sqlshift", "--table", "schema_history", "status", "--dir", "sql",
        ])
        .unwrap();

        let layout = layout_config(&cli).unwrap();
        assert_eq!(layout.database_dir, PathBuf::from("sql"));
        assert_eq!(layout.migrations_table, "schema_history");

        let bad = Cli::try_parse_from(["sqlshift", "--table", "drop table", "status"]).unwrap();
        assert!(layout_config(&bad).is_err());
    }
}
