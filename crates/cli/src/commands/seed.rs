use sqlshift_engine::{ConfigTrait, FsSeedRepository, MigrationConfig, SeederRunner};

use super::{connect, finish, observer};

/// Run the configured seeders, or `seeders` when given on the command line
pub async fn run(layout: &MigrationConfig, seeders: Vec<String>, json: bool) -> anyhow::Result<()> {
    let layout = if seeders.is_empty() {
        layout.clone()
    } else {
        MigrationConfig {
            seeders,
            ..layout.clone()
        }
    };
    layout.validate()?;

    if layout.seeders.is_empty() {
        anyhow::bail!("No seeders configured; set SQLSHIFT_SEEDERS or pass --seeder");
    }

    let runner = SeederRunner::new(
        FsSeedRepository::new(layout.seeders_dir()),
        layout.seeders.clone(),
    )
    .with_observer(observer(json));

    let mut db = connect(&layout).await?;
    let outcome = runner.run(&mut db).await;
    let result = finish(db, outcome).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }
    Ok(())
}
