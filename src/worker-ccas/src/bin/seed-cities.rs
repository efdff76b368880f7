use std::{fs::File, path::Path, path::PathBuf, process::ExitCode};

use clap::Parser;
use core_ccas::{database_path_from_env, setup_logging};
use data_model_ccas::db::establish_connection_pool;
use worker_ccas::{Error, SeedSummary, cli::validate_input_file, seed_cities};

#[derive(Parser)]
#[command(name = "seed-cities")]
#[command(about = "Adds a city list to the ccas_city table as pending rows", long_about = None)]
struct SeedCli {
    /// CSV file with a `country,city` header and an optional `education_level` column.
    #[arg(short, long, value_parser = validate_input_file)]
    cities: PathBuf,
    /// SQLite database to fill, created when missing. Defaults to $CCAS_DATABASE_PATH.
    #[arg(short, long)]
    database: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    setup_logging("worker_ccas=info");

    let cli = SeedCli::parse();
    let database = cli.database.unwrap_or_else(database_path_from_env);

    match seed(&cli.cities, &database).await {
        Ok(summary) => {
            tracing::info!("Seeded {}: {}", database.display(), summary);
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!("Cannot seed {} from {}: {}", database.display(), cli.cities.display(), error);
            ExitCode::FAILURE
        }
    }
}

async fn seed(cities: &Path, database: &Path) -> Result<SeedSummary, Error> {
    let input = File::open(cities)?;
    let pool = establish_connection_pool(database).await?;
    seed_cities(&pool, input).await
}
