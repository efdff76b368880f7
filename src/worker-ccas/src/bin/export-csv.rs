use std::{fs::File, io::BufWriter, path::Path, path::PathBuf, process::ExitCode};

use clap::Parser;
use core_ccas::{ConfigError, database_path_from_env, setup_logging};
use data_model_ccas::db::establish_connection_pool;
use worker_ccas::{Error, cli::validate_output_file, export_csv};

#[derive(Parser)]
#[command(name = "export-csv")]
#[command(about = "Writes the ccas_city table to a CSV file", long_about = None)]
struct ExportCli {
    /// Output file path for the CSV export
    #[arg(short, long, value_parser = validate_output_file)]
    output: PathBuf,
    /// SQLite database to read. Defaults to $CCAS_DATABASE_PATH.
    #[arg(short, long)]
    database: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    setup_logging("worker_ccas=info");

    let cli = ExportCli::parse();
    let database = cli.database.unwrap_or_else(database_path_from_env);

    match export(&database, &cli.output).await {
        Ok(rows) => {
            tracing::info!("Wrote {} rows to {}", rows, cli.output.display());
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!("Cannot export {}: {}", database.display(), error);
            ExitCode::FAILURE
        }
    }
}

async fn export(database: &Path, output: &Path) -> Result<usize, Error> {
    // opening a missing file would create an empty database
    if !database.is_file() {
        return Err(ConfigError::MissingDatabase(database.to_path_buf()).into());
    }
    let pool = establish_connection_pool(database).await?;
    export_csv(&pool, BufWriter::new(File::create(output)?)).await
}
