use std::process::ExitCode;

use core_ccas::{PipelineConfig, llms::OpenAiBackground, setup_logging};
use data_model_ccas::db::establish_connection_pool;

use worker_ccas::{Error, RunSummary, run_pending};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load environment variables from .env file., if it exists
    dotenvy::dotenv().ok();

    setup_logging("worker_ccas=debug,core_ccas=debug");

    match run().await {
        Ok(summary) => {
            tracing::info!("Run finished. {}", summary);
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!("Run aborted: {}", error);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<RunSummary, Error> {
    let config = PipelineConfig::from_env()?;
    tracing::debug!("Using {:?}", config);

    let pool = establish_connection_pool(&config.database_path).await?;
    let provider = OpenAiBackground::new(&config.provider)?;

    run_pending(&pool, &provider, &config.poll).await
}
