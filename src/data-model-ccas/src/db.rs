use std::path::{Path, PathBuf};

use diesel::SqliteConnection;
use diesel_async::SimpleAsyncConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::deadpool::Pool;
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;

pub type DbConnection = SyncConnectionWrapper<SqliteConnection>;

pub type PoolError = deadpool::managed::PoolError<diesel_async::pooled_connection::PoolError>;

pub type DbPool = Pool<DbConnection>;

/// Table layout of `ccas_city`. Safe to run against an existing database.
pub const CREATE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS ccas_city (
    id INTEGER PRIMARY KEY,
    country TEXT NOT NULL,
    city TEXT NOT NULL,
    education_level TEXT NOT NULL DEFAULT '',
    job_status TEXT,
    ccas_status TEXT,
    ccas_status_source TEXT,
    participating_institutions TEXT,
    participating_institutions_source TEXT,
    preference_list_length TEXT,
    preference_list_length_source TEXT,
    priority_criteria TEXT,
    priority_criteria_source TEXT,
    assignment_mechanism TEXT,
    assignment_mechanism_source TEXT,
    adoption_year TEXT,
    adoption_year_source TEXT,
    reform_year TEXT,
    reform_year_source TEXT,
    notes TEXT,
    UNIQUE (country, city, education_level)
);
"#;

#[derive(Debug, thiserror::Error)]
pub enum ConnectionPoolError {
    #[error("Database path is not valid UTF-8: {0:?}")]
    InvalidPath(PathBuf),
    #[error("Failed to build connection pool: {0}")]
    BuildError(#[from] deadpool::managed::BuildError),
    #[error("Failed to establish initial database connection: {0}")]
    ConnectionError(#[from] PoolError),
}

/// Opens the SQLite file at `database_path`, creating it when missing.
pub async fn establish_connection_pool(database_path: &Path) -> Result<DbPool, ConnectionPoolError> {
    let database_url = database_path
        .to_str()
        .ok_or_else(|| ConnectionPoolError::InvalidPath(database_path.to_path_buf()))?;
    let config = AsyncDieselConnectionManager::<DbConnection>::new(database_url);

    // SQLite allows one writer at a time.
    let pool = Pool::builder(config).max_size(1).build()?;

    // Force an initial connection so that an unusable file fails fast
    let _conn = pool.get().await?;

    Ok(pool)
}

pub async fn create_schema(conn: &mut DbConnection) -> Result<(), diesel::result::Error> {
    conn.batch_execute(CREATE_SCHEMA).await
}
