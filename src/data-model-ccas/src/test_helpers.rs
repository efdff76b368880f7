//! Test utilities for database operations
//!
//! Every test gets its own SQLite file inside a temporary directory, so tests can run
//! in parallel without sharing state. The directory is removed when the `TestDb` drops.

use std::path::{Path, PathBuf};

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tempfile::TempDir;

use crate::db::{DbPool, create_schema, establish_connection_pool};
use crate::models::{CityRecord, NewCity};
use crate::schema::ccas_city;

/// A fresh database with the `ccas_city` table already created.
pub struct TestDb {
    pub pool: DbPool,
    path: PathBuf,
    _dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let path = dir.path().join("ccas_city.db");

        let pool = establish_connection_pool(&path)
            .await
            .expect("Failed to create test database pool");
        {
            let mut conn = pool.get().await.expect("Failed to get database connection");
            create_schema(&mut conn).await.expect("Failed to create ccas_city table");
        }

        Self {
            pool,
            path,
            _dir: dir,
        }
    }

    /// Location of the SQLite file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Insert a pending city row and return it as stored.
pub async fn insert_city(pool: &DbPool, country: &str, city: &str) -> CityRecord {
    insert_city_with_status(pool, country, city, "", None).await
}

/// Insert a city row with an explicit education level and `job_status`.
pub async fn insert_city_with_status(
    pool: &DbPool,
    country: &str,
    city: &str,
    education_level: &str,
    job_status: Option<&str>,
) -> CityRecord {
    let mut conn = pool.get().await.expect("Failed to get database connection");
    let new_city = NewCity::new(country, city, education_level);

    diesel::insert_into(ccas_city::table)
        .values((&new_city, ccas_city::job_status.eq(job_status)))
        .execute(&mut conn)
        .await
        .expect("Failed to insert test city");

    ccas_city::table
        .filter(ccas_city::country.eq(&new_city.country))
        .filter(ccas_city::city.eq(&new_city.city))
        .filter(ccas_city::education_level.eq(&new_city.education_level))
        .select(CityRecord::as_select())
        .first(&mut conn)
        .await
        .expect("Failed to read back test city")
}

/// Get a city row by id
pub async fn get_city_by_id(pool: &DbPool, id: i32) -> Option<CityRecord> {
    let mut conn = pool.get().await.expect("Failed to get database connection");

    ccas_city::table
        .find(id)
        .select(CityRecord::as_select())
        .first(&mut conn)
        .await
        .ok()
}

/// All city rows, ordered by id
pub async fn all_cities(pool: &DbPool) -> Vec<CityRecord> {
    let mut conn = pool.get().await.expect("Failed to get database connection");

    ccas_city::table
        .order(ccas_city::id.asc())
        .select(CityRecord::as_select())
        .load(&mut conn)
        .await
        .expect("Failed to load cities")
}

/// Overwrite a row's `job_status`
pub async fn set_job_status(pool: &DbPool, id: i32, job_status: Option<&str>) {
    let mut conn = pool.get().await.expect("Failed to get database connection");

    diesel::update(ccas_city::table.find(id))
        .set(ccas_city::job_status.eq(job_status))
        .execute(&mut conn)
        .await
        .expect("Failed to update job status");
}
