use std::io::Read;

use data_model_ccas::{
    db::{DbPool, create_schema},
    models::NewCity,
    schema::ccas_city,
};
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::errors::Error;

/// Counts from loading a city list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Usable lines in the city list.
    pub read: usize,
    /// Lines that became new pending rows. The rest were already in the table.
    pub inserted: usize,
    /// Lines without a country or a city.
    pub skipped: usize,
}

impl std::fmt::Display for SeedSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} cities read, {} inserted, {} already present, {} skipped",
            self.read,
            self.inserted,
            self.read - self.inserted,
            self.skipped
        )
    }
}

/// Creates `ccas_city` if needed and adds one pending row per line of a CSV city list
/// (`country,city[,education_level]`). Targets already in the table are left as they are.
pub async fn seed_cities<R: Read>(pool: &DbPool, input: R) -> Result<SeedSummary, Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);

    let mut summary = SeedSummary::default();
    let mut cities: Vec<NewCity> = Vec::new();
    for row in reader.deserialize::<NewCity>() {
        let city = row?;
        if city.country.is_empty() || city.city.is_empty() {
            tracing::warn!("[SKIP] City list line without country or city: {:?}", city);
            summary.skipped += 1;
            continue;
        }
        cities.push(city);
    }
    summary.read = cities.len();

    let mut conn = pool.get().await?;
    create_schema(&mut conn).await?;

    summary.inserted = conn
        .transaction::<_, diesel::result::Error, _>(|conn| {
            Box::pin(async move {
                let mut inserted = 0;
                for city in &cities {
                    inserted += diesel::insert_or_ignore_into(ccas_city::table)
                        .values(city)
                        .execute(conn)
                        .await?;
                }
                Ok(inserted)
            })
        })
        .await?;

    tracing::debug!("{}", summary);
    Ok(summary)
}
