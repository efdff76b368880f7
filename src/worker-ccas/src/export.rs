use std::io::Write;

use data_model_ccas::{
    db::DbPool,
    models::{CITY_COLUMNS, CityRecord},
    schema::ccas_city,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::errors::Error;

/// Writes every `ccas_city` row as CSV, ordered by id, under a header of the table's
/// column names. NULL columns become empty fields. Returns the number of rows written.
pub async fn export_csv<W: Write>(pool: &DbPool, output: W) -> Result<usize, Error> {
    let records: Vec<CityRecord> = {
        let mut conn = pool.get().await?;
        ccas_city::table
            .order(ccas_city::id.asc())
            .select(CityRecord::as_select())
            .load(&mut conn)
            .await?
    };

    // header is written by hand so that an empty table still gets one
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(output);
    writer.write_record(CITY_COLUMNS)?;
    for record in &records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    tracing::debug!("Exported {} rows", records.len());
    Ok(records.len())
}
