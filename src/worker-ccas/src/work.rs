use core_ccas::{
    PollOutcome, PollSettings, ResearchFields, parse_research_payload, poll_until_done,
    llms::{BackgroundJobProvider, JobHandle, prompt_research_city},
};
use data_model_ccas::{
    db::DbPool,
    models::{CityRecord, CityResearchUpdate, ResearchStatus, pending},
    schema::ccas_city,
};
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::Instrument;

use crate::errors::Error;

/// What happened to a single pending row during a run.
#[derive(Debug)]
pub enum RowOutcome {
    /// Research fields were written and the row is `done`.
    Completed,
    /// The job was never created. The row is untouched and stays pending.
    SubmitFailed { error: Error },
    /// The job failed, timed out, or could not be polled. The row is marked `failed`.
    JobFailed { outcome: PollOutcome },
    /// The job's output was not a complete research object. The row stays pending.
    ParseFailed { error: Error },
    /// Writing to the database failed.
    WriteFailed { error: Error },
}

/// Tally of row outcomes for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: usize,
    pub submit_failed: usize,
    pub job_failed: usize,
    pub parse_failed: usize,
    pub write_failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &RowOutcome) {
        match outcome {
            RowOutcome::Completed => self.completed += 1,
            RowOutcome::SubmitFailed { .. } => self.submit_failed += 1,
            RowOutcome::JobFailed { .. } => self.job_failed += 1,
            RowOutcome::ParseFailed { .. } => self.parse_failed += 1,
            RowOutcome::WriteFailed { .. } => self.write_failed += 1,
        }
    }

    /// Number of rows that were attempted.
    pub fn processed(&self) -> usize {
        self.completed + self.submit_failed + self.job_failed + self.parse_failed + self.write_failed
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} rows processed: {} done, {} failed jobs, {} submission errors, {} unparsable outputs, {} write errors",
            self.processed(),
            self.completed,
            self.job_failed,
            self.submit_failed,
            self.parse_failed,
            self.write_failed
        )
    }
}

/// All rows whose `job_status` is NULL or blank, oldest first.
pub async fn pending_records(pool: &DbPool) -> Result<Vec<CityRecord>, Error> {
    let mut conn = pool.get().await?;

    let records = ccas_city::table
        .filter(pending())
        .order(ccas_city::id.asc())
        .select(CityRecord::as_select())
        .load(&mut conn)
        .await?;

    Ok(records)
}

/// Starts the background research job for one row.
pub async fn submit<P>(provider: &P, record: &CityRecord) -> Result<JobHandle, Error>
where
    P: BackgroundJobProvider + ?Sized,
{
    let prompt = prompt_research_city(&record.country, &record.city, &record.education_level)?;
    let job = provider.submit(&prompt).await?;
    Ok(job)
}

/// The row update for a finished job: every research column, and `job_status = 'done'`.
pub fn research_update(fields: &ResearchFields) -> CityResearchUpdate {
    CityResearchUpdate {
        job_status: ResearchStatus::DONE.to_string(),
        ccas_status: fields.ccas_status.clone(),
        ccas_status_source: fields.ccas_status_source.clone(),
        participating_institutions: fields.participating_institutions.clone(),
        participating_institutions_source: fields.participating_institutions_source.clone(),
        preference_list_length: fields.preference_list_length.clone(),
        preference_list_length_source: fields.preference_list_length_source.clone(),
        priority_criteria: fields.priority_criteria.clone(),
        priority_criteria_source: fields.priority_criteria_source.clone(),
        assignment_mechanism: fields.assignment_mechanism.clone(),
        assignment_mechanism_source: fields.assignment_mechanism_source.clone(),
        adoption_year: fields.adoption_year.clone(),
        adoption_year_source: fields.adoption_year_source.clone(),
        reform_year: fields.reform_year.clone(),
        reform_year_source: fields.reform_year_source.clone(),
        notes: fields.notes.clone(),
    }
}

/// Writes every research column and `job_status = 'done'` in one transaction.
/// Only a row that is still pending is updated.
pub async fn write_result(pool: &DbPool, record: &CityRecord, fields: &ResearchFields) -> Result<(), Error> {
    let mut conn = pool.get().await?;
    let update = research_update(fields);

    let updated = conn
        .transaction::<_, diesel::result::Error, _>(|conn| {
            Box::pin(async move {
                diesel::update(ccas_city::table.find(record.id).filter(pending()))
                    .set(&update)
                    .execute(conn)
                    .await
            })
        })
        .await?;

    if updated == 0 {
        return Err(Error::RecordNotFound);
    }
    Ok(())
}

/// Sets `job_status = 'failed'`, leaving the research columns alone.
pub async fn mark_failed(pool: &DbPool, record: &CityRecord) -> Result<(), Error> {
    let mut conn = pool.get().await?;

    let updated = conn
        .transaction::<_, diesel::result::Error, _>(|conn| {
            Box::pin(async move {
                diesel::update(ccas_city::table.find(record.id).filter(pending()))
                    .set(ccas_city::job_status.eq(ResearchStatus::FAILED))
                    .execute(conn)
                    .await
            })
        })
        .await?;

    if updated == 0 {
        return Err(Error::RecordNotFound);
    }
    Ok(())
}

/// Submits, polls, and stores the result for one row. Never fails: every problem is
/// logged and reported as a `RowOutcome` so that the run can move on to the next row.
pub async fn process_record<P>(pool: &DbPool, provider: &P, settings: &PollSettings, record: &CityRecord) -> RowOutcome
where
    P: BackgroundJobProvider + ?Sized,
{
    let label = record.label();

    let job = match submit(provider, record).await {
        Ok(job) => job,
        Err(error) => {
            tracing::error!("[SKIP] Failed to submit research job for {}: {}", label, error);
            return RowOutcome::SubmitFailed { error };
        }
    };
    tracing::info!("[job: {}] Submitted research for {}", job.job_id, label);

    let output_text = match poll_until_done(provider, &job, settings)
        .instrument(tracing::info_span!("city", target = %label))
        .await
    {
        PollOutcome::Succeeded { output_text } => output_text,
        outcome => {
            tracing::error!("[job: {}] Research for {} {}", job.job_id, label, outcome);
            return match mark_failed(pool, record).await {
                Ok(()) => {
                    tracing::debug!("[job: {}] Marked {} as failed", job.job_id, label);
                    RowOutcome::JobFailed { outcome }
                }
                Err(error) => {
                    tracing::error!("[job: {}] Failed to mark {} as failed: {}", job.job_id, label, error);
                    RowOutcome::WriteFailed { error }
                }
            };
        }
    };

    let fields = match parse_research_payload(&output_text) {
        Ok(fields) => fields,
        Err(error) => {
            tracing::warn!(
                "[job: {}] Output for {} is not usable, leaving it pending: {}",
                job.job_id,
                label,
                error
            );
            return RowOutcome::ParseFailed { error: error.into() };
        }
    };

    match write_result(pool, record, &fields).await {
        Ok(()) => {
            tracing::info!(
                "[job: {}] Stored research for {} (ccas_status: {})",
                job.job_id,
                label,
                fields.ccas_status
            );
            RowOutcome::Completed
        }
        Err(error) => {
            tracing::error!("[job: {}] Failed to store research for {}: {}", job.job_id, label, error);
            RowOutcome::WriteFailed { error }
        }
    }
}

/// Researches every pending row, one at a time. Only selecting the pending rows can fail
/// the run; per-row problems end up in the summary.
pub async fn run_pending<P>(pool: &DbPool, provider: &P, settings: &PollSettings) -> Result<RunSummary, Error>
where
    P: BackgroundJobProvider + ?Sized,
{
    let records = pending_records(pool).await?;
    let total = records.len();
    tracing::info!("{} cities left to research", total);

    let mut summary = RunSummary::default();
    for (index, record) in records.iter().enumerate() {
        tracing::info!("[{}/{}] Researching {}", index + 1, total, record.label());
        let outcome = process_record(pool, provider, settings, record).await;
        summary.record(&outcome);
    }

    tracing::info!("{}", summary);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_model_ccas::models::CITY_COLUMNS;

    #[test]
    fn test_research_update_marks_row_done() {
        let fields = ResearchFields {
            ccas_status: "Coordinated".to_string(),
            adoption_year: "2008".to_string(),
            ..ResearchFields::default()
        };
        let update = research_update(&fields);
        assert_eq!(update.job_status, "done");
        assert_eq!(update.ccas_status, "Coordinated");
        assert_eq!(update.adoption_year, "2008");
        assert_eq!(update.notes, "");
    }

    #[test]
    fn test_columns_end_with_research_fields() {
        assert_eq!(&CITY_COLUMNS[5..], &core_ccas::RESEARCH_FIELDS[..]);
    }

    #[test]
    fn test_summary_tally() {
        let mut summary = RunSummary::default();
        summary.record(&RowOutcome::Completed);
        summary.record(&RowOutcome::Completed);
        summary.record(&RowOutcome::JobFailed {
            outcome: PollOutcome::Failed {
                reason: "cancelled".to_string(),
            },
        });
        summary.record(&RowOutcome::ParseFailed {
            error: core_ccas::Error::PayloadNotAnObject.into(),
        });

        assert_eq!(summary.completed, 2);
        assert_eq!(summary.job_failed, 1);
        assert_eq!(summary.parse_failed, 1);
        assert_eq!(summary.processed(), 4);
        assert_eq!(
            summary.to_string(),
            "4 rows processed: 2 done, 1 failed jobs, 0 submission errors, 1 unparsable outputs, 0 write errors"
        );
    }
}
