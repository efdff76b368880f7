//! Polls a background job until it reaches a terminal outcome.

use std::time::Duration;

use crate::llms::{BackgroundJobProvider, JobHandle, JobProgress};

/// Tunables for waiting on a single background job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSettings {
    /// Failed status queries tolerated per job; one more and the job is abandoned.
    pub max_retries: u32,
    /// Fixed wait between two status queries.
    pub poll_interval: Duration,
    /// Wall-clock budget for the job, measured from submission.
    pub job_timeout: Duration,
}

/// Terminal outcome of polling one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The job finished and produced output text.
    Succeeded { output_text: String },
    /// The provider reported that the job failed, was cancelled, or is incomplete.
    Failed { reason: String },
    /// The job didn't finish within the configured timeout.
    TimedOut { elapsed: Duration },
    /// Too many status queries failed.
    RetriesExhausted { failed_queries: u32, last_error: String },
}

impl std::fmt::Display for PollOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Succeeded { output_text } => write!(f, "succeeded ({} bytes of output)", output_text.len()),
            Self::Failed { reason } => write!(f, "failed: {}", reason),
            Self::TimedOut { elapsed } => write!(f, "timed out after {:?}", elapsed),
            Self::RetriesExhausted {
                failed_queries,
                last_error,
            } => write!(
                f,
                "gave up after {} failed status queries, last error: {}",
                failed_queries, last_error
            ),
        }
    }
}

/// Queries the job's status every `poll_interval` until it succeeds, fails, times out,
/// or more than `max_retries` status queries have errored.
pub async fn poll_until_done<P>(provider: &P, job: &JobHandle, settings: &PollSettings) -> PollOutcome
where
    P: BackgroundJobProvider + ?Sized,
{
    let mut failed_queries: u32 = 0;

    loop {
        match provider.progress(job).await {
            Ok(JobProgress::Succeeded { output_text }) => {
                tracing::debug!("[job: {}] Completed after {:?}", job.job_id, job.submitted_at.elapsed());
                return PollOutcome::Succeeded { output_text };
            }
            Ok(JobProgress::Failed { reason }) => {
                return PollOutcome::Failed { reason };
            }
            Ok(JobProgress::Pending { status }) => {
                tracing::debug!(
                    "[job: {}] status={}, elapsed={:?}",
                    job.job_id,
                    status,
                    job.submitted_at.elapsed()
                );
            }
            Err(error) => {
                failed_queries += 1;
                tracing::warn!(
                    "[job: {}] Status query failed ({}/{} retries used): {}",
                    job.job_id,
                    failed_queries,
                    settings.max_retries,
                    error
                );
                if failed_queries > settings.max_retries {
                    return PollOutcome::RetriesExhausted {
                        failed_queries,
                        last_error: error.to_string(),
                    };
                }
            }
        }

        let elapsed = job.submitted_at.elapsed();
        if elapsed > settings.job_timeout {
            return PollOutcome::TimedOut { elapsed };
        }

        tokio::time::sleep(settings.poll_interval).await;
    }
}
