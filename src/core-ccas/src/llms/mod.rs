pub mod openai;
pub mod prompts;

#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;

use async_trait::async_trait;
use tokio::time::Instant;

pub use openai::OpenAiBackground;
pub use prompts::prompt_research_city;

use crate::Error;

/// Handle on a job that the provider is working on in the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub job_id: String,
    /// When we submitted the job. The poller measures its timeout from here.
    pub submitted_at: Instant,
}

impl JobHandle {
    pub fn new(job_id: String) -> Self {
        Self {
            job_id,
            submitted_at: Instant::now(),
        }
    }
}

/// What the provider reports about a background job on a single poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobProgress {
    /// Still queued or running. Holds the provider's raw status.
    Pending { status: String },
    /// Finished: the model's output text.
    Succeeded { output_text: String },
    /// Finished without a usable result.
    Failed { reason: String },
}

/// Interface to a hosted LLM that runs prompts as asynchronous background jobs.
#[async_trait]
pub trait BackgroundJobProvider {
    /// Starts a background job for the prompt.
    async fn submit(&self, prompt: &str) -> Result<JobHandle, Error>;

    /// Asks the provider for the job's current state.
    async fn progress(&self, job: &JobHandle) -> Result<JobProgress, Error>;
}
