//! Mock background-job provider for testing
//!
//! This module provides a scripted implementation of the `BackgroundJobProvider`
//! trait. Each submitted job replays a script of poll results, without making
//! real API calls.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    Error,
    llms::{BackgroundJobProvider, JobHandle, JobProgress},
};

/// One scripted answer to a status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockPoll {
    Pending,
    Succeeded(String),
    Failed(String),
    /// The status query itself errors (network blip, HTTP 5xx, ...).
    QueryError(String),
}

impl MockPoll {
    fn to_result(&self) -> Result<JobProgress, Error> {
        match self {
            MockPoll::Pending => Ok(JobProgress::Pending {
                status: "in_progress".to_string(),
            }),
            MockPoll::Succeeded(text) => Ok(JobProgress::Succeeded {
                output_text: text.clone(),
            }),
            MockPoll::Failed(reason) => Ok(JobProgress::Failed { reason: reason.clone() }),
            MockPoll::QueryError(msg) => Err(Error::UnexpectedResponse(msg.clone())),
        }
    }
}

/// What a submitted prompt should lead to.
#[derive(Debug, Clone)]
enum Behavior {
    /// Submission fails outright.
    RejectSubmission(String),
    /// Submission succeeds and polls replay this script; the last entry repeats forever.
    Script(Vec<MockPoll>),
}

#[derive(Debug)]
struct Job {
    script: Vec<MockPoll>,
    next: usize,
}

#[derive(Debug, Default)]
struct State {
    submitted_prompts: Vec<String>,
    jobs: Vec<Job>,
    polls: usize,
}

/// Mock provider for testing
///
/// Can be configured to:
/// - Replay a specific poll script when the prompt contains some text
/// - Replay a default poll script for any other prompt
/// - Reject submissions
pub struct MockJobProvider {
    /// Prompt substrings mapped to behaviors, checked in insertion order.
    behaviors: Vec<(String, Behavior)>,
    default_behavior: Option<Behavior>,
    state: Mutex<State>,
}

impl MockJobProvider {
    /// Create a new mock provider that rejects every prompt.
    pub fn new() -> Self {
        Self {
            behaviors: Vec::new(),
            default_behavior: None,
            state: Mutex::new(State::default()),
        }
    }

    /// Create a mock whose jobs all replay the same script.
    pub fn with_default(script: Vec<MockPoll>) -> Self {
        let mut provider = Self::new();
        provider.set_default(script);
        provider
    }

    /// Create a mock whose jobs immediately succeed with the given output text.
    pub fn with_output(output_text: &str) -> Self {
        Self::with_default(vec![MockPoll::Succeeded(output_text.to_string())])
    }

    /// Jobs for prompts containing `prompt_contains` replay `script`.
    pub fn add_script(&mut self, prompt_contains: &str, script: Vec<MockPoll>) {
        self.behaviors
            .push((prompt_contains.to_string(), Behavior::Script(script)));
    }

    /// Submissions of prompts containing `prompt_contains` fail.
    pub fn add_rejection(&mut self, prompt_contains: &str, message: &str) {
        self.behaviors.push((
            prompt_contains.to_string(),
            Behavior::RejectSubmission(message.to_string()),
        ));
    }

    pub fn set_default(&mut self, script: Vec<MockPoll>) {
        self.default_behavior = Some(Behavior::Script(script));
    }

    /// Every prompt submitted so far, rejected ones included.
    pub fn submitted_prompts(&self) -> Vec<String> {
        self.lock().submitted_prompts.clone()
    }

    /// Number of status queries answered so far, across all jobs.
    pub fn poll_count(&self) -> usize {
        self.lock().polls
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("mock provider state lock poisoned")
    }

    fn behavior_for(&self, prompt: &str) -> Option<&Behavior> {
        self.behaviors
            .iter()
            .find(|(key, _)| prompt.contains(key.as_str()))
            .map(|(_, behavior)| behavior)
            .or(self.default_behavior.as_ref())
    }
}

impl Default for MockJobProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackgroundJobProvider for MockJobProvider {
    async fn submit(&self, prompt: &str) -> Result<JobHandle, Error> {
        let behavior = self.behavior_for(prompt).cloned();
        let mut state = self.lock();
        state.submitted_prompts.push(prompt.to_string());

        match behavior {
            Some(Behavior::Script(script)) if !script.is_empty() => {
                state.jobs.push(Job { script, next: 0 });
                Ok(JobHandle::new(format!("mock-job-{}", state.jobs.len() - 1)))
            }
            Some(Behavior::RejectSubmission(message)) => Err(Error::UnexpectedResponse(message)),
            _ => Err(Error::UnexpectedResponse(
                "Mock provider has no script configured for this prompt".to_string(),
            )),
        }
    }

    async fn progress(&self, job: &JobHandle) -> Result<JobProgress, Error> {
        let mut state = self.lock();
        state.polls += 1;

        let index = job
            .job_id
            .strip_prefix("mock-job-")
            .and_then(|n| n.parse::<usize>().ok())
            .ok_or_else(|| Error::UnexpectedResponse(format!("Unknown job id: {}", job.job_id)))?;
        let job = state
            .jobs
            .get_mut(index)
            .ok_or_else(|| Error::UnexpectedResponse(format!("Unknown job id: {}", job.job_id)))?;

        let step = job.script[job.next.min(job.script.len() - 1)].clone();
        job.next += 1;
        step.to_result()
    }
}
