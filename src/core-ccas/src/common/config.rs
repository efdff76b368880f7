use std::path::PathBuf;

use crate::common::env_vars::{TimeUnit, duration_var, number_var, required_var, var_or};
use crate::poller::PollSettings;

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const API_BASE_VAR: &str = "OPENAI_API_BASE";
pub const MODEL_VAR: &str = "CCAS_MODEL";
pub const DATABASE_PATH_VAR: &str = "CCAS_DATABASE_PATH";
pub const MAX_RETRIES_VAR: &str = "CCAS_MAX_RETRIES";
pub const POLL_INTERVAL_VAR: &str = "CCAS_POLL_INTERVAL_S";
pub const JOB_TIMEOUT_VAR: &str = "CCAS_JOB_TIMEOUT_MIN";

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "o3-deep-research";
pub const DEFAULT_DATABASE_PATH: &str = "ccas_city.db";
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_POLL_INTERVAL_S: u64 = 1;
pub const DEFAULT_JOB_TIMEOUT_MIN: u64 = 20;

#[derive(Debug)]
pub enum ConfigError {
    MissingVariable(String),
    MissingDatabase(PathBuf),
    InvalidNumber {
        var_name: String,
        value: String,
        reason: String,
    },
}

impl std::error::Error for ConfigError {}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingVariable(name) => {
                write!(f, "{} must be set in .env file or present as an env var", name)
            }
            Self::MissingDatabase(path) => write!(f, "Database file does not exist: {}", path.display()),
            Self::InvalidNumber {
                var_name,
                value,
                reason,
            } => write!(f, "{} must be a valid number, got '{}': {}", var_name, value, reason),
        }
    }
}

/// Everything needed to reach the model provider.
#[derive(Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

/// Configuration for one run of the research pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub provider: ProviderSettings,
    pub poll: PollSettings,
    pub database_path: PathBuf,
}

impl PipelineConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    /// Fails if the credential is missing or the database file doesn't exist.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = required_var(&lookup, API_KEY_VAR)?;

        let database_path = PathBuf::from(var_or(&lookup, DATABASE_PATH_VAR, DEFAULT_DATABASE_PATH));
        if !database_path.is_file() {
            return Err(ConfigError::MissingDatabase(database_path));
        }

        let poll = PollSettings {
            max_retries: number_var(&lookup, MAX_RETRIES_VAR, DEFAULT_MAX_RETRIES)?,
            poll_interval: duration_var(&lookup, TimeUnit::Seconds, POLL_INTERVAL_VAR, DEFAULT_POLL_INTERVAL_S)?,
            job_timeout: duration_var(&lookup, TimeUnit::Minutes, JOB_TIMEOUT_VAR, DEFAULT_JOB_TIMEOUT_MIN)?,
        };

        Ok(Self {
            provider: ProviderSettings {
                api_key,
                api_base: var_or(&lookup, API_BASE_VAR, DEFAULT_API_BASE),
                model: var_or(&lookup, MODEL_VAR, DEFAULT_MODEL),
            },
            poll,
            database_path,
        })
    }
}

/// Database path for the offline tools (seeding, export), which don't need a credential.
pub fn database_path_from_env() -> PathBuf {
    PathBuf::from(var_or(
        &|name: &str| std::env::var(name).ok(),
        DATABASE_PATH_VAR,
        DEFAULT_DATABASE_PATH,
    ))
}
