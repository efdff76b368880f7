pub mod errors;
pub mod llms;
pub mod poller;
pub mod research;

pub mod common {
    pub mod config;
    pub mod env_vars;
    pub mod logging;
}

pub use common::config::{ConfigError, PipelineConfig, ProviderSettings, database_path_from_env};
pub use common::env_vars::TimeUnit;
pub use common::logging::setup_logging;
pub use errors::Error;
pub use poller::{PollOutcome, PollSettings, poll_until_done};
pub use research::{RESEARCH_FIELDS, ResearchFields, parse_research_payload};
