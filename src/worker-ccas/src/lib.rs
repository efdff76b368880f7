pub mod cli;
pub mod errors;
pub mod export;
pub mod seed;
pub mod work;

pub use errors::Error;

pub use export::export_csv;
pub use seed::{SeedSummary, seed_cities};
pub use work::{RowOutcome, RunSummary, mark_failed, pending_records, process_record, run_pending, submit, write_result};
