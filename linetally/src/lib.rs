pub mod config;
pub mod errors;
pub mod filters;
pub mod results;
pub mod tally;

pub use config::TallyConfig;
pub use errors::{TallyError, TallyResult};
pub use results::{FileTally, TallySummary};
pub use tally::{scan_file, tally, Aggregator, ScanOutcome};
