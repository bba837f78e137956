//! Concurrent line tallying.
//!
//! [`scanner`] counts matching lines in one file. [`aggregator`] fans a list
//! of files out to one worker each and sums the counts they report back.
//! [`engine`] ties both to a [`crate::config::TallyConfig`].
pub mod aggregator;
pub mod engine;
pub mod matcher;
pub mod scanner;

pub use aggregator::{Aggregator, CompletionSignal, Job, WorkerId, WorkerReport};
pub use engine::tally;
pub use matcher::LineMatcher;
pub use scanner::{count_matching_lines, scan_file, ScanOutcome};
