/// Tally result types.
///
/// A [`FileTally`] is what a single worker reports for its file; a
/// [`TallySummary`] is what the aggregator hands back once every worker has
/// signalled completion. Per-file entries arrive in whatever order workers
/// finish, so `file_tallies` carries no ordering guarantee.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::tally::ScanOutcome;

/// Outcome of scanning a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTally {
    /// The path that was scanned
    pub path: PathBuf,
    /// Count, or failure marker
    pub outcome: ScanOutcome,
}

impl FileTally {
    pub fn new(path: impl Into<PathBuf>, outcome: ScanOutcome) -> Self {
        Self {
            path: path.into(),
            outcome,
        }
    }
}

/// Combined result of a tally run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallySummary {
    /// Results per file
    pub file_tallies: Vec<FileTally>,
    /// Sum of matching lines over all files
    pub total: u64,
    /// Number of files a worker was dispatched for
    pub files_scanned: usize,
    /// Number of files with at least one matching line
    pub files_with_matches: usize,
    /// Number of files that could not be opened or read
    pub files_failed: usize,
}

impl TallySummary {
    /// Creates a new empty summary
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds one worker's result to the summary
    pub fn add_file_tally(&mut self, file_tally: FileTally) {
        self.files_scanned += 1;
        let count = file_tally.outcome.count();
        self.total += count;
        if file_tally.outcome.is_failed() {
            self.files_failed += 1;
        } else if count > 0 {
            self.files_with_matches += 1;
        }
        self.file_tallies.push(file_tally);
    }

    /// Sorts the per-file entries by path for stable display
    pub fn sort_by_path(&mut self) {
        self.file_tallies.sort_by(|a, b| a.path.cmp(&b.path));
    }
}
