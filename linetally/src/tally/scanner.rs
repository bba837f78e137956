use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::{trace, warn};

use super::matcher::LineMatcher;

const BUFFER_CAPACITY: usize = 65536;

/// Outcome of scanning one file.
///
/// A failed scan is kept distinct from a genuine zero so callers can tell an
/// empty file from an unreadable one; [`ScanOutcome::count`] collapses both
/// to the number that feeds the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanOutcome {
    Counted(u64),
    Failed,
}

impl ScanOutcome {
    /// Contribution of this outcome to the total
    pub fn count(&self) -> u64 {
        match self {
            ScanOutcome::Counted(n) => *n,
            ScanOutcome::Failed => 0,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ScanOutcome::Failed)
    }
}

/// Counts the lines read from `reader` that `matcher` accepts.
///
/// Lines are split on `\n` with one trailing `\r` removed. A final line with
/// no terminating newline still counts.
pub fn count_matching_lines<R: BufRead>(mut reader: R, matcher: &LineMatcher) -> io::Result<u64> {
    let mut count = 0;
    let mut line = Vec::with_capacity(256);

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        let mut content = line.as_slice();
        if let Some(stripped) = content.strip_suffix(b"\n") {
            content = stripped;
        }
        if let Some(stripped) = content.strip_suffix(b"\r") {
            content = stripped;
        }
        if matcher.is_match(content) {
            count += 1;
        }
    }

    Ok(count)
}

/// Scans one file for lines containing `target`.
///
/// Never returns an error: an open or read failure is logged and reported as
/// [`ScanOutcome::Failed`].
pub fn scan_file(path: &Path, target: &str) -> ScanOutcome {
    scan_with(path, &LineMatcher::new(target))
}

pub(crate) fn scan_with(path: &Path, matcher: &LineMatcher) -> ScanOutcome {
    trace!("Scanning file: {}", path.display());

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            warn!("Failed to open {}: {}", path.display(), e);
            return ScanOutcome::Failed;
        }
    };

    let reader = BufReader::with_capacity(BUFFER_CAPACITY, file);
    match count_matching_lines(reader, matcher) {
        Ok(count) => {
            trace!("Counted {} matching lines in {}", count, path.display());
            ScanOutcome::Counted(count)
        }
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            ScanOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use tempfile::tempdir;

    fn count(text: &[u8], target: &str) -> u64 {
        count_matching_lines(Cursor::new(text), &LineMatcher::new(target)).unwrap()
    }

    #[test]
    fn test_counts_lines_not_occurrences() {
        assert_eq!(count(b"TODO TODO\nnothing\nTODO\n", "TODO"), 2);
    }

    #[test]
    fn test_line_endings() {
        assert_eq!(count(b"", "x"), 0);
        assert_eq!(count(b"x", "x"), 1);
        assert_eq!(count(b"x\r\nx\r\ny", "x"), 2);
        assert_eq!(count(b"ab\r\n", "b\r"), 0);
    }

    #[test]
    fn test_empty_target_counts_every_line() {
        assert_eq!(count(b"", ""), 0);
        assert_eq!(count(b"\n", ""), 1);
        assert_eq!(count(b"one\n\nthree", ""), 3);
    }

    #[test]
    fn test_case_sensitive() {
        assert_eq!(count(b"Pools\npools\nPOOLS\n", "Pools"), 1);
    }

    #[test]
    fn test_scan_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sample.txt");
        std::fs::write(&path, "alpha\nbeta alpha\ngamma\n").unwrap();

        assert_eq!(scan_file(&path, "alpha"), ScanOutcome::Counted(2));
        assert_eq!(scan_file(&path, "delta"), ScanOutcome::Counted(0));
    }

    #[test]
    fn test_missing_file_is_failed_not_zero() {
        let dir = tempdir().unwrap();
        let outcome = scan_file(&dir.path().join("missing.txt"), "alpha");
        assert_eq!(outcome, ScanOutcome::Failed);
        assert_eq!(outcome.count(), 0);
        assert!(outcome.is_failed());
    }

    #[test]
    fn test_directory_is_failed() {
        let dir = tempdir().unwrap();
        assert_eq!(scan_file(dir.path(), "alpha"), ScanOutcome::Failed);
    }

    struct BrokenReader {
        served: bool,
    }

    impl Read for BrokenReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::new(io::ErrorKind::Other, "disk went away"));
            }
            self.served = true;
            let data = b"alpha\nalpha\n";
            buf[..data.len()].copy_from_slice(data);
            Ok(data.len())
        }
    }

    #[test]
    fn test_read_error_mid_scan_discards_partial_count() {
        let reader = BufReader::new(BrokenReader { served: false });
        let result = count_matching_lines(reader, &LineMatcher::new("alpha"));
        assert!(result.is_err());
    }
}
