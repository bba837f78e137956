/// Input expansion and file filtering.
///
/// The aggregator works on a flat list of files. Anything the user names
/// explicitly is passed through untouched (a missing file simply tallies as a
/// failure), while directories are walked with `ignore` so `.gitignore` rules,
/// hidden files, extension filters and glob ignore patterns all apply.
use glob::Pattern;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::errors::{TallyError, TallyResult};

/// Compiled glob ignore patterns
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    patterns: Vec<Pattern>,
}

impl IgnoreSet {
    /// Compiles `patterns`, failing on the first invalid one
    pub fn new(patterns: &[String]) -> TallyResult<Self> {
        let patterns = patterns
            .iter()
            .map(|p| Pattern::new(p).map_err(|e| TallyError::invalid_ignore_pattern(p, e)))
            .collect::<TallyResult<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Checks if a path matches any ignore pattern
    pub fn is_ignored(&self, path: &Path) -> bool {
        let normalized = path.to_string_lossy().replace('\\', "/");

        // Always ignore target/ and .git/ directories
        if normalized.contains("/target/") || normalized.contains("/.git/") {
            return true;
        }

        self.patterns.iter().any(|p| p.matches(&normalized))
    }
}

/// Checks if a file has one of the allowed extensions
pub fn has_valid_extension(path: &Path, extensions: &Option<Vec<String>>) -> bool {
    match extensions {
        None => true,
        Some(exts) => path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| exts.iter().any(|e| e.eq_ignore_ascii_case(ext))),
    }
}

/// Checks if a file is likely to be binary
pub fn is_likely_binary(path: &Path) -> bool {
    const BINARY_EXTENSIONS: &[&str] = &[
        "exe", "dll", "so", "dylib", "bin", "obj", "o", "class", "jar", "war", "ear", "png", "jpg",
        "jpeg", "gif", "bmp", "ico", "pdf", "doc", "docx", "xls", "xlsx", "zip", "tar", "gz", "7z",
        "rar",
    ];

    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            BINARY_EXTENSIONS
                .iter()
                .any(|bin_ext| bin_ext.eq_ignore_ascii_case(ext))
        })
}

/// Determines if a file found during a directory walk should be tallied
pub fn should_include_file(
    path: &Path,
    extensions: &Option<Vec<String>>,
    ignore_set: &IgnoreSet,
) -> bool {
    !is_likely_binary(path) && has_valid_extension(path, extensions) && !ignore_set.is_ignored(path)
}

/// Expands files and directories into the list of files to tally.
///
/// Inputs that are not directories are kept as given, in order. Directory
/// contents follow in walk order.
pub fn expand_inputs(
    inputs: &[PathBuf],
    extensions: &Option<Vec<String>>,
    ignore_patterns: &[String],
) -> TallyResult<Vec<PathBuf>> {
    let ignore_set = IgnoreSet::new(ignore_patterns)?;
    let mut files = Vec::new();

    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }

        let before = files.len();
        let walker = WalkBuilder::new(input)
            .hidden(true)
            .ignore(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", input.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }
            if should_include_file(entry.path(), extensions, &ignore_set) {
                files.push(entry.into_path());
            }
        }

        debug!(
            "Found {} files under {}",
            files.len() - before,
            input.display()
        );
    }

    Ok(files)
}
