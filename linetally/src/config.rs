use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::errors::{TallyError, TallyResult};

/// Configuration for a tally run.
///
/// Loaded from, in increasing order of precedence:
/// 1. Global `$CONFIG_DIR/linetally/config.yaml`
/// 2. Local `.linetally.yaml` in the current directory
/// 3. A custom file passed with `--config`
///
/// Command-line values are then applied on top with [`TallyConfig::merge_with_cli`].
///
/// ```yaml
/// pattern: "TODO"
/// paths: ["src", "README.md"]
/// file_extensions: ["rs", "md"]
/// ignore_patterns: ["target/**"]
/// per_file: true
/// thread_count: 8
/// log_level: "info"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyConfig {
    /// Literal substring to count. An empty string matches every line;
    /// `None` means no pattern was given anywhere.
    #[serde(default)]
    pub pattern: Option<String>,

    /// Files or directories to scan; directories are walked recursively
    #[serde(default)]
    pub paths: Vec<PathBuf>,

    /// Extensions to keep when walking directories. `None` keeps all.
    #[serde(default)]
    pub file_extensions: Option<Vec<String>>,

    /// Glob patterns for files to skip when walking directories
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Report each file's count in addition to the total
    #[serde(default)]
    pub per_file: bool,

    /// Worker pool size. `None` sizes the pool to the number of CPUs.
    #[serde(default)]
    pub thread_count: Option<NonZeroUsize>,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

pub(crate) fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for TallyConfig {
    fn default() -> Self {
        Self {
            pattern: None,
            paths: Vec::new(),
            file_extensions: None,
            ignore_patterns: Vec::new(),
            per_file: false,
            thread_count: None,
            log_level: default_log_level(),
        }
    }
}

impl TallyConfig {
    /// Loads configuration from the default locations
    pub fn load() -> TallyResult<Self> {
        Self::load_from(None)
    }

    /// Loads configuration from the default locations plus an optional custom file.
    ///
    /// Missing default files are skipped; a missing custom file is an error.
    pub fn load_from(config_path: Option<&Path>) -> TallyResult<Self> {
        if let Some(path) = config_path {
            std::fs::metadata(path).map_err(|e| TallyError::from_io(path, e))?;
        }

        let config_files = [
            dirs::config_dir().map(|p| p.join("linetally/config.yaml")),
            Some(PathBuf::from(".linetally.yaml")),
            config_path.map(PathBuf::from),
        ];

        let existing: Vec<PathBuf> = config_files
            .into_iter()
            .flatten()
            .filter(|path| path.exists())
            .collect();

        Self::from_files(&existing)
    }

    /// Builds a configuration from the given files, later files winning
    pub fn from_files(files: &[PathBuf]) -> TallyResult<Self> {
        let mut builder = ConfigBuilder::builder();
        for path in files {
            builder = builder.add_source(File::from(path.as_path()));
        }
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Merges CLI arguments over configuration file values
    pub fn merge_with_cli(mut self, cli_config: TallyConfig) -> Self {
        if cli_config.pattern.is_some() {
            self.pattern = cli_config.pattern;
        }
        if !cli_config.paths.is_empty() {
            self.paths = cli_config.paths;
        }
        if cli_config.file_extensions.is_some() {
            self.file_extensions = cli_config.file_extensions;
        }
        if !cli_config.ignore_patterns.is_empty() {
            self.ignore_patterns = cli_config.ignore_patterns;
        }
        if cli_config.per_file {
            self.per_file = true;
        }
        if cli_config.thread_count.is_some() {
            self.thread_count = cli_config.thread_count;
        }
        if cli_config.log_level != default_log_level() {
            self.log_level = cli_config.log_level;
        }
        self
    }

    /// Returns the pattern, or an error if none was configured
    pub fn require_pattern(&self) -> TallyResult<&str> {
        self.pattern.as_deref().ok_or(TallyError::MissingPattern)
    }
}
