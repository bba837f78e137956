use tracing::{debug, info};

use super::aggregator::Aggregator;
use crate::config::TallyConfig;
use crate::errors::TallyResult;
use crate::filters::expand_inputs;
use crate::results::TallySummary;

/// Expands the configured inputs and tallies them concurrently
pub fn tally(config: &TallyConfig) -> TallyResult<TallySummary> {
    let pattern = config.require_pattern()?;
    info!("Starting tally with pattern: {:?}", pattern);

    let files = expand_inputs(
        &config.paths,
        &config.file_extensions,
        &config.ignore_patterns,
    )?;
    debug!("Found {} files to tally", files.len());

    let aggregator = match config.thread_count {
        Some(threads) => Aggregator::new(threads)?,
        None => Aggregator::with_default_threads()?,
    };
    debug!("Using {} worker threads", aggregator.thread_count());
    let mut summary = aggregator.run_detailed(&files, pattern);
    summary.sort_by_path();

    Ok(summary)
}
