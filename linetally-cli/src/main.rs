use clap::{Parser, Subcommand};
use colored::Colorize;
use linetally::{
    config::TallyConfig, results::TallySummary, tally::tally, ScanOutcome, TallyError,
};
use std::{num::NonZeroUsize, path::PathBuf};
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, TallyError>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
struct CliCountConfig {
    /// Substring to count (an empty string matches every line)
    #[arg(short = 'p', long = "pattern")]
    pattern: Option<String>,

    /// Files or directories to scan
    paths: Vec<PathBuf>,

    /// File extensions to include when walking directories (e.g. rs,txt)
    #[arg(short = 'e', long)]
    extensions: Option<String>,

    /// Patterns to ignore when walking directories (glob format)
    #[arg(short, long)]
    ignore: Vec<String>,

    /// Number of worker threads
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Print the count for every file
    #[arg(long)]
    per_file: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Count lines containing a substring across files
    Count(Box<CliCountConfig>),
}

fn main() -> Result<()> {
    run()
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Count(args) => {
            let args = *args;
            let file_config = TallyConfig::load_from(args.config.as_deref())?;

            let file_extensions = args.extensions.as_ref().map(|e| {
                e.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            });

            let cli_config = TallyConfig {
                pattern: args.pattern,
                paths: args.paths,
                file_extensions,
                ignore_patterns: args.ignore,
                per_file: args.per_file,
                thread_count: args.threads,
                log_level: if args.verbose {
                    "debug".to_string()
                } else {
                    file_config.log_level.clone()
                },
            };

            let mut config = file_config.merge_with_cli(cli_config);
            if config.paths.is_empty() {
                config.paths.push(PathBuf::from("."));
            }

            setup_logging(&config.log_level);

            let summary = tally(&config)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary, config.per_file);
            }
            Ok(())
        }
    }
}

fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("linetally={},warn", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_summary(summary: &TallySummary, per_file: bool) {
    if per_file {
        for file_tally in &summary.file_tallies {
            let count = match file_tally.outcome {
                ScanOutcome::Counted(n) => n.to_string().green(),
                ScanOutcome::Failed => "failed".red(),
            };
            println!(
                "{}: {}",
                file_tally.path.display().to_string().blue(),
                count
            );
        }
        println!();
    }

    println!(
        "Found {} matching lines in {} files",
        summary.total, summary.files_with_matches
    );
    if summary.files_failed > 0 {
        println!(
            "{}",
            format!("{} files could not be read", summary.files_failed).yellow()
        );
    }
}
