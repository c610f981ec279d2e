//! Evolog - Genetic-Algorithm Log Summarizer
//!
//! A CLI tool that scans experiment runner logs, tracks the best fitness
//! per run configuration, and generates summary reports.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (unreadable input, bad config, strict parse failure)
//!   2 - No run configuration found and --fail-empty set

mod analysis;
mod cli;
mod config;
mod models;
mod parser;
mod report;
mod scanner;

use analysis::Aggregator;
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use models::{Report, ReportMetadata};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        match handle_init_config() {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    // Initialize logging
    init_logging(&args);

    info!("Evolog v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the summarizer
    match run(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Summarizing failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .evolog.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".evolog.toml");

    if path.exists() {
        anyhow::bail!(".evolog.toml already exists. Remove it first or edit it manually.");
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .evolog.toml")?;

    println!("Created .evolog.toml with default settings.");
    println!("Edit it to customize grouping, includes, excludes, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete summarizing workflow. Returns exit code (0 or 2).
fn run(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let grouping = config.general.group_by;
    let strict = config.general.strict;

    // Step 1: Resolve inputs into the ordered file list
    let scan_config = scanner::ScanConfig::from(&config.scanner);
    let input_scanner = scanner::InputScanner::new(scan_config);
    let files = input_scanner.resolve(&args.inputs)?;

    // Handle --dry-run: list files and exit
    if args.dry_run {
        return handle_dry_run(&files);
    }

    if files.is_empty() {
        warn!("No log files matched the given inputs");
    }
    info!(
        "Summarizing {} file(s), grouped by {}",
        files.len(),
        grouping
    );

    // Step 2: Aggregate all files in order
    let progress_bar = make_progress_bar(&args, files.len());
    let mut aggregator = Aggregator::new(grouping, strict);

    for file in &files {
        if let Some(name) = file.file_name().and_then(|n| n.to_str()) {
            progress_bar.set_message(name.to_string());
        }
        aggregator.ingest_file(file)?;
        progress_bar.inc(1);
    }
    progress_bar.finish_and_clear();

    let summary = aggregator.into_summary();
    let is_empty = summary.is_empty();

    // Step 3: Build the report
    let duration = start_time.elapsed().as_secs_f64();
    let metadata = ReportMetadata {
        generated_at: Utc::now(),
        inputs: args
            .inputs
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
        grouping,
        duration_seconds: duration,
    };
    let report = Report { metadata, summary };

    // Step 4: Render it in the requested format
    let output = match args.format {
        OutputFormat::Text => report::generate_text_report(&report),
        OutputFormat::Markdown => {
            report::generate_markdown_report(&report, config.report.show_stats)
        }
        OutputFormat::Json => report::generate_json_report(&report)?,
    };

    match args.output {
        Some(ref path) => {
            report::write_report(&output, path)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            info!("Report saved to: {}", path.display());
        }
        None => {
            print!("{}", output);
        }
    }

    if report.summary.stats.lines_skipped > 0 {
        warn!(
            "{} malformed line(s) skipped; rerun with --strict to abort on them",
            report.summary.stats.lines_skipped
        );
    }

    // Check --fail-empty
    if args.fail_empty && is_empty {
        eprintln!("No run configuration found in the scanned logs. Failing (exit code 2).");
        return Ok(2);
    }

    Ok(0)
}

/// Handle --dry-run: print what would be parsed, exit.
fn handle_dry_run(files: &[PathBuf]) -> Result<i32> {
    if files.is_empty() {
        println!("No matching log files found.");
    } else {
        println!("Found {} file(s) that would be parsed:", files.len());
        for file in files {
            println!("  {}", file.display());
        }
    }

    Ok(0)
}

/// Progress bar over input files; hidden in quiet mode or for a single file.
fn make_progress_bar(args: &Args, len: usize) -> ProgressBar {
    if args.quiet || len < 2 {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .evolog.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
