//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::Grouping;
use clap::Parser;
use std::path::PathBuf;

/// Evolog - best-fitness summarizer for genetic-algorithm experiment logs
///
/// Scan experiment runner logs, track the best fitness per run
/// configuration (population size or selection strategy), and print a
/// summary. Text/Markdown/JSON reports. Built in Rust.
///
/// Examples:
///   evolog runs/edd-pop-50.o20347177-1 runs/edd-pop-50.o20347177-2
///   evolog runs/ --group-by selection
///   evolog runs/ --format markdown -o summary.md
///   evolog runs/ --strict --fail-empty
///   evolog --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Log files or directories to analyze
    ///
    /// Files are processed in argument order; directories are expanded
    /// recursively and their files processed in sorted order.
    /// Not required when using --init-config.
    #[arg(value_name = "PATH", required_unless_present = "init_config")]
    pub inputs: Vec<PathBuf>,

    /// Which label token runs are grouped by
    ///
    /// `population` keys on `population size set to <N>` lines,
    /// `selection` keys on `using <strategy> ...` lines.
    /// Can also be set via EVOLOG_GROUP_BY env var or .evolog.toml config.
    #[arg(short, long, value_name = "KEY", env = "EVOLOG_GROUP_BY")]
    pub group_by: Option<Grouping>,

    /// Output file path for the report
    ///
    /// If not specified, the report is written to standard output.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (text, markdown, json)
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Path to configuration file
    ///
    /// If not specified, looks for .evolog.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// File-name substrings to include when expanding directories (comma-separated)
    ///
    /// Example: --include "edd-pop,edd-rou"
    #[arg(long, value_name = "SUBSTRINGS", value_delimiter = ',')]
    pub include: Option<Vec<String>>,

    /// Names to skip when expanding directories (comma-separated)
    ///
    /// Example: --exclude "target,archive"
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Abort on malformed lines instead of skipping them with a warning
    #[arg(long)]
    pub strict: bool,

    /// Fail with exit code 2 when no run configuration was found
    ///
    /// Useful for CI pipelines guarding against empty or misnamed logs.
    #[arg(long)]
    pub fail_empty: bool,

    /// Dry run: resolve and list input files without parsing them
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .evolog.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text (default): progress line, then one line per label
    #[default]
    Text,
    /// Markdown format
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.inputs.is_empty() {
            return Err("At least one log file or directory is required".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            inputs: vec![PathBuf::from("run.log")],
            group_by: None,
            output: None,
            format: OutputFormat::Text,
            config: None,
            include: None,
            exclude: None,
            strict: false,
            fail_empty: false,
            dry_run: false,
            init_config: false,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn test_validation_ok() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_requires_inputs() {
        let mut args = make_args();
        args.inputs.clear();
        assert!(args.validate().is_err());

        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_parse_group_by_value() {
        let args = Args::parse_from(["evolog", "--group-by", "selection", "run.log"]);
        assert_eq!(args.group_by, Some(Grouping::Selection));
        assert_eq!(args.inputs, vec![PathBuf::from("run.log")]);
    }
}
