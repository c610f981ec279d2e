//! Data models for the log summarizer.
//!
//! This module contains all the core data structures used throughout
//! the application for representing parsed records, per-label results,
//! and reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which configuration key the aggregation groups by.
///
/// The experiment runner announces the run configuration in two flavors:
/// a `population size set to <N>` line, or a `using <strategy> selection
/// mechanism ...` line. Both put the interesting token at index 4; the
/// selection flavor carries a trailing punctuation character that must be
/// stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Grouping {
    /// Group results by population size.
    Population,
    /// Group results by selection-strategy name.
    Selection,
}

impl Grouping {
    /// The first token that identifies a group-label line.
    pub fn marker(self) -> &'static str {
        match self {
            Grouping::Population => "population",
            Grouping::Selection => "using",
        }
    }

    /// Whether the label token carries a trailing character to strip.
    pub fn strips_label(self) -> bool {
        matches!(self, Grouping::Selection)
    }
}

impl fmt::Display for Grouping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grouping::Population => write!(f, "population"),
            Grouping::Selection => write!(f, "selection"),
        }
    }
}

/// The best fitness observed for a label, and the generation it occurred at.
///
/// Starts at `(0, 0)` when a label is first declared; a generation record
/// only displaces it when its fitness is strictly greater.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BestRecord {
    /// Best fitness value seen so far.
    pub fitness: f64,
    /// Generation at which the best fitness was recorded.
    pub generation: u64,
}

impl fmt::Display for BestRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.fitness, self.generation)
    }
}

/// One label with its best record, ready for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupResult {
    /// The group key (population size or selection-strategy name).
    pub label: String,
    /// Best fitness/generation pair seen under this label.
    pub best: BestRecord,
}

/// Counters collected while scanning input files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStats {
    /// Number of input files read.
    pub files_scanned: usize,
    /// Total lines seen (including blank and skipped ones).
    pub lines_total: usize,
    /// Lines that declared a group label.
    pub group_lines: usize,
    /// Generation records applied to a label.
    pub generation_lines: usize,
    /// Malformed or orphaned lines skipped in lenient mode.
    pub lines_skipped: usize,
}

/// The outcome of one aggregation pass over all inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Progress token of the last successfully applied line, if any.
    pub progress: Option<String>,
    /// Per-label results, sorted for deterministic output.
    pub groups: Vec<GroupResult>,
    /// Scan counters.
    pub stats: ScanStats,
}

impl RunSummary {
    /// Returns true when no labels were tracked.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Input paths as given on the command line.
    pub inputs: Vec<String>,
    /// Grouping key the aggregation used.
    pub grouping: Grouping,
    /// Duration of the aggregation pass in seconds.
    pub duration_seconds: f64,
}

/// The complete summary report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Metadata about the report.
    pub metadata: ReportMetadata,
    /// Aggregation results.
    pub summary: RunSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouping_markers() {
        assert_eq!(Grouping::Population.marker(), "population");
        assert_eq!(Grouping::Selection.marker(), "using");
        assert!(!Grouping::Population.strips_label());
        assert!(Grouping::Selection.strips_label());
    }

    #[test]
    fn test_grouping_display() {
        assert_eq!(Grouping::Population.to_string(), "population");
        assert_eq!(Grouping::Selection.to_string(), "selection");
    }

    #[test]
    fn test_best_record_display() {
        let best = BestRecord {
            fitness: 0.92,
            generation: 311,
        };
        assert_eq!(best.to_string(), "(0.92, 311)");
        assert_eq!(BestRecord::default().to_string(), "(0, 0)");
    }

    #[test]
    fn test_grouping_serde_lowercase() {
        let json = serde_json::to_string(&Grouping::Selection).unwrap();
        assert_eq!(json, "\"selection\"");
        let back: Grouping = serde_json::from_str("\"population\"").unwrap();
        assert_eq!(back, Grouping::Population);
    }

    #[test]
    fn test_run_summary_is_empty() {
        let summary = RunSummary {
            progress: None,
            groups: Vec::new(),
            stats: ScanStats::default(),
        };
        assert!(summary.is_empty());
    }
}
