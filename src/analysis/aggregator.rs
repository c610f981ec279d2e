//! Best-fitness aggregation.
//!
//! A single streaming pass over all input lines. Group-label lines set the
//! *current label*; generation records update the running maximum of
//! whichever label was set most recently. The table starts every label at
//! `(0, 0)`, so a label declared without any following generation record
//! reports exactly that.

use crate::models::{BestRecord, GroupResult, Grouping, RunSummary, ScanStats};
use crate::parser::{self, LineRecord, ParseError};
use anyhow::{Context, Result};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Error applying one line to the aggregation state.
#[derive(Debug, Error)]
pub enum LineError {
    /// The line did not match its expected shape.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A generation record arrived before any group-label line.
    #[error("generation record before any `{marker}` line")]
    OrphanGeneration { marker: &'static str },
}

/// Streaming aggregator over experiment log lines.
pub struct Aggregator {
    grouping: Grouping,
    strict: bool,
    table: HashMap<String, BestRecord>,
    current: Option<String>,
    progress: Option<String>,
    stats: ScanStats,
}

impl Aggregator {
    /// Create an aggregator for the given grouping.
    ///
    /// In strict mode malformed and orphaned lines abort the run; otherwise
    /// they are logged, counted, and skipped.
    pub fn new(grouping: Grouping, strict: bool) -> Self {
        Self {
            grouping,
            strict,
            table: HashMap::new(),
            current: None,
            progress: None,
            stats: ScanStats::default(),
        }
    }

    /// Read and aggregate one log file, line by line.
    pub fn ingest_file(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        let reader = BufReader::new(file);

        for (index, line) in reader.lines().enumerate() {
            let line = line
                .with_context(|| format!("Failed to read {}:{}", path.display(), index + 1))?;

            match self.ingest_line(&line) {
                Ok(()) => {}
                Err(err) if self.strict => {
                    return Err(err)
                        .with_context(|| format!("{}:{}", path.display(), index + 1));
                }
                Err(err) => {
                    warn!("{}:{}: skipping line: {}", path.display(), index + 1, err);
                    self.stats.lines_skipped += 1;
                }
            }
        }

        self.stats.files_scanned += 1;
        debug!("Finished {}", path.display());
        Ok(())
    }

    /// Apply a single line to the aggregation state.
    ///
    /// All-or-nothing: a line that errors leaves the state untouched,
    /// including the progress token.
    pub fn ingest_line(&mut self, line: &str) -> Result<(), LineError> {
        self.stats.lines_total += 1;

        let Some(parsed) = parser::parse_line(line, self.grouping)? else {
            return Ok(());
        };

        // Validate before mutating so rejected lines contribute nothing.
        if matches!(parsed.record, LineRecord::Generation { .. }) && self.current.is_none() {
            return Err(LineError::OrphanGeneration {
                marker: self.grouping.marker(),
            });
        }

        self.progress = Some(parsed.progress);

        match parsed.record {
            LineRecord::Group { label } => {
                self.table.entry(label.clone()).or_default();
                self.current = Some(label);
                self.stats.group_lines += 1;
            }
            LineRecord::Generation {
                generation,
                fitness,
            } => {
                // `current` is only set by group lines, which insert the
                // label, so the entry is already present.
                if let Some(label) = &self.current {
                    let best = self.table.entry(label.clone()).or_default();
                    if fitness > best.fitness {
                        *best = BestRecord {
                            fitness,
                            generation,
                        };
                    }
                }
                self.stats.generation_lines += 1;
            }
            LineRecord::Other => {}
        }

        Ok(())
    }

    /// Finish the pass and produce the summary, labels sorted.
    pub fn into_summary(self) -> RunSummary {
        let mut groups: Vec<GroupResult> = self
            .table
            .into_iter()
            .map(|(label, best)| GroupResult { label, best })
            .collect();
        groups.sort_by(|a, b| compare_labels(&a.label, &b.label));

        RunSummary {
            progress: self.progress,
            groups,
            stats: self.stats,
        }
    }
}

/// Order labels numerically when both parse as integers (population sizes),
/// falling back to lexicographic order; numeric labels sort first.
fn compare_labels(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// The single best group across the whole run, if any generation record
/// was applied.
pub fn best_overall(groups: &[GroupResult]) -> Option<&GroupResult> {
    groups
        .iter()
        .filter(|g| g.best.generation > 0 || g.best.fitness > 0.0)
        .max_by(|a, b| {
            a.best
                .fitness
                .partial_cmp(&b.best.fitness)
                .unwrap_or(Ordering::Equal)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn aggregate(lines: &[&str], grouping: Grouping) -> RunSummary {
        let mut agg = Aggregator::new(grouping, false);
        for line in lines {
            agg.ingest_line(line).unwrap();
        }
        agg.into_summary()
    }

    #[test]
    fn test_best_fitness_is_running_maximum() {
        let summary = aggregate(
            &[
                "population size set to 50",
                "gen 1: edd [0.1 : 0.3]",
                "gen 2: edd [0.7 : 0.9]",
                "gen 3: edd [0.5 : 0.8]",
            ],
            Grouping::Population,
        );

        assert_eq!(summary.groups.len(), 1);
        assert_eq!(summary.groups[0].label, "50");
        assert_eq!(
            summary.groups[0].best,
            BestRecord {
                fitness: 0.7,
                generation: 2
            }
        );
    }

    #[test]
    fn test_tie_keeps_earliest_generation() {
        let summary = aggregate(
            &[
                "population size set to 50",
                "gen 1: edd [0.7 : 0.9]",
                "gen 2: edd [0.7 : 0.9]",
            ],
            Grouping::Population,
        );
        assert_eq!(summary.groups[0].best.generation, 1);
    }

    #[test]
    fn test_interleaved_labels_update_current_only() {
        let summary = aggregate(
            &[
                "population size set to 50",
                "gen 1: edd [0.4 : 0.5]",
                "population size set to 100",
                "gen 2: edd [0.2 : 0.3]",
                "gen 3: edd [0.9 : 0.9]",
            ],
            Grouping::Population,
        );

        assert_eq!(summary.groups.len(), 2);
        // Sorted numerically: 50 before 100.
        assert_eq!(summary.groups[0].label, "50");
        assert_eq!(summary.groups[0].best.fitness, 0.4);
        assert_eq!(summary.groups[1].label, "100");
        assert_eq!(
            summary.groups[1].best,
            BestRecord {
                fitness: 0.9,
                generation: 3
            }
        );
    }

    #[test]
    fn test_label_without_generations_reports_zero_record() {
        let summary = aggregate(&["population size set to 200"], Grouping::Population);
        assert_eq!(summary.groups[0].best, BestRecord::default());
    }

    #[test]
    fn test_redeclared_label_keeps_existing_best() {
        let summary = aggregate(
            &[
                "population size set to 50",
                "gen 1: edd [0.6 : 0.8]",
                "population size set to 50",
                "gen 2: edd [0.2 : 0.4]",
            ],
            Grouping::Population,
        );
        assert_eq!(summary.groups.len(), 1);
        assert_eq!(summary.groups[0].best.fitness, 0.6);
    }

    #[test]
    fn test_progress_is_last_applied_line() {
        let summary = aggregate(
            &[
                "population size set to 50",
                "gen 7: edd [0.1 : 0.2]",
                "saving final genome",
            ],
            Grouping::Population,
        );
        // "final" minus its last character.
        assert_eq!(summary.progress.as_deref(), Some("fina"));
    }

    #[test]
    fn test_selection_grouping() {
        let summary = aggregate(
            &[
                "using roulette selection mechanism (5;",
                "gen 1: edd [0.3 : 0.5]",
            ],
            Grouping::Selection,
        );
        assert_eq!(summary.groups[0].label, "(5");
        assert_eq!(summary.groups[0].best.fitness, 0.3);
    }

    #[test]
    fn test_orphan_generation_is_error() {
        let mut agg = Aggregator::new(Grouping::Population, false);
        let err = agg.ingest_line("gen 1: edd [0.5 : 0.6]").unwrap_err();
        assert!(matches!(err, LineError::OrphanGeneration { .. }));
        // Nothing was recorded, not even progress.
        let summary = agg.into_summary();
        assert!(summary.progress.is_none());
        assert!(summary.is_empty());
    }

    #[test]
    fn test_malformed_line_leaves_state_untouched() {
        let mut agg = Aggregator::new(Grouping::Population, false);
        agg.ingest_line("population size set to 50").unwrap();
        assert!(agg.ingest_line("oops").is_err());
        let summary = agg.into_summary();
        assert_eq!(summary.progress.as_deref(), Some("siz"));
    }

    #[test]
    fn test_empty_input_yields_empty_summary() {
        let agg = Aggregator::new(Grouping::Population, false);
        let summary = agg.into_summary();
        assert!(summary.is_empty());
        assert!(summary.progress.is_none());
        assert_eq!(summary.stats, ScanStats::default());
    }

    #[test]
    fn test_ingest_file_lenient_skips_and_counts() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "population size set to 50").unwrap();
        writeln!(file, "oops").unwrap();
        writeln!(file, "gen 3: edd [0.8 : 0.9]").unwrap();
        file.flush().unwrap();

        let mut agg = Aggregator::new(Grouping::Population, false);
        agg.ingest_file(file.path()).unwrap();
        let summary = agg.into_summary();

        assert_eq!(summary.stats.files_scanned, 1);
        assert_eq!(summary.stats.lines_total, 3);
        assert_eq!(summary.stats.lines_skipped, 1);
        assert_eq!(summary.groups[0].best.fitness, 0.8);
    }

    #[test]
    fn test_ingest_file_strict_aborts() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "population size set to 50").unwrap();
        writeln!(file, "oops").unwrap();
        file.flush().unwrap();

        let mut agg = Aggregator::new(Grouping::Population, true);
        let err = agg.ingest_file(file.path()).unwrap_err();
        assert!(err.to_string().contains(":2"));
    }

    #[test]
    fn test_missing_file_is_error() {
        let mut agg = Aggregator::new(Grouping::Population, false);
        assert!(agg
            .ingest_file(Path::new("/nonexistent/run.log"))
            .is_err());
    }

    #[test]
    fn test_label_sorting_numeric_then_lexicographic() {
        assert_eq!(compare_labels("50", "100"), Ordering::Less);
        assert_eq!(compare_labels("100", "50"), Ordering::Greater);
        assert_eq!(compare_labels("50", "roulette"), Ordering::Less);
        assert_eq!(compare_labels("tournament", "roulette"), Ordering::Greater);
    }

    #[test]
    fn test_best_overall() {
        let groups = vec![
            GroupResult {
                label: "50".to_string(),
                best: BestRecord {
                    fitness: 0.4,
                    generation: 3,
                },
            },
            GroupResult {
                label: "100".to_string(),
                best: BestRecord {
                    fitness: 0.9,
                    generation: 7,
                },
            },
            GroupResult {
                label: "200".to_string(),
                best: BestRecord::default(),
            },
        ];

        let best = best_overall(&groups).unwrap();
        assert_eq!(best.label, "100");
        assert!(best_overall(&[]).is_none());
    }
}
