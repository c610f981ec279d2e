//! Report generation in text, Markdown, and JSON.
//!
//! The text format mirrors the traditional summary the experiment scripts
//! printed: the last progress token on one line, then one line per label
//! with its best `(fitness, generation)` pair.

use crate::analysis::best_overall;
use crate::models::{Report, ReportMetadata, ScanStats};
use anyhow::Result;
use std::io::Write;
use std::path::Path;

/// Generate the plain-text report.
pub fn generate_text_report(report: &Report) -> String {
    let mut output = String::new();

    match &report.summary.progress {
        Some(progress) => output.push_str(&format!("progress: {}\n", progress)),
        None => output.push_str("progress: (none)\n"),
    }

    for group in &report.summary.groups {
        output.push_str(&format!("{} {}\n", group.label, group.best));
    }

    output
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, show_stats: bool) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# Evolog Report\n\n");

    // Metadata section
    output.push_str(&generate_metadata_section(&report.metadata));

    // Results section
    output.push_str(&generate_results_section(report));

    // Scan counters
    if show_stats {
        output.push_str(&generate_stats_section(&report.summary.stats));
    }

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Inputs:** {}\n", metadata.inputs.join(", ")));
    section.push_str(&format!("- **Grouped By:** {}\n", metadata.grouping));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the per-label results section.
fn generate_results_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str("## Results\n\n");

    if report.summary.is_empty() {
        section.push_str("No run configuration was found in the scanned logs.\n\n");
        return section;
    }

    match &report.summary.progress {
        Some(progress) => section.push_str(&format!("**Progress:** `{}`\n\n", progress)),
        None => section.push_str("**Progress:** (none)\n\n"),
    }

    section.push_str(&format!(
        "| {} | Best Fitness | Generation |\n",
        capitalize(&report.metadata.grouping.to_string())
    ));
    section.push_str("|:---|---:|---:|\n");

    for group in &report.summary.groups {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            group.label, group.best.fitness, group.best.generation
        ));
    }
    section.push('\n');

    if let Some(best) = best_overall(&report.summary.groups) {
        section.push_str(&format!(
            "**Best overall:** `{}` with fitness {} at generation {}.\n\n",
            best.label, best.best.fitness, best.best.generation
        ));
    }

    section
}

/// Generate the scan counters section.
fn generate_stats_section(stats: &ScanStats) -> String {
    let mut section = String::new();

    section.push_str("## Scan Summary\n\n");
    section.push_str("| Files | Lines | Group Lines | Generation Lines | Skipped |\n");
    section.push_str("|:---:|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} | {} |\n\n",
        stats.files_scanned,
        stats.lines_total,
        stats.group_lines,
        stats.generation_lines,
        stats.lines_skipped
    ));

    section
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

/// Uppercase the first character of a heading word.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
