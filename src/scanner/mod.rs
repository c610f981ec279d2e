//! Input resolution for log files.
//!
//! Command-line inputs are either log files, used in argument order, or
//! directories, expanded recursively into a sorted file list. Experiment
//! logs are batch-scheduler output files (`edd-pop-50.o20347177-3` and the
//! like), so filtering is by file-name substring rather than extension.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Configuration for input scanning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// File-name substrings to include; empty means every file.
    pub includes: Vec<String>,
    /// Directory/file names to skip while walking.
    pub excludes: Vec<String>,
    /// Maximum file size in bytes; larger files are skipped with a warning.
    pub max_file_size: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            includes: Vec::new(),
            excludes: vec![".git", "target", "node_modules"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_file_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl From<&crate::config::ScannerConfig> for ScanConfig {
    fn from(config: &crate::config::ScannerConfig) -> Self {
        Self {
            includes: config.includes.clone(),
            excludes: config.excludes.clone(),
            max_file_size: config.max_file_size,
        }
    }
}

/// Resolves command-line inputs into the ordered list of log files to parse.
pub struct InputScanner {
    config: ScanConfig,
}

impl InputScanner {
    /// Create a scanner with the given configuration.
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Resolve inputs into an ordered file list.
    ///
    /// Explicit files keep their argument order and must exist; each
    /// directory contributes its matching files sorted by path.
    pub fn resolve(&self, inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for input in inputs {
            if input.is_dir() {
                self.expand_dir(input, &mut files)?;
            } else if input.is_file() {
                files.push(input.clone());
            } else {
                bail!("Input not found: {}", input.display());
            }
        }

        Ok(files)
    }

    /// Walk a directory and collect matching files.
    fn expand_dir(&self, dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
        let walker = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                // The walk root itself is never filtered out.
                if entry.depth() == 0 {
                    return true;
                }
                entry
                    .file_name()
                    .to_str()
                    .map(|name| !self.is_excluded(name))
                    .unwrap_or(false)
            });

        let mut found = 0usize;
        for entry in walker {
            let entry =
                entry.with_context(|| format!("Failed to walk directory: {}", dir.display()))?;

            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy();
            if !self.name_matches(&name) {
                continue;
            }

            let metadata = entry
                .metadata()
                .with_context(|| format!("Failed to stat: {}", entry.path().display()))?;
            if metadata.len() > self.config.max_file_size {
                warn!(
                    "Skipping {} ({} bytes exceeds limit of {})",
                    entry.path().display(),
                    metadata.len(),
                    self.config.max_file_size
                );
                continue;
            }

            files.push(entry.path().to_path_buf());
            found += 1;
        }

        debug!("Found {} file(s) under {}", found, dir.display());
        Ok(())
    }

    /// Check a file name against the include substrings.
    fn name_matches(&self, name: &str) -> bool {
        self.config.includes.is_empty()
            || self.config.includes.iter().any(|pat| name.contains(pat))
    }

    /// Check a name against exclusion patterns; hidden entries are skipped.
    fn is_excluded(&self, name: &str) -> bool {
        if name.starts_with('.') {
            return true;
        }

        self.config.excludes.iter().any(|pattern| name == pattern)
    }
}
