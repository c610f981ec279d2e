//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.evolog.toml` files.

use crate::models::Grouping;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Scanner settings.
    #[serde(default)]
    pub scanner: ScannerConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Which label token runs are grouped by.
    #[serde(default = "default_grouping")]
    pub group_by: Grouping,

    /// Abort on malformed lines instead of skipping them.
    #[serde(default)]
    pub strict: bool,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            group_by: default_grouping(),
            strict: false,
            verbose: false,
        }
    }
}

fn default_grouping() -> Grouping {
    Grouping::Population
}

/// Input scanner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// File-name substrings to include when expanding directories.
    /// Empty means every file.
    #[serde(default)]
    pub includes: Vec<String>,

    /// Names to skip while walking directories.
    #[serde(default = "default_excludes")]
    pub excludes: Vec<String>,

    /// Maximum file size in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            includes: Vec::new(),
            excludes: default_excludes(),
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_excludes() -> Vec<String> {
    vec![".git", "target", "node_modules"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024 // 10MB
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include scan counters in markdown/JSON reports.
    #[serde(default = "default_true")]
    pub show_stats: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { show_stats: true }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".evolog.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(group_by) = args.group_by {
            self.general.group_by = group_by;
        }

        if let Some(ref includes) = args.include {
            self.scanner.includes = includes.clone();
        }
        if let Some(ref excludes) = args.exclude {
            self.scanner.excludes = excludes.clone();
        }

        // Flags always override
        if args.strict {
            self.general.strict = true;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.group_by, Grouping::Population);
        assert!(!config.general.strict);
        assert!(config.scanner.includes.is_empty());
        assert!(config.scanner.excludes.contains(&"target".to_string()));
        assert!(config.report.show_stats);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
group_by = "selection"
strict = true

[scanner]
includes = ["edd-"]
max_file_size = 1024

[report]
show_stats = false
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.group_by, Grouping::Selection);
        assert!(config.general.strict);
        assert_eq!(config.scanner.includes, vec!["edd-"]);
        assert_eq!(config.scanner.max_file_size, 1024);
        assert!(!config.report.show_stats);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        assert!(Config::load(Path::new("/nonexistent/.evolog.toml")).is_err());
    }

    #[test]
    fn test_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".evolog.toml");
        std::fs::write(&path, Config::default_toml()).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.general.group_by, Grouping::Population);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[scanner]"));
        assert!(toml_str.contains("[report]"));
    }
}
