//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.churnlens.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Data source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Output file path. When unset the report goes to stdout.
    #[serde(default)]
    pub output: Option<String>,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Data source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path to a local CSV file.
    #[serde(default)]
    pub path: Option<String>,

    /// URL to download the CSV from when no local path is given.
    #[serde(default)]
    pub url: Option<String>,

    /// Download timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: None,
            url: None,
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    60
}

/// Analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Churn rate (percent) at or above which a segment is high risk.
    #[serde(default = "default_high_risk")]
    pub high_risk_threshold: f64,

    /// Churn rate (percent) at or above which a segment is medium risk.
    #[serde(default = "default_medium_risk")]
    pub medium_risk_threshold: f64,

    /// Assumed annual revenue per customer, used for the revenue-at-risk
    /// estimate. Override with --customer-value.
    #[serde(default = "default_customer_value")]
    pub annual_customer_value: f64,

    /// How many high-risk segments to list in the executive summary.
    #[serde(default = "default_top_risk_segments")]
    pub top_risk_segments: usize,

    /// How many correlations to list in the executive summary.
    #[serde(default = "default_top_correlations")]
    pub top_correlations: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            high_risk_threshold: default_high_risk(),
            medium_risk_threshold: default_medium_risk(),
            annual_customer_value: default_customer_value(),
            top_risk_segments: default_top_risk_segments(),
            top_correlations: default_top_correlations(),
        }
    }
}

fn default_high_risk() -> f64 {
    25.0
}

fn default_medium_risk() -> f64 {
    15.0
}

fn default_customer_value() -> f64 {
    5000.0
}

fn default_top_risk_segments() -> usize {
    5
}

fn default_top_correlations() -> usize {
    3
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include executive and product insights.
    #[serde(default = "default_true")]
    pub include_insights: bool,

    /// Include the detailed analytics section.
    #[serde(default = "default_true")]
    pub include_detailed: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_insights: true,
            include_detailed: true,
        }
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
        let default_path = Path::new(".churnlens.toml");

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
        if let Some(ref path) = args.data_path {
            self.source.path = Some(path.display().to_string());
            // A CLI-supplied path also disables any configured URL.
            self.source.url = None;
        }
        if let Some(ref url) = args.url {
            self.source.url = Some(url.clone());
            self.source.path = None;
        }
        if let Some(timeout) = args.timeout {
            self.source.timeout_seconds = timeout;
        }

        if let Some(ref output) = args.output {
            self.general.output = Some(output.display().to_string());
        }
        if args.verbose {
            self.general.verbose = true;
        }

        if let Some(value) = args.customer_value {
            self.analysis.annual_customer_value = value;
        }

        // --summary-only trims the report down to the executive summary.
        if args.summary_only {
            self.report.include_insights = false;
            self.report.include_detailed = false;
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
        assert_eq!(config.analysis.high_risk_threshold, 25.0);
        assert_eq!(config.analysis.medium_risk_threshold, 15.0);
        assert_eq!(config.analysis.annual_customer_value, 5000.0);
        assert_eq!(config.source.timeout_seconds, 60);
        assert!(config.general.output.is_none());
        assert!(config.report.include_insights);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "churn_report.json"
verbose = true

[source]
path = "data/churn.csv"
timeout_seconds = 30

[analysis]
high_risk_threshold = 30.0
annual_customer_value = 7500.0
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output.as_deref(), Some("churn_report.json"));
        assert!(config.general.verbose);
        assert_eq!(config.source.path.as_deref(), Some("data/churn.csv"));
        assert_eq!(config.source.timeout_seconds, 30);
        assert_eq!(config.analysis.high_risk_threshold, 30.0);
        assert_eq!(config.analysis.annual_customer_value, 7500.0);
        // Unspecified keys keep their defaults.
        assert_eq!(config.analysis.medium_risk_threshold, 15.0);
        assert_eq!(config.analysis.top_risk_segments, 5);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[source]"));
        assert!(toml_str.contains("[analysis]"));
        assert!(toml_str.contains("[report]"));
    }
}
