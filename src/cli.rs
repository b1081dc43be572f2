//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// ChurnLens - churn analytics for bank customer datasets
///
/// Load a bank customer churn CSV, compute descriptive statistics and
/// rule-based insights, and render the result as text, Markdown or JSON.
///
/// Examples:
///   churnlens --data-path data/Churn_Modelling.csv
///   churnlens --data-path data.csv --format json --output report.json
///   churnlens --url https://example.com/churn.csv --summary-only
///   churnlens --data-path data.csv --fail-on-rate 25
///   churnlens --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the churn dataset CSV file
    ///
    /// Can also be set via the CHURNLENS_DATA env var or .churnlens.toml.
    #[arg(short, long, value_name = "FILE", env = "CHURNLENS_DATA")]
    pub data_path: Option<PathBuf>,

    /// URL to download the dataset from instead of a local path
    ///
    /// Plain unauthenticated HTTP(S); one attempt, no retries.
    #[arg(long, value_name = "URL", conflicts_with = "data_path")]
    pub url: Option<String>,

    /// Output file path for the report
    ///
    /// When not set, the report is printed to stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (text, markdown, json)
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Print only the executive summary, not detailed insights
    #[arg(long)]
    pub summary_only: bool,

    /// Assumed annual revenue per customer for the revenue-at-risk estimate
    ///
    /// Overrides the annual_customer_value config key (default 5000).
    #[arg(long, value_name = "USD")]
    pub customer_value: Option<f64>,

    /// Fail if the overall churn rate is at or above this percentage
    ///
    /// Useful for CI pipelines. Exit code 2 when the threshold is exceeded.
    #[arg(long, value_name = "PCT")]
    pub fail_on_rate: Option<f64>,

    /// Download timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .churnlens.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .churnlens.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Formatted console text (default)
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

        if let Some(ref url) = self.url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Dataset URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(value) = self.customer_value {
            if value <= 0.0 {
                return Err("Customer value must be greater than 0".to_string());
            }
        }

        if let Some(rate) = self.fail_on_rate {
            if !(0.0..=100.0).contains(&rate) {
                return Err("Fail-on rate must be between 0 and 100".to_string());
            }
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref data_path) = self.data_path {
            if !data_path.exists() {
                return Err(format!("Data file does not exist: {}", data_path.display()));
            }
            if !data_path.is_file() {
                return Err(format!("Data path is not a file: {}", data_path.display()));
            }
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
