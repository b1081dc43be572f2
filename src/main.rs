//! ChurnLens - Bank Customer Churn Analytics
//!
//! A CLI tool that loads a bank customer churn dataset, computes
//! descriptive statistics and rule-based insights, and renders
//! text, Markdown or JSON reports.
//!
//! Exit codes:
//!   0 - Success (churn rate below threshold, or no --fail-on-rate set)
//!   1 - Runtime error (missing data, invalid format, download failure, etc.)
//!   2 - Churn rate at or above --fail-on-rate threshold

mod analytics;
mod cli;
mod config;
mod dataset;
mod error;
mod insights;
mod models;
mod report;

use anyhow::{bail, Context, Result};
use cli::{Args, OutputFormat};
use config::Config;
use models::Dataset;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("ChurnLens v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the analysis
    match run_analysis(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Analysis failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .churnlens.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(".churnlens.toml");

    if path.exists() {
        eprintln!("⚠️  .churnlens.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .churnlens.toml")?;

    println!("✅ Created .churnlens.toml with default settings.");
    println!("   Edit it to customize data source, risk thresholds, and report options.");
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
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete analysis workflow. Returns exit code (0 or 2).
async fn run_analysis(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    // Step 1: Acquire the dataset
    let (dataset, source) = acquire_dataset(&config, &args).await?;

    if dataset.is_empty() {
        warn!("Dataset at {} contains no records", source);
        println!("⚠️  Loaded 0 customer records from {}", source);
    } else {
        println!(
            "✅ Loaded {} customer records from {}",
            models::with_thousands(dataset.len()),
            source
        );
    }

    // Step 2: Compute analytics and assemble the report
    let metrics = analytics::churn_metrics(&dataset);
    let duration = start_time.elapsed().as_secs_f64();
    let report = insights::generate_report(&dataset, &config, &source, duration);

    // Step 3: Render in the requested format
    let output = match args.format {
        OutputFormat::Text => report::generate_text_report(&report),
        OutputFormat::Markdown => report::generate_markdown_report(&report),
        OutputFormat::Json => report::generate_json_report(&report)?,
    };

    // Step 4: Write to file or print to stdout
    match config.general.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path))?;
            println!("✅ Report saved to {}", path);

            println!("\n📊 Analysis Summary:");
            println!(
                "   Customers: {} | Churned: {} | Rate: {:.2}%",
                models::with_thousands(metrics.total_customers),
                models::with_thousands(metrics.churned_customers),
                metrics.churn_rate * 100.0
            );
            println!("   Duration: {:.1}s", duration);
        }
        None => {
            println!("{}", output);
        }
    }

    // Check --fail-on-rate threshold
    if let Some(threshold_pct) = args.fail_on_rate {
        if !metrics.empty && metrics.churn_rate * 100.0 >= threshold_pct {
            eprintln!(
                "\n⛔ Overall churn rate {:.2}% is at or above the {:.2}% threshold. Failing (exit code 2).",
                metrics.churn_rate * 100.0,
                threshold_pct
            );
            return Ok(2);
        }
    }

    Ok(0)
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
            info!("Loaded default config from .churnlens.toml");
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

/// Resolve the configured data source and load it into a dataset.
///
/// Returns the dataset together with a display name for the source.
async fn acquire_dataset(config: &Config, args: &Args) -> Result<(Dataset, String)> {
    if let Some(ref path) = config.source.path {
        info!("Using local dataset: {}", path);
        let dataset = dataset::load_dataset(Path::new(path))?;
        return Ok((dataset, path.clone()));
    }

    if let Some(ref url) = config.source.url {
        println!("📥 Downloading dataset: {}", url);
        let options = dataset::FetchOptions {
            timeout_seconds: config.source.timeout_seconds,
            show_progress: !args.quiet,
        };

        // The fetch result owns the temp file; keep it alive until the
        // dataset has been parsed.
        let fetched = dataset::fetch_dataset(url, options).await?;
        info!("Downloaded {} bytes", fetched.bytes);
        let dataset = dataset::load_dataset(fetched.path())?;
        return Ok((dataset, url.clone()));
    }

    bail!(
        "No data source configured. Pass --data-path <FILE> or --url <URL>, \
         or set one in .churnlens.toml"
    );
}
