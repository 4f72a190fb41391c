//! irrxray - IRR vs BGP prefix consistency reports
//!
//! A CLI tool that compares route objects registered in the IRR databases
//! with the origins observed in BGP, and classifies every prefix.
//!
//! Exit codes:
//!   0 - Success (no verdicts above threshold, or no --fail-on set)
//!   1 - Runtime error (bad query, unreadable snapshot, nothing found, etc.)
//!   2 - Verdicts found at or above the --fail-on threshold

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod prefix;
mod query;
mod report;
mod store;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE};
use models::{Report, ReportBody, Severity};
use query::SearchKey;
use report::ReportOptions;
use std::path::PathBuf;
use store::SnapshotStore;
use tracing::{debug, error, info};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
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

    match run(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Report failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .irrxray.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize registries, the snapshot path, and more.");
    Ok(())
}

/// Initialize logging. Logs go to stderr so reports can be piped.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run one report. Returns exit code (0 or 2).
fn run(args: Args) -> Result<i32> {
    // Load configuration
    let (mut config, config_path) = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };
    init_logging(level);

    info!("irrxray v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    match config_path {
        Some(path) => info!("Loaded config from: {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }

    let query = args.query_text();
    let key = SearchKey::classify(query)?;
    debug!("Query {} classified as {:?}", query, key);

    let store = SnapshotStore::load(&config.store.snapshot)?
        .with_max_expand_depth(config.store.max_expand_depth);

    let options = ReportOptions {
        exact: args.exact,
        expand: args.expand,
        sources: config.irr_sources(),
    };
    let report = report::run_report(&store, &key, query, &options)?;

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    match config.general.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            print_summary(&report);
            eprintln!("\n✅ Report saved to: {}", path.display());
        }
        None => println!("{}", output),
    }

    // Check --fail-on threshold
    if let Some(fail_level) = args.fail_on {
        if let Some(worst) = report.body.worst_severity() {
            if worst >= fail_level.severity() {
                eprintln!(
                    "\n⛔ Prefixes found at or above {} severity. Failing (exit code 2).",
                    fail_level.severity()
                );
                return Ok(2);
            }
        }
    }

    Ok(0)
}

/// Print verdict counts for a prefix report.
fn print_summary(report: &Report) {
    if let ReportBody::Prefix(ref entries) = report.body {
        let count = |s: Severity| entries.values().filter(|e| e.label == s).count();

        eprintln!("\n📊 Report Summary:");
        eprintln!("   Prefixes: {}", entries.len());
        eprintln!(
            "   - {} Success: {} | {} Warning: {} | {} Danger: {}",
            Severity::Success.emoji(),
            count(Severity::Success),
            Severity::Warning.emoji(),
            count(Severity::Warning),
            Severity::Danger.emoji(),
            count(Severity::Danger),
        );
    }
    eprintln!("   Duration: {:.2}s", report.metadata.duration_seconds);
}

/// Load configuration from file or use defaults.
///
/// Also returns the path the configuration came from, if any.
fn load_config(args: &Args) -> Result<(Config, Option<PathBuf>)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Ok((Config::load(config_path)?, Some(config_path.clone())));
    }

    // Try default location
    match Config::load_default()? {
        Some(config) => Ok((config, Some(PathBuf::from(CONFIG_FILE)))),
        None => Ok((Config::default(), None)),
    }
}
