//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::Severity;
use clap::Parser;
use std::path::PathBuf;

/// irrxray - IRR vs BGP consistency reports
///
/// Compare what the routing registries say about a prefix, AS number or
/// AS-SET with what is announced in BGP, and flag the inconsistencies.
///
/// Examples:
///   irrxray 192.0.2.0/24 --snapshot irr_snapshot.json
///   irrxray 192.0.2.0/24 --exact --format json
///   irrxray AS64500
///   irrxray AS-EXAMPLE --expand
///   irrxray 192.0.2.0/24 --fail-on danger
///   irrxray --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Prefix, AS number or AS-SET to look up
    ///
    /// Prefixes may be given with or without a length. AS numbers accept
    /// an optional "AS" prefix. Names starting with "AS-" are AS-SETs.
    #[arg(value_name = "QUERY", required_unless_present = "init_config")]
    pub query: Option<String>,

    /// JSON snapshot of the route store
    ///
    /// Can also be set via IRRXRAY_SNAPSHOT env var or .irrxray.toml config.
    #[arg(short, long, value_name = "FILE", env = "IRRXRAY_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Only report the queried prefix, without more-specifics
    #[arg(short, long)]
    pub exact: bool,

    /// Expand AS-SETs recursively
    #[arg(short = 'x', long)]
    pub expand: bool,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Output file path for the report
    ///
    /// The report is written to stdout when not set.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .irrxray.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Registry whose managed address space is checked
    #[arg(long, value_name = "SOURCE")]
    pub authoritative: Option<String>,

    /// Maximum AS-SET nesting depth followed by --expand
    #[arg(long, value_name = "DEPTH")]
    pub max_depth: Option<usize>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Fail if prefixes at or above this severity are found
    ///
    /// Useful for CI pipelines. Exit code 2 when threshold is reached.
    /// Values: warning, danger
    #[arg(long, value_name = "LEVEL")]
    pub fail_on: Option<FailOnLevel>,

    /// Generate a default .irrxray.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Severity level for --fail-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum FailOnLevel {
    Warning,
    Danger,
}

impl FailOnLevel {
    /// The lowest verdict severity that trips this threshold.
    pub fn severity(self) -> Severity {
        match self {
            FailOnLevel::Warning => Severity::Warning,
            FailOnLevel::Danger => Severity::Danger,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The query text, empty if not set (should be validated first).
    pub fn query_text(&self) -> &str {
        self.query.as_deref().unwrap_or("").trim()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.query_text().is_empty() {
            return Err("Query must not be empty".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.max_depth == Some(0) {
            return Err("Max depth must be at least 1".to_string());
        }

        if let Some(ref authoritative) = self.authoritative {
            if authoritative.trim().is_empty() {
                return Err("Authoritative registry must not be empty".to_string());
            }
        }

        if let Some(ref snapshot) = self.snapshot {
            if snapshot.is_dir() {
                return Err(format!(
                    "Snapshot path is a directory: {}",
                    snapshot.display()
                ));
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

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            query: Some("192.0.2.0/24".to_string()),
            snapshot: None,
            exact: false,
            expand: false,
            format: OutputFormat::Markdown,
            output: None,
            config: None,
            authoritative: None,
            max_depth: None,
            verbose: false,
            quiet: false,
            fail_on: None,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_ok() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_empty_query() {
        let mut args = make_args();
        args.query = Some("   ".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_init_config_without_query() {
        let mut args = make_args();
        args.query = None;
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
    fn test_validation_zero_depth() {
        let mut args = make_args();
        args.max_depth = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_snapshot_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = make_args();
        args.snapshot = Some(dir.path().to_path_buf());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = Args::try_parse_from([
            "irrxray",
            "AS-EXAMPLE",
            "--expand",
            "--format",
            "json",
            "--fail-on",
            "warning",
        ])
        .unwrap();

        assert_eq!(args.query_text(), "AS-EXAMPLE");
        assert!(args.expand);
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.fail_on, Some(FailOnLevel::Warning));
    }

    #[test]
    fn test_query_required_without_init_config() {
        assert!(Args::try_parse_from(["irrxray"]).is_err());
        assert!(Args::try_parse_from(["irrxray", "--init-config"]).is_ok());
    }

    #[test]
    fn test_fail_on_severity() {
        assert_eq!(FailOnLevel::Warning.severity(), Severity::Warning);
        assert_eq!(FailOnLevel::Danger.severity(), Severity::Danger);
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
}
