//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.irrxray.toml` files.

use crate::models::{IrrSources, DEFAULT_IRR_SOURCES};
use crate::store::snapshot::DEFAULT_MAX_EXPAND_DEPTH;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".irrxray.toml";

/// Keys of a rendered prefix entry. Registry origins share the same JSON
/// object, so no registry may use one of these names.
pub const RESERVED_SOURCE_NAMES: &[&str] = &["bgp", "ripe_managed", "advice", "label"];

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Registry settings.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Route store settings.
    #[serde(default)]
    pub store: StoreConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Report output file. Reports go to stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Which registries count, and which one is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Recognised IRR database names.
    #[serde(default = "default_known_sources")]
    pub known_sources: Vec<String>,

    /// Registry managing the address space checked for `ripe_managed`.
    #[serde(default = "default_authoritative")]
    pub authoritative: String,

    /// Source tag the store uses for BGP rows.
    #[serde(default = "default_bgp_source")]
    pub bgp_source: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            known_sources: default_known_sources(),
            authoritative: default_authoritative(),
            bgp_source: default_bgp_source(),
        }
    }
}

fn default_known_sources() -> Vec<String> {
    DEFAULT_IRR_SOURCES.iter().map(|s| s.to_string()).collect()
}

fn default_authoritative() -> String {
    "ripe".to_string()
}

fn default_bgp_source() -> String {
    "bgp".to_string()
}

/// Route store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path to the JSON snapshot.
    #[serde(default = "default_snapshot")]
    pub snapshot: PathBuf,

    /// How many levels of nested AS-macros to follow.
    #[serde(default = "default_max_expand_depth")]
    pub max_expand_depth: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot: default_snapshot(),
            max_expand_depth: default_max_expand_depth(),
        }
    }
}

fn default_snapshot() -> PathBuf {
    PathBuf::from("irr_snapshot.json")
}

fn default_max_expand_depth() -> usize {
    DEFAULT_MAX_EXPAND_DEPTH
}

impl Config {
    /// Load configuration from a file path.
    ///
    /// The result is not validated; call [`Config::validate`] once CLI
    /// overrides have been merged.
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
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.irrxray.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Reject settings the classifier cannot work with.
    pub fn validate(&self) -> Result<()> {
        let sources = self.irr_sources();

        if sources.known.is_empty() {
            bail!("registry.known_sources must not be empty");
        }
        if sources.is_known(&sources.bgp_tag) {
            bail!(
                "registry.bgp_source '{}' is also listed as an IRR source",
                sources.bgp_tag
            );
        }
        if let Some(name) = sources
            .known
            .iter()
            .find(|s| RESERVED_SOURCE_NAMES.contains(&s.as_str()))
        {
            bail!("registry.known_sources may not contain the reserved name '{}'", name);
        }
        if !sources.is_known(&sources.authoritative) {
            bail!(
                "registry.authoritative '{}' is not in registry.known_sources",
                sources.authoritative
            );
        }

        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref snapshot) = args.snapshot {
            self.store.snapshot = snapshot.clone();
        }

        if let Some(ref output) = args.output {
            self.general.output = Some(output.clone());
        }

        if let Some(ref authoritative) = args.authoritative {
            self.registry.authoritative = authoritative.clone();
        }

        if let Some(depth) = args.max_depth {
            self.store.max_expand_depth = depth;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// The registry set handed to the aggregator and classifier.
    pub fn irr_sources(&self) -> IrrSources {
        IrrSources::new(
            self.registry.known_sources.clone(),
            self.registry.authoritative.clone(),
            self.registry.bgp_source.clone(),
        )
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
