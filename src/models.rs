//! Data models for the registry auditor.
//!
//! This module contains the records flowing between the store, the
//! aggregator, the classifier and the report renderers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Source names recognised as IRR databases, in lookup order.
pub const DEFAULT_IRR_SOURCES: &[&str] = &[
    "afrinic", "altdb", "apnic", "arin", "bboi", "bell", "gt", "jpirr", "level3", "nttcom", "radb",
    "rgnet", "savvis", "tc", "ripe",
];

/// Severity of a prefix verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Registration matches what is announced
    Success,
    /// Inconsistent or stale registrations, nothing actively wrong
    Warning,
    /// Announced without a matching registration
    Danger,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Success => write!(f, "success"),
            Severity::Warning => write!(f, "warning"),
            Severity::Danger => write!(f, "danger"),
        }
    }
}

impl Severity {
    /// Returns an emoji representation of the severity.
    pub fn emoji(&self) -> &'static str {
        match self {
            Severity::Success => "🟢",
            Severity::Warning => "🟡",
            Severity::Danger => "🔴",
        }
    }
}

/// A single `(prefix, origin, source)` row as returned by the store.
///
/// `source` is either the BGP tag or the name of an IRR database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteObservation {
    pub prefix: String,
    pub origin: u32,
    pub source: String,
}

impl RouteObservation {
    #[cfg(test)]
    pub fn new(prefix: impl Into<String>, origin: u32, source: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            origin,
            source: source.into(),
        }
    }
}

/// The set of registries the classifier knows about.
///
/// Sources outside `known` still show up in reports but never contribute to
/// the origin sets used for classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrrSources {
    /// Recognised IRR database names.
    pub known: Vec<String>,
    /// The registry that is authoritative for managed address space.
    pub authoritative: String,
    /// Source tag used by the store for BGP observations.
    pub bgp_tag: String,
}

impl Default for IrrSources {
    fn default() -> Self {
        Self {
            known: DEFAULT_IRR_SOURCES.iter().map(|s| s.to_string()).collect(),
            authoritative: "ripe".to_string(),
            bgp_tag: "bgp".to_string(),
        }
    }
}

impl IrrSources {
    pub fn new(known: Vec<String>, authoritative: impl Into<String>, bgp_tag: impl Into<String>) -> Self {
        Self {
            known,
            authoritative: authoritative.into(),
            bgp_tag: bgp_tag.into(),
        }
    }

    /// Whether `source` is one of the recognised IRR databases.
    pub fn is_known(&self, source: &str) -> bool {
        self.known.iter().any(|s| s == source)
    }
}

/// Verdict attached to a prefix after classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    pub label: Severity,
    pub text: String,
}

/// Per-prefix aggregation of registry and BGP origins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixRecord {
    /// IRR source name -> origins in row order, duplicates kept.
    pub irr_origins: BTreeMap<String, Vec<u32>>,
    /// Origins observed in BGP, in row order.
    pub bgp_origins: Vec<u32>,
    /// Whether the prefix lies in authoritatively managed space.
    pub managed: Option<bool>,
    /// Classification result.
    pub advice: Option<Advice>,
}

/// Rendered prefix entry, shaped for the JSON API.
///
/// Registry origins are flattened to top-level keys next to the verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixReportEntry {
    #[serde(flatten)]
    pub sources: BTreeMap<String, Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bgp: Option<Vec<u32>>,
    pub ripe_managed: bool,
    pub advice: String,
    pub label: Severity,
}

/// Presence maps for an AS number lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsRecord {
    /// route -> source -> true
    pub prefixes: BTreeMap<String, BTreeMap<String, bool>>,
    /// macro -> source -> true
    pub macros: BTreeMap<String, BTreeMap<String, bool>>,
}

/// One AS-macro definition as held by a single registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroRecord {
    pub source: String,
    pub members: Vec<String>,
}

/// One row of a recursive AS-macro expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroExpansionRecord {
    pub as_macro: String,
    pub source: String,
    pub depth: usize,
    /// Macro names traversed to reach `as_macro`, starting at the root.
    pub path: Vec<String>,
    pub members: Vec<String>,
}

/// Which report produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Prefix,
    ExactPrefix,
    AsNumber,
    AsMacro,
    AsMacroExpand,
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Prefix => write!(f, "Prefix"),
            ReportKind::ExactPrefix => write!(f, "Exact prefix"),
            ReportKind::AsNumber => write!(f, "AS number"),
            ReportKind::AsMacro => write!(f, "AS macro"),
            ReportKind::AsMacroExpand => write!(f, "AS macro expansion"),
        }
    }
}

/// Metadata about a report run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// The query as entered.
    pub query: String,
    /// Report that answered the query.
    pub kind: ReportKind,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Duration of the report in seconds.
    pub duration_seconds: f64,
}

/// Body of a finished report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportBody {
    Prefix(BTreeMap<String, PrefixReportEntry>),
    AsNumber(AsRecord),
    AsMacro(Vec<MacroRecord>),
    AsMacroExpand(Vec<MacroExpansionRecord>),
}

impl ReportBody {
    /// Highest severity carried by the report, if it carries any verdicts.
    pub fn worst_severity(&self) -> Option<Severity> {
        match self {
            ReportBody::Prefix(entries) => entries.values().map(|e| e.label).max(),
            _ => None,
        }
    }
}

/// A complete report: metadata plus body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub body: ReportBody,
}
