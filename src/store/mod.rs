//! Route store interface.
//!
//! The reporters only ever read from a [`RouteStore`]. Rows come back in the
//! shape the store produced them; all grouping happens in the aggregator.

pub mod snapshot;

pub use snapshot::SnapshotStore;

use crate::error::StoreError;
use crate::models::RouteObservation;
use crate::prefix::Prefix;
use serde::{Deserialize, Serialize};

/// A `(route, source)` pair registered or announced for an AS number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSource {
    pub route: String,
    pub source: String,
}

/// An AS-macro, and the registry holding it, that lists a given member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroSource {
    pub as_macro: String,
    pub source: String,
}

/// Members of an AS-macro as defined in one registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroDefinition {
    pub members: Vec<String>,
    pub source: String,
}

/// One step of a recursive AS-macro expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroExpansionRow {
    pub as_macro: String,
    pub source: String,
    pub depth: usize,
    pub path: Vec<String>,
    pub members: Vec<String>,
}

/// Read-only queries the reporters issue.
pub trait RouteStore {
    /// Routes for `prefix`. Unless `exact` is set, more-specific prefixes
    /// within it are returned as well. Prefixes come back normalised, as
    /// [`Prefix`] displays them.
    fn query_prefix(&self, prefix: &Prefix, exact: bool) -> Result<Vec<RouteObservation>, StoreError>;

    /// Authoritatively managed ranges covering `prefix`.
    fn query_managed_prefix(&self, prefix: &Prefix) -> Result<Vec<String>, StoreError>;

    /// Routes originated by `asn`.
    fn query_as(&self, asn: u32) -> Result<Vec<RouteSource>, StoreError>;

    /// Macros listing `member` (e.g. `AS64500`) directly.
    fn query_as_contain(&self, member: &str) -> Result<Vec<MacroSource>, StoreError>;

    /// Definitions of `name`, one per registry.
    fn query_as_macro(&self, name: &str) -> Result<Vec<MacroDefinition>, StoreError>;

    /// Recursive expansion of `name` through nested macros.
    fn query_as_macro_expand(&self, name: &str) -> Result<Vec<MacroExpansionRow>, StoreError>;
}
