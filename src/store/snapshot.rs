//! Route store backed by a JSON snapshot file.
//!
//! A snapshot holds the raw rows a registry mirror would serve:
//!
//! ```json
//! {
//!   "routes":    [{"prefix": "192.0.2.0/24", "origin": 64500, "source": "ripe"}],
//!   "managed":   ["192.0.0.0/8"],
//!   "as_macros": [{"name": "AS-EXAMPLE", "source": "ripe", "members": ["AS64500"]}]
//! }
//! ```

use super::{MacroDefinition, MacroExpansionRow, MacroSource, RouteSource, RouteStore};
use crate::error::StoreError;
use crate::models::RouteObservation;
use crate::prefix::Prefix;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::path::Path;
use tracing::{debug, info};

/// Default bound on nested macro expansion.
pub const DEFAULT_MAX_EXPAND_DEPTH: usize = 8;

/// AS-macro definition as stored in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMacro {
    pub name: String,
    pub source: String,
    #[serde(default)]
    pub members: Vec<String>,
}

/// On-disk snapshot layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub routes: Vec<RouteObservation>,
    #[serde(default)]
    pub managed: Vec<String>,
    #[serde(default)]
    pub as_macros: Vec<SnapshotMacro>,
}

/// In-memory store over a loaded snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    routes: Vec<(Prefix, RouteObservation)>,
    managed: Vec<(Prefix, String)>,
    macros: Vec<SnapshotMacro>,
    max_expand_depth: usize,
}

impl SnapshotStore {
    /// Load a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| StoreError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        let store = Self::from_json(&content)?;
        info!(
            "Loaded snapshot {}: {} routes, {} managed ranges, {} macros",
            path.display(),
            store.routes.len(),
            store.managed.len(),
            store.macros.len()
        );
        Ok(store)
    }

    /// Parse a snapshot from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, StoreError> {
        let snapshot: Snapshot = serde_json::from_str(content)?;
        Self::from_snapshot(snapshot)
    }

    /// Build a store from an already-parsed snapshot.
    ///
    /// Every route and managed range must be a valid prefix. Prefixes are
    /// kept in normalised form, so one network always has one spelling.
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, StoreError> {
        let routes = snapshot
            .routes
            .into_iter()
            .map(|row| {
                let parsed = parse_stored_prefix(&row.prefix)?;
                let row = RouteObservation {
                    prefix: parsed.to_string(),
                    ..row
                };
                Ok((parsed, row))
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        let managed = snapshot
            .managed
            .iter()
            .map(|range| parse_stored_prefix(range).map(|p| (p, p.to_string())))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            routes,
            managed,
            macros: snapshot.as_macros,
            max_expand_depth: DEFAULT_MAX_EXPAND_DEPTH,
        })
    }

    /// Limit how many levels of nested macros are followed.
    pub fn with_max_expand_depth(mut self, depth: usize) -> Self {
        self.max_expand_depth = depth;
        self
    }

    fn definitions<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a SnapshotMacro> + 'a {
        self.macros
            .iter()
            .filter(move |m| m.name.eq_ignore_ascii_case(name))
    }

    fn is_macro(&self, name: &str) -> bool {
        self.definitions(name).next().is_some()
    }
}

fn parse_stored_prefix(value: &str) -> Result<Prefix, StoreError> {
    Prefix::parse(value).map_err(|_| StoreError::Malformed(format!("invalid prefix {}", value)))
}

impl RouteStore for SnapshotStore {
    fn query_prefix(&self, prefix: &Prefix, exact: bool) -> Result<Vec<RouteObservation>, StoreError> {
        let rows: Vec<RouteObservation> = self
            .routes
            .iter()
            .filter(|(route, _)| if exact { route == prefix } else { prefix.contains(route) })
            .map(|(_, row)| row.clone())
            .collect();

        debug!("query_prefix {} exact={} -> {} rows", prefix, exact, rows.len());
        Ok(rows)
    }

    fn query_managed_prefix(&self, prefix: &Prefix) -> Result<Vec<String>, StoreError> {
        Ok(self
            .managed
            .iter()
            .filter(|(range, _)| range.contains(prefix))
            .map(|(_, raw)| raw.clone())
            .collect())
    }

    fn query_as(&self, asn: u32) -> Result<Vec<RouteSource>, StoreError> {
        Ok(self
            .routes
            .iter()
            .filter(|(_, row)| row.origin == asn)
            .map(|(_, row)| RouteSource {
                route: row.prefix.clone(),
                source: row.source.clone(),
            })
            .collect())
    }

    fn query_as_contain(&self, member: &str) -> Result<Vec<MacroSource>, StoreError> {
        Ok(self
            .macros
            .iter()
            .filter(|m| m.members.iter().any(|mem| mem.eq_ignore_ascii_case(member)))
            .map(|m| MacroSource {
                as_macro: m.name.clone(),
                source: m.source.clone(),
            })
            .collect())
    }

    fn query_as_macro(&self, name: &str) -> Result<Vec<MacroDefinition>, StoreError> {
        Ok(self
            .definitions(name)
            .map(|m| MacroDefinition {
                members: m.members.clone(),
                source: m.source.clone(),
            })
            .collect())
    }

    fn query_as_macro_expand(&self, name: &str) -> Result<Vec<MacroExpansionRow>, StoreError> {
        let mut rows = Vec::new();
        // Breadth-first, so each macro is expanded once at its shallowest depth.
        let mut expanded: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<(String, usize, Vec<String>)> = VecDeque::new();

        let root = name.to_ascii_uppercase();
        expanded.insert(root.clone());
        queue.push_back((root.clone(), 0, vec![root]));

        while let Some((current, depth, path)) = queue.pop_front() {
            for def in self.definitions(&current) {
                rows.push(MacroExpansionRow {
                    as_macro: def.name.clone(),
                    source: def.source.clone(),
                    depth,
                    path: path.clone(),
                    members: def.members.clone(),
                });

                if depth >= self.max_expand_depth {
                    continue;
                }

                for member in &def.members {
                    let key = member.to_ascii_uppercase();
                    if self.is_macro(&key) && expanded.insert(key.clone()) {
                        let mut next_path = path.clone();
                        next_path.push(key.clone());
                        queue.push_back((key, depth + 1, next_path));
                    }
                }
            }
        }

        debug!("query_as_macro_expand {} -> {} rows", name, rows.len());
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SNAPSHOT: &str = r#"{
        "routes": [
            {"prefix": "192.0.2.0/24", "origin": 64500, "source": "ripe"},
            {"prefix": "192.0.2.0/24", "origin": 64500, "source": "bgp"},
            {"prefix": "192.0.2.128/25", "origin": 64501, "source": "radb"},
            {"prefix": "198.51.100.0/24", "origin": 64500, "source": "arin"}
        ],
        "managed": ["192.0.0.0/16"],
        "as_macros": [
            {"name": "AS-TOP", "source": "ripe", "members": ["AS64500", "AS-MID"]},
            {"name": "AS-MID", "source": "ripe", "members": ["AS64501", "AS-LEAF", "AS-TOP"]},
            {"name": "AS-MID", "source": "radb", "members": ["AS64502"]},
            {"name": "AS-LEAF", "source": "arin", "members": ["AS64500"]}
        ]
    }"#;

    fn store() -> SnapshotStore {
        SnapshotStore::from_json(SNAPSHOT).unwrap()
    }

    fn pfx(s: &str) -> Prefix {
        Prefix::parse(s).unwrap()
    }

    #[test]
    fn test_query_prefix_includes_more_specifics() {
        let rows = store().query_prefix(&pfx("192.0.2.0/24"), false).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().any(|r| r.prefix == "192.0.2.128/25"));
    }

    #[test]
    fn test_query_prefix_exact() {
        let rows = store().query_prefix(&pfx("192.0.2.0/24"), true).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.prefix == "192.0.2.0/24"));
    }

    #[test]
    fn test_query_prefix_no_match() {
        assert!(store().query_prefix(&pfx("203.0.113.0/24"), false).unwrap().is_empty());
    }

    #[test]
    fn test_query_managed_prefix() {
        let s = store();
        assert_eq!(s.query_managed_prefix(&pfx("192.0.2.0/24")).unwrap(), vec!["192.0.0.0/16"]);
        assert!(s.query_managed_prefix(&pfx("198.51.100.0/24")).unwrap().is_empty());
    }

    #[test]
    fn test_query_as() {
        let rows = store().query_as(64500).unwrap();
        let routes: Vec<_> = rows.iter().map(|r| (r.route.as_str(), r.source.as_str())).collect();
        assert_eq!(
            routes,
            vec![("192.0.2.0/24", "ripe"), ("192.0.2.0/24", "bgp"), ("198.51.100.0/24", "arin")]
        );
    }

    #[test]
    fn test_prefixes_are_normalised() {
        let s = SnapshotStore::from_json(
            r#"{
                "routes": [
                    {"prefix": "2001:DB8::/32", "origin": 64500, "source": "ripe"},
                    {"prefix": "2001:db8:0::/32", "origin": 64500, "source": "bgp"},
                    {"prefix": "192.0.2.77/24", "origin": 64501, "source": "radb"}
                ],
                "managed": ["2001:DB8::/29"]
            }"#,
        )
        .unwrap();

        let rows = s.query_prefix(&pfx("2001:db8::/32"), true).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.prefix == "2001:db8::/32"));

        let rows = s.query_prefix(&pfx("192.0.2.0/24"), true).unwrap();
        assert_eq!(rows[0].prefix, "192.0.2.0/24");

        let routes: Vec<_> = s.query_as(64500).unwrap().into_iter().map(|r| r.route).collect();
        assert_eq!(routes, vec!["2001:db8::/32", "2001:db8::/32"]);

        assert_eq!(s.query_managed_prefix(&pfx("2001:db8::/32")).unwrap(), vec!["2001:db8::/29"]);
    }

    #[test]
    fn test_query_as_contain_is_case_insensitive() {
        let rows = store().query_as_contain("as64500").unwrap();
        let names: Vec<_> = rows.iter().map(|r| r.as_macro.as_str()).collect();
        assert_eq!(names, vec!["AS-TOP", "AS-LEAF"]);
    }

    #[test]
    fn test_query_as_macro_one_row_per_source() {
        let rows = store().query_as_macro("as-mid").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].source, "radb");
        assert_eq!(rows[1].members, vec!["AS64502"]);
    }

    #[test]
    fn test_expand_tracks_depth_and_path() {
        let rows = store().query_as_macro_expand("AS-TOP").unwrap();

        let summary: Vec<_> = rows
            .iter()
            .map(|r| (r.as_macro.as_str(), r.source.as_str(), r.depth, r.path.join(" > ")))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("AS-TOP", "ripe", 0, "AS-TOP".to_string()),
                ("AS-MID", "ripe", 1, "AS-TOP > AS-MID".to_string()),
                ("AS-MID", "radb", 1, "AS-TOP > AS-MID".to_string()),
                ("AS-LEAF", "arin", 2, "AS-TOP > AS-MID > AS-LEAF".to_string()),
            ]
        );
    }

    #[test]
    fn test_expand_respects_max_depth() {
        let rows = store()
            .with_max_expand_depth(1)
            .query_as_macro_expand("AS-TOP")
            .unwrap();
        assert!(rows.iter().all(|r| r.depth <= 1));
        assert!(!rows.iter().any(|r| r.as_macro == "AS-LEAF"));
    }

    #[test]
    fn test_expand_unknown_macro_is_empty() {
        assert!(store().query_as_macro_expand("AS-NOPE").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_prefix_rejected() {
        let err = SnapshotStore::from_json(
            r#"{"routes": [{"prefix": "not-a-prefix", "origin": 1, "source": "ripe"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(matches!(SnapshotStore::from_json("{"), Err(StoreError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SNAPSHOT.as_bytes()).unwrap();

        let s = SnapshotStore::load(file.path()).unwrap();
        assert_eq!(s.query_as(64501).unwrap().len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = SnapshotStore::load(Path::new("/nonexistent/snapshot.json")).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }
}
