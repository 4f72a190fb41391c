//! Row aggregation.
//!
//! Reshapes flat store rows into keyed records. Nothing here deduplicates
//! or classifies; multiplicity survives until the classifier builds its sets.

use crate::models::{
    AsRecord, IrrSources, MacroExpansionRecord, MacroRecord, PrefixRecord, RouteObservation,
};
use crate::store::{MacroDefinition, MacroExpansionRow, MacroSource, RouteSource};
use std::collections::BTreeMap;

/// Group route observations by prefix, then by source.
///
/// Rows tagged with the BGP source land in `bgp_origins` and never in
/// `irr_origins`. Unrecognised sources are kept as-is; filtering to known
/// registries happens when origin sets are computed.
pub fn aggregate_prefix_rows(
    rows: &[RouteObservation],
    sources: &IrrSources,
) -> BTreeMap<String, PrefixRecord> {
    let mut grouped: BTreeMap<String, PrefixRecord> = BTreeMap::new();

    for row in rows {
        let record = grouped.entry(row.prefix.clone()).or_default();
        if row.source == sources.bgp_tag {
            record.bgp_origins.push(row.origin);
        } else {
            record
                .irr_origins
                .entry(row.source.clone())
                .or_default()
                .push(row.origin);
        }
    }

    grouped
}

/// Presence maps for an AS report.
pub fn aggregate_as_rows(routes: &[RouteSource], macros: &[MacroSource]) -> AsRecord {
    let mut record = AsRecord::default();

    for row in routes {
        record
            .prefixes
            .entry(row.route.clone())
            .or_default()
            .insert(row.source.clone(), true);
    }

    for row in macros {
        record
            .macros
            .entry(row.as_macro.clone())
            .or_default()
            .insert(row.source.clone(), true);
    }

    record
}

/// One record per registry defining the macro.
pub fn macro_records(rows: &[MacroDefinition]) -> Vec<MacroRecord> {
    rows.iter()
        .map(|row| MacroRecord {
            source: row.source.clone(),
            members: row.members.clone(),
        })
        .collect()
}

/// One record per expansion row, depth and path preserved.
pub fn expansion_records(rows: &[MacroExpansionRow]) -> Vec<MacroExpansionRecord> {
    rows.iter()
        .map(|row| MacroExpansionRecord {
            as_macro: row.as_macro.clone(),
            source: row.source.clone(),
            depth: row.depth,
            path: row.path.clone(),
            members: row.members.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(prefix: &str, origin: u32, source: &str) -> RouteObservation {
        RouteObservation::new(prefix, origin, source)
    }

    #[test]
    fn test_groups_by_prefix_and_source() {
        let rows = vec![
            obs("192.0.2.0/24", 64500, "ripe"),
            obs("192.0.2.0/24", 64501, "radb"),
            obs("192.0.2.0/25", 64502, "arin"),
        ];

        let grouped = aggregate_prefix_rows(&rows, &IrrSources::default());

        assert_eq!(grouped.len(), 2);
        let record = &grouped["192.0.2.0/24"];
        assert_eq!(record.irr_origins["ripe"], vec![64500]);
        assert_eq!(record.irr_origins["radb"], vec![64501]);
        assert_eq!(grouped["192.0.2.0/25"].irr_origins["arin"], vec![64502]);
    }

    #[test]
    fn test_keeps_duplicates_in_row_order() {
        let rows = vec![
            obs("192.0.2.0/24", 64501, "radb"),
            obs("192.0.2.0/24", 64500, "radb"),
            obs("192.0.2.0/24", 64501, "radb"),
        ];

        let grouped = aggregate_prefix_rows(&rows, &IrrSources::default());
        assert_eq!(grouped["192.0.2.0/24"].irr_origins["radb"], vec![64501, 64500, 64501]);
    }

    #[test]
    fn test_bgp_is_split_out() {
        let rows = vec![
            obs("192.0.2.0/24", 64500, "bgp"),
            obs("192.0.2.0/24", 64500, "ripe"),
            obs("192.0.2.0/24", 64501, "bgp"),
        ];

        let grouped = aggregate_prefix_rows(&rows, &IrrSources::default());
        let record = &grouped["192.0.2.0/24"];

        assert_eq!(record.bgp_origins, vec![64500, 64501]);
        assert!(!record.irr_origins.contains_key("bgp"));
        assert!(record.managed.is_none());
        assert!(record.advice.is_none());
    }

    #[test]
    fn test_bgp_only_prefix_has_empty_irr_map() {
        let rows = vec![obs("203.0.113.0/24", 64500, "bgp")];
        let grouped = aggregate_prefix_rows(&rows, &IrrSources::default());
        assert!(grouped["203.0.113.0/24"].irr_origins.is_empty());
    }

    #[test]
    fn test_custom_bgp_tag() {
        let sources = IrrSources::new(vec!["ripe".to_string()], "ripe", "dfz");
        let rows = vec![obs("192.0.2.0/24", 64500, "dfz"), obs("192.0.2.0/24", 64500, "bgp")];

        let grouped = aggregate_prefix_rows(&rows, &sources);
        let record = &grouped["192.0.2.0/24"];
        assert_eq!(record.bgp_origins, vec![64500]);
        assert_eq!(record.irr_origins["bgp"], vec![64500]);
    }

    #[test]
    fn test_unknown_sources_are_kept() {
        let rows = vec![obs("192.0.2.0/24", 64500, "mirror-x")];
        let grouped = aggregate_prefix_rows(&rows, &IrrSources::default());
        assert_eq!(grouped["192.0.2.0/24"].irr_origins["mirror-x"], vec![64500]);
    }

    #[test]
    fn test_as_rows_presence_only() {
        let routes = vec![
            RouteSource { route: "203.0.113.0/24".into(), source: "radb".into() },
            RouteSource { route: "203.0.113.0/24".into(), source: "radb".into() },
            RouteSource { route: "203.0.113.0/24".into(), source: "ripe".into() },
        ];
        let macros = vec![MacroSource { as_macro: "AS-EXAMPLE".into(), source: "ripe".into() }];

        let record = aggregate_as_rows(&routes, &macros);

        assert_eq!(record.prefixes["203.0.113.0/24"].len(), 2);
        assert!(record.prefixes["203.0.113.0/24"]["radb"]);
        assert!(record.macros["AS-EXAMPLE"]["ripe"]);
    }

    #[test]
    fn test_expansion_records_preserve_path() {
        let rows = vec![MacroExpansionRow {
            as_macro: "AS-MID".into(),
            source: "ripe".into(),
            depth: 1,
            path: vec!["AS-TOP".into(), "AS-MID".into()],
            members: vec!["AS64500".into()],
        }];

        let records = expansion_records(&rows);
        assert_eq!(records[0].depth, 1);
        assert_eq!(records[0].path, vec!["AS-TOP", "AS-MID"]);
        assert_eq!(records[0].as_macro, "AS-MID");
    }
}
