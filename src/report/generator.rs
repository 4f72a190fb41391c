//! Report rendering.
//!
//! JSON output is the bare report body, in the shape the web API serves.
//! Markdown output adds a metadata header and one table per report.

use crate::models::{
    AsRecord, MacroExpansionRecord, MacroRecord, PrefixReportEntry, Report, ReportBody,
    ReportMetadata, Severity,
};
use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# IRR Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));

    match &report.body {
        ReportBody::Prefix(entries) => output.push_str(&generate_prefix_section(entries)),
        ReportBody::AsNumber(record) => output.push_str(&generate_as_section(record)),
        ReportBody::AsMacro(records) => output.push_str(&generate_macro_section(records)),
        ReportBody::AsMacroExpand(records) => {
            output.push_str(&generate_expansion_section(records))
        }
    }

    output
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(&report.body).map_err(Into::into)
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Query:** `{}`\n", metadata.query));
    section.push_str(&format!("- **Report:** {}\n", metadata.kind));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Duration:** {:.2}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

fn join_origins(origins: &[u32]) -> String {
    origins
        .iter()
        .map(|o| format!("AS{}", o))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Prefix table: one column per registry seen in the report.
fn generate_prefix_section(entries: &BTreeMap<String, PrefixReportEntry>) -> String {
    let mut section = String::new();

    section.push_str("## Prefixes\n\n");

    let registries: BTreeSet<&String> = entries.values().flat_map(|e| e.sources.keys()).collect();

    section.push_str("| Prefix | BGP |");
    for db in &registries {
        section.push_str(&format!(" {} |", db));
    }
    section.push_str(" Managed | Advice |\n");

    section.push_str("|:---|:---|");
    for _ in &registries {
        section.push_str(":---|");
    }
    section.push_str(":---:|:---|\n");

    for (prefix, entry) in entries {
        let bgp = entry.bgp.as_deref().map(join_origins).unwrap_or_default();
        section.push_str(&format!("| `{}` | {} |", prefix, bgp));
        for db in &registries {
            let cell = entry
                .sources
                .get(*db)
                .map(|o| join_origins(o))
                .unwrap_or_default();
            section.push_str(&format!(" {} |", cell));
        }
        section.push_str(&format!(
            " {} | {} {} |\n",
            if entry.ripe_managed { "yes" } else { "no" },
            entry.label.emoji(),
            entry.advice
        ));
    }
    section.push('\n');

    section.push_str(&generate_severity_summary(entries));
    section
}

/// Count of prefixes per severity.
fn generate_severity_summary(entries: &BTreeMap<String, PrefixReportEntry>) -> String {
    let count = |s: Severity| entries.values().filter(|e| e.label == s).count();

    let mut section = String::new();
    section.push_str("### Summary\n\n");
    section.push_str(&format!(
        "| {} Success | {} Warning | {} Danger | **Total** |\n",
        Severity::Success.emoji(),
        Severity::Warning.emoji(),
        Severity::Danger.emoji(),
    ));
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | **{}** |\n\n",
        count(Severity::Success),
        count(Severity::Warning),
        count(Severity::Danger),
        entries.len()
    ));
    section
}

fn presence_table(title: &str, column: &str, rows: &BTreeMap<String, BTreeMap<String, bool>>) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", title));
    if rows.is_empty() {
        section.push_str("None found.\n\n");
        return section;
    }

    section.push_str(&format!("| {} | Sources |\n", column));
    section.push_str("|:---|:---|\n");
    for (key, sources) in rows {
        let present: Vec<&str> = sources
            .iter()
            .filter(|(_, present)| **present)
            .map(|(s, _)| s.as_str())
            .collect();
        section.push_str(&format!("| `{}` | {} |\n", key, present.join(", ")));
    }
    section.push('\n');

    section
}

fn generate_as_section(record: &AsRecord) -> String {
    let mut section = presence_table("Prefixes", "Route", &record.prefixes);
    section.push_str(&presence_table("Macros", "AS-SET", &record.macros));
    section
}

fn generate_macro_section(records: &[MacroRecord]) -> String {
    let mut section = String::new();

    section.push_str("## Members\n\n");
    if records.is_empty() {
        section.push_str("No definitions found.\n\n");
        return section;
    }

    section.push_str("| Source | Members |\n");
    section.push_str("|:---|:---|\n");
    for record in records {
        section.push_str(&format!("| {} | {} |\n", record.source, record.members.join(", ")));
    }
    section.push('\n');

    section
}

fn generate_expansion_section(records: &[MacroExpansionRecord]) -> String {
    let mut section = String::new();

    section.push_str("## Expansion\n\n");
    if records.is_empty() {
        section.push_str("No definitions found.\n\n");
        return section;
    }

    section.push_str("| Depth | AS-SET | Source | Path | Members |\n");
    section.push_str("|:---:|:---|:---|:---|:---|\n");
    for record in records {
        section.push_str(&format!(
            "| {} | `{}` | {} | {} | {} |\n",
            record.depth,
            record.as_macro,
            record.source,
            record.path.join(" → "),
            record.members.join(", ")
        ));
    }
    section.push('\n');

    section
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportKind;
    use chrono::Utc;

    fn metadata(kind: ReportKind) -> ReportMetadata {
        ReportMetadata {
            query: "192.0.2.0/24".to_string(),
            kind,
            generated_at: Utc::now(),
            duration_seconds: 0.25,
        }
    }

    fn prefix_report() -> Report {
        let mut entries = BTreeMap::new();
        entries.insert(
            "192.0.2.0/24".to_string(),
            PrefixReportEntry {
                sources: [("ripe".to_string(), vec![64500]), ("radb".to_string(), vec![64501])]
                    .into_iter()
                    .collect(),
                bgp: Some(vec![64500]),
                ripe_managed: true,
                advice: "Looks good, but multiple entries exist in registry".to_string(),
                label: Severity::Success,
            },
        );
        entries.insert(
            "192.0.2.0/25".to_string(),
            PrefixReportEntry {
                sources: [("arin".to_string(), vec![64502])].into_iter().collect(),
                bgp: None,
                ripe_managed: true,
                advice: "Route objects exist only in foreign registries; consider migrating".to_string(),
                label: Severity::Warning,
            },
        );

        Report {
            metadata: metadata(ReportKind::Prefix),
            body: ReportBody::Prefix(entries),
        }
    }

    #[test]
    fn test_generate_markdown_prefix_report() {
        let markdown = generate_markdown_report(&prefix_report());

        assert!(markdown.contains("# IRR Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("`192.0.2.0/24`"));
        assert!(markdown.contains("| Prefix | BGP | arin | radb | ripe | Managed | Advice |"));
        assert!(markdown.contains("AS64501"));
        assert!(markdown.contains("consider migrating"));
        assert!(markdown.contains("| 1 | 1 | 0 | **2** |"));
    }

    #[test]
    fn test_generate_metadata_section() {
        let section = generate_metadata_section(&metadata(ReportKind::ExactPrefix));
        assert!(section.contains("`192.0.2.0/24`"));
        assert!(section.contains("Exact prefix"));
        assert!(section.contains("0.25s"));
    }

    #[test]
    fn test_generate_as_section() {
        let mut record = AsRecord::default();
        record
            .prefixes
            .entry("203.0.113.0/24".to_string())
            .or_default()
            .insert("radb".to_string(), true);

        let section = generate_as_section(&record);
        assert!(section.contains("| `203.0.113.0/24` | radb |"));
        assert!(section.contains("## Macros\n\nNone found."));
    }

    #[test]
    fn test_generate_expansion_section() {
        let records = vec![MacroExpansionRecord {
            as_macro: "AS-MID".to_string(),
            source: "ripe".to_string(),
            depth: 1,
            path: vec!["AS-TOP".to_string(), "AS-MID".to_string()],
            members: vec!["AS64500".to_string(), "AS64501".to_string()],
        }];

        let section = generate_expansion_section(&records);
        assert!(section.contains("| 1 | `AS-MID` | ripe | AS-TOP → AS-MID | AS64500, AS64501 |"));
    }

    #[test]
    fn test_generate_macro_section_empty() {
        assert!(generate_macro_section(&[]).contains("No definitions found."));
    }

    #[test]
    fn test_generate_json_report_is_bare_body() {
        let json = generate_json_report(&prefix_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value.get("metadata").is_none());
        assert_eq!(value["192.0.2.0/24"]["ripe_managed"], serde_json::json!(true));
        assert_eq!(value["192.0.2.0/25"]["label"], serde_json::json!("warning"));
        assert!(value["192.0.2.0/25"].get("bgp").is_none());
    }
}
