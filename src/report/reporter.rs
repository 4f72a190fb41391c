//! Report builders.
//!
//! Each report issues its store queries in sequence, reshapes the rows and,
//! for prefixes, resolves the managed flag and classifies every record.

use crate::analysis::{
    aggregate_as_rows, aggregate_prefix_rows, classify, expansion_records, macro_records,
    ManagedRangeResolver,
};
use crate::error::{ReportError, StoreError};
use crate::models::{
    Advice, AsRecord, IrrSources, MacroExpansionRecord, MacroRecord, PrefixRecord,
    PrefixReportEntry, Report, ReportBody, ReportKind, ReportMetadata,
};
use crate::prefix::Prefix;
use crate::query::{parse_as_number, SearchKey};
use crate::store::RouteStore;
use chrono::Utc;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info};

/// Options for [`run_report`].
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    /// Only the queried prefix, no more-specifics.
    pub exact: bool,
    /// Expand AS-macros recursively instead of listing direct members.
    pub expand: bool,
    pub sources: IrrSources,
}

/// Answer a classified search key with the matching report.
pub fn run_report<S: RouteStore + ?Sized>(
    store: &S,
    key: &SearchKey,
    query: &str,
    options: &ReportOptions,
) -> Result<Report, ReportError> {
    let start = Instant::now();

    let (kind, body) = match key {
        SearchKey::Prefix(prefix) => {
            let kind = if options.exact {
                ReportKind::ExactPrefix
            } else {
                ReportKind::Prefix
            };
            let entries = prefix_report(store, prefix, options.exact, &options.sources)?;
            (kind, ReportBody::Prefix(entries))
        }
        SearchKey::AsNumber(asn) => (
            ReportKind::AsNumber,
            ReportBody::AsNumber(as_report(store, &asn.to_string())?),
        ),
        SearchKey::AsMacro(name) if options.expand => (
            ReportKind::AsMacroExpand,
            ReportBody::AsMacroExpand(as_macro_expand_report(store, name)?),
        ),
        SearchKey::AsMacro(name) => (
            ReportKind::AsMacro,
            ReportBody::AsMacro(as_macro_report(store, name)?),
        ),
    };

    Ok(Report {
        metadata: ReportMetadata {
            query: query.to_string(),
            kind,
            generated_at: Utc::now(),
            duration_seconds: start.elapsed().as_secs_f64(),
        },
        body,
    })
}

/// Build the prefix report for `prefix`.
///
/// Fails with [`ReportError::NotFound`] when the store has no rows at all.
pub fn prefix_report<S: RouteStore + ?Sized>(
    store: &S,
    prefix: &Prefix,
    exact: bool,
    sources: &IrrSources,
) -> Result<BTreeMap<String, PrefixReportEntry>, ReportError> {
    let start = Instant::now();
    info!("Prefix report: {}, exact={}", prefix, exact);

    let rows = store.query_prefix(prefix, exact)?;
    if rows.is_empty() {
        return Err(ReportError::NotFound(prefix.to_string()));
    }

    let mut records = aggregate_prefix_rows(&rows, sources);
    debug!("Prefixes: {:?}", records.keys().collect::<Vec<_>>());

    let resolver = ManagedRangeResolver::new(store);
    for (pfx, record) in records.iter_mut() {
        let parsed = Prefix::parse(pfx)
            .map_err(|_| StoreError::Malformed(format!("store returned invalid prefix {}", pfx)))?;
        let managed = resolver.is_managed(&parsed)?;
        let advice = Advice::from(classify(record, managed, sources));

        info!("{}: {} ({})", pfx, advice.text, advice.label);
        record.managed = Some(managed);
        record.advice = Some(advice);
    }

    let entries = records
        .iter()
        .filter_map(|(pfx, record)| render_prefix_record(record).map(|e| (pfx.clone(), e)))
        .collect();

    info!(
        "Time for prefix report for {}: {:.2}s",
        prefix,
        start.elapsed().as_secs_f64()
    );
    Ok(entries)
}

/// Map a classified record to its API shape.
///
/// Returns `None` until the managed flag and advice have been set.
pub fn render_prefix_record(record: &PrefixRecord) -> Option<PrefixReportEntry> {
    let managed = record.managed?;
    let advice = record.advice.as_ref()?;

    Some(PrefixReportEntry {
        sources: record.irr_origins.clone(),
        bgp: (!record.bgp_origins.is_empty()).then(|| record.bgp_origins.clone()),
        ripe_managed: managed,
        advice: advice.text.clone(),
        label: advice.label,
    })
}

/// Build the AS report. `as_number` must be a plain integer.
pub fn as_report<S: RouteStore + ?Sized>(store: &S, as_number: &str) -> Result<AsRecord, ReportError> {
    let asn = parse_as_number(as_number)?;
    let start = Instant::now();
    info!("AS report: {}", asn);

    let routes = store.query_as(asn)?;
    let macros = store.query_as_contain(&format!("AS{}", asn))?;
    let record = aggregate_as_rows(&routes, &macros);

    info!(
        "Time for as report for {}: {:.2}s",
        asn,
        start.elapsed().as_secs_f64()
    );
    Ok(record)
}

/// List the definitions of an AS-macro, one per registry.
pub fn as_macro_report<S: RouteStore + ?Sized>(
    store: &S,
    as_macro: &str,
) -> Result<Vec<MacroRecord>, ReportError> {
    let start = Instant::now();
    info!("AS macro report: {}", as_macro);

    let records = macro_records(&store.query_as_macro(as_macro)?);

    info!(
        "Time for as macro report for {}: {:.2}s",
        as_macro,
        start.elapsed().as_secs_f64()
    );
    Ok(records)
}

/// Expand an AS-macro through nested macros.
pub fn as_macro_expand_report<S: RouteStore + ?Sized>(
    store: &S,
    as_macro: &str,
) -> Result<Vec<MacroExpansionRecord>, ReportError> {
    let start = Instant::now();
    info!("AS macro expand report: {}", as_macro);

    let records = expansion_records(&store.query_as_macro_expand(as_macro)?);

    info!(
        "Time for as macro expand report for {}: {:.2}s",
        as_macro,
        start.elapsed().as_secs_f64()
    );
    Ok(records)
}
