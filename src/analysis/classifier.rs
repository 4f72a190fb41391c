//! Prefix consistency classification.
//!
//! Turns an aggregated [`PrefixRecord`] plus its managed flag into a
//! [`Verdict`]. The decision table is evaluated top-down within the managed
//! or unmanaged branch; the first matching row wins.
//!
//! | managed | authoritative entry        | condition                               | verdict                        |
//! |---------|----------------------------|-----------------------------------------|--------------------------------|
//! | yes     | yes, BGP origin matches it | single origin anywhere, none foreign    | `Perfect`                      |
//! | yes     | yes, BGP origin matches it | origin equals the foreign origin set    | `ForeignOrProxyObjects`        |
//! | yes     | yes, BGP origin matches it | origin among foreign origins            | `ForeignObjects`               |
//! | yes     | yes, BGP origin matches it | otherwise                               | `MultipleAuthoritativeEntries` |
//! | yes     | yes                        | BGP origin set, registry data exists    | `WrongOrigin`                  |
//! | yes     | yes                        | not in BGP                              | `NotInBgp`                     |
//! | yes     | no                         | BGP origin set                          | `NotRegisteredAuthoritative`   |
//! | yes     | no                         | not in BGP                              | `ForeignOnly`                  |
//! | no      | -                          | origin anywhere, one origin anywhere    | `ConsistentSingleObject`       |
//! | no      | -                          | origin anywhere, several origins        | `ConflictingObjects`           |
//! | no      | -                          | origin nowhere                          | `NoMatchingObject`             |
//! | no      | -                          | not in BGP                              | `NotInBgp`                     |

use crate::models::{Advice, IrrSources, PrefixRecord, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

/// More distinct BGP origins than this is reported as a diagnostic.
pub const MULTI_ORIGIN_THRESHOLD: usize = 2;

/// Origin sets derived from the known registries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginSets {
    /// Every origin registered in any known registry.
    pub anywhere: BTreeSet<u32>,
    /// Same, without the authoritative registry.
    pub anywhere_not_authoritative: BTreeSet<u32>,
}

impl OriginSets {
    /// Build the sets, skipping sources that are not known registries.
    pub fn compute(record: &PrefixRecord, sources: &IrrSources) -> Self {
        let mut sets = Self::default();

        for db in &sources.known {
            let Some(origins) = record.irr_origins.get(db) else {
                continue;
            };
            sets.anywhere.extend(origins.iter().copied());
            if *db != sources.authoritative {
                sets.anywhere_not_authoritative.extend(origins.iter().copied());
            }
        }

        sets
    }
}

/// The BGP origin picked to represent a prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginSelection {
    /// Numerically smallest distinct origin, `None` when not seen in BGP.
    pub representative: Option<u32>,
    /// All distinct origins observed.
    pub observed: BTreeSet<u32>,
}

impl OriginSelection {
    pub fn is_multi_origin(&self) -> bool {
        self.observed.len() > MULTI_ORIGIN_THRESHOLD
    }
}

/// Pick one representative BGP origin.
pub fn select_bgp_origin(bgp_origins: &[u32]) -> OriginSelection {
    let observed: BTreeSet<u32> = bgp_origins.iter().copied().collect();
    OriginSelection {
        representative: observed.first().copied(),
        observed,
    }
}

/// Outcome of classifying one prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Perfect,
    ForeignOrProxyObjects,
    ForeignObjects,
    MultipleAuthoritativeEntries,
    WrongOrigin,
    NotInBgp,
    NotRegisteredAuthoritative,
    ForeignOnly,
    ConsistentSingleObject,
    ConflictingObjects,
    NoMatchingObject,
}

impl Verdict {
    #[cfg(test)]
    pub const ALL: [Verdict; 11] = [
        Verdict::Perfect,
        Verdict::ForeignOrProxyObjects,
        Verdict::ForeignObjects,
        Verdict::MultipleAuthoritativeEntries,
        Verdict::WrongOrigin,
        Verdict::NotInBgp,
        Verdict::NotRegisteredAuthoritative,
        Verdict::ForeignOnly,
        Verdict::ConsistentSingleObject,
        Verdict::ConflictingObjects,
        Verdict::NoMatchingObject,
    ];

    pub fn label(&self) -> Severity {
        match self {
            Verdict::Perfect
            | Verdict::MultipleAuthoritativeEntries
            | Verdict::ConsistentSingleObject => Severity::Success,
            Verdict::ForeignOrProxyObjects
            | Verdict::ForeignObjects
            | Verdict::NotInBgp
            | Verdict::ForeignOnly
            | Verdict::ConflictingObjects => Severity::Warning,
            Verdict::WrongOrigin
            | Verdict::NotRegisteredAuthoritative
            | Verdict::NoMatchingObject => Severity::Danger,
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            Verdict::Perfect => "Perfect",
            Verdict::ForeignOrProxyObjects => {
                "Proper RIPE object, but foreign or proxy objects also exist"
            }
            Verdict::ForeignObjects => {
                "Proper RIPE object, but foreign objects also exist; consider removing"
            }
            Verdict::MultipleAuthoritativeEntries => {
                "Looks good, but multiple entries exist in registry"
            }
            Verdict::WrongOrigin => {
                "Prefix is in the global routing table but registered with the wrong origin"
            }
            Verdict::NotInBgp => {
                "Not seen in BGP, but (legacy) route objects exist; consider clean-up"
            }
            Verdict::NotRegisteredAuthoritative => {
                "Prefix is in the global routing table but NOT registered with the authoritative registry"
            }
            Verdict::ForeignOnly => {
                "Route objects exist only in foreign registries; consider migrating"
            }
            Verdict::ConsistentSingleObject => {
                "Looks good: BGP origin consistent with the single route object"
            }
            Verdict::ConflictingObjects => "Multiple route objects exist with different origins",
            Verdict::NoMatchingObject => {
                "Prefix is in the global routing table, but no route object anywhere has the matching origin"
            }
        }
    }
}

impl From<Verdict> for Advice {
    fn from(verdict: Verdict) -> Self {
        Advice {
            label: verdict.label(),
            text: verdict.text().to_string(),
        }
    }
}

/// Classify one prefix.
pub fn classify(record: &PrefixRecord, managed: bool, sources: &IrrSources) -> Verdict {
    let sets = OriginSets::compute(record, sources);
    let selection = select_bgp_origin(&record.bgp_origins);

    if selection.is_multi_origin() {
        warn!(
            "Multiple BGP origins {:?}, using only {:?}",
            selection.observed, selection.representative
        );
    }

    let origin = selection.representative;
    let authoritative = record.irr_origins.get(&sources.authoritative);

    if managed {
        classify_managed(origin, authoritative.map(Vec::as_slice), record, &sets)
    } else {
        classify_unmanaged(origin, &sets)
    }
}

fn classify_managed(
    origin: Option<u32>,
    authoritative: Option<&[u32]>,
    record: &PrefixRecord,
    sets: &OriginSets,
) -> Verdict {
    let Some(registered) = authoritative else {
        return match origin {
            Some(_) => Verdict::NotRegisteredAuthoritative,
            None => Verdict::ForeignOnly,
        };
    };

    match origin {
        Some(o) if registered.contains(&o) => {
            let foreign = &sets.anywhere_not_authoritative;
            if sets.anywhere.len() == 1 && !foreign.contains(&o) {
                Verdict::Perfect
            } else if origin_equals_origin_set(o, foreign) {
                Verdict::ForeignOrProxyObjects
            } else if foreign.contains(&o) {
                Verdict::ForeignObjects
            } else {
                Verdict::MultipleAuthoritativeEntries
            }
        }
        Some(_) if !record.irr_origins.is_empty() => Verdict::WrongOrigin,
        _ => Verdict::NotInBgp,
    }
}

fn classify_unmanaged(origin: Option<u32>, sets: &OriginSets) -> Verdict {
    match origin {
        Some(o) if sets.anywhere.contains(&o) => {
            if sets.anywhere.len() == 1 {
                Verdict::ConsistentSingleObject
            } else {
                Verdict::ConflictingObjects
            }
        }
        Some(_) => Verdict::NoMatchingObject,
        None => Verdict::NotInBgp,
    }
}

/// A single origin compared against a set of origins. The two are never
/// equal, so `ForeignOrProxyObjects` is currently unreachable.
fn origin_equals_origin_set(_origin: u32, _set: &BTreeSet<u32>) -> bool {
    false
}
