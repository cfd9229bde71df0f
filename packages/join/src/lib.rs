#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spatial and membership join of crash incidents.
//!
//! Attributes each normalized incident to the boundary that contains it,
//! keeps only incidents inside the target region, and intersects the
//! result with a [`MembershipSet`] of report ids taken from a related
//! participant table. The join runs once per session load; filter changes
//! never repeat it.

use std::collections::BTreeSet;

use crash_map_boundary_models::BoundaryKind;
use crash_map_incident_models::IncidentRecord;
use crash_map_spatial::BoundaryCatalog;

/// Deduplicated set of report ids from a participant table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipSet {
    ids: BTreeSet<String>,
}

impl MembershipSet {
    /// Builds a set from raw ids. Ids are trimmed and blanks are skipped.
    #[must_use]
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            ids: ids
                .into_iter()
                .map(|id| id.as_ref().trim().to_string())
                .filter(|id| !id.is_empty())
                .collect(),
        }
    }

    /// Whether `report_id` is a member.
    #[must_use]
    pub fn contains(&self, report_id: &str) -> bool {
        self.ids.contains(report_id)
    }

    /// Number of distinct ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the set has no ids.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Which boundary an incident must fall inside to survive the join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinTarget {
    /// Boundary kind to resolve containment against.
    pub kind: BoundaryKind,
    /// Name of the boundary to keep (e.g. `"Baltimore City"`).
    pub region: String,
}

impl JoinTarget {
    /// Target a single county by name.
    #[must_use]
    pub fn county(region: impl Into<String>) -> Self {
        Self {
            kind: BoundaryKind::County,
            region: region.into(),
        }
    }
}

/// Counts of what happened to each input incident.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    /// Incidents passed in.
    pub input: usize,
    /// Dropped because an earlier incident had the same report id.
    pub duplicates: usize,
    /// Dropped because no boundary of the target kind contains them.
    pub outside: usize,
    /// Dropped because they fall in a boundary other than the target.
    pub other_region: usize,
    /// Dropped because their report id is not in the membership set.
    pub not_member: usize,
    /// Points contained by more than one boundary, resolved to the
    /// earliest-loaded one. Counted whether or not they survive.
    pub ambiguous: usize,
    /// Incidents returned.
    pub output: usize,
}

/// Joined incidents plus the bookkeeping of the join.
#[derive(Debug, Clone, Default)]
pub struct JoinOutcome {
    /// Surviving incidents with `region` set, in input order.
    pub incidents: Vec<IncidentRecord>,
    /// Per-step drop counts.
    pub stats: JoinStats,
}

/// Attributes incidents to `target.kind` boundaries and keeps the ones in
/// `target.region` whose report id is in `membership`.
///
/// Every returned incident has `region == Some(target.region)` and a report
/// id in `membership`. Duplicate report ids keep their first occurrence.
/// An empty membership set or an empty boundary set yields no incidents.
#[must_use]
pub fn join(
    incidents: impl IntoIterator<Item = IncidentRecord>,
    catalog: &BoundaryCatalog,
    target: &JoinTarget,
    membership: &MembershipSet,
) -> JoinOutcome {
    let mut stats = JoinStats::default();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut joined = Vec::new();

    for mut incident in incidents {
        stats.input += 1;

        if !seen.insert(incident.report_id.clone()) {
            stats.duplicates += 1;
            continue;
        }

        let Some(found) = catalog.lookup(&incident.geometry, target.kind) else {
            stats.outside += 1;
            continue;
        };
        if found.is_ambiguous() {
            stats.ambiguous += 1;
            log::debug!(
                "Incident {} falls in {} {} boundaries, using {}",
                incident.report_id,
                found.match_count,
                target.kind,
                found.boundary.name
            );
        }
        if found.boundary.name != target.region {
            stats.other_region += 1;
            continue;
        }

        if !membership.contains(&incident.report_id) {
            stats.not_member += 1;
            continue;
        }

        incident.region = Some(found.boundary.name.clone());
        joined.push(incident);
    }

    stats.output = joined.len();
    log_stats(&stats, target, membership, catalog);

    JoinOutcome {
        incidents: joined,
        stats,
    }
}

fn log_stats(
    stats: &JoinStats,
    target: &JoinTarget,
    membership: &MembershipSet,
    catalog: &BoundaryCatalog,
) {
    if catalog.is_empty(target.kind) {
        log::warn!("No {} boundaries loaded; join is empty", target.kind);
    }
    if membership.is_empty() {
        log::warn!("Membership set is empty; join is empty");
    }
    if stats.ambiguous > 0 {
        log::warn!(
            "{} incidents fall in overlapping {} boundaries (resolved to first loaded)",
            stats.ambiguous,
            target.kind
        );
    }
    log::info!(
        "Joined {} of {} incidents to {} ({} duplicate, {} outside, {} other region, {} not member)",
        stats.output,
        stats.input,
        target.region,
        stats.duplicates,
        stats.outside,
        stats.other_region,
        stats.not_member
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crash_map_boundary_models::BoundaryPolygon;
    use geo::{LineString, MultiPolygon, Point, Polygon};

    fn county(
        name: &str,
        min_lon: f64,
        min_lat: f64,
        max_lon: f64,
        max_lat: f64,
    ) -> BoundaryPolygon {
        BoundaryPolygon {
            name: name.to_string(),
            kind: BoundaryKind::County,
            geometry: MultiPolygon(vec![Polygon::new(
                LineString::from(vec![
                    (min_lon, min_lat),
                    (max_lon, min_lat),
                    (max_lon, max_lat),
                    (min_lon, max_lat),
                    (min_lon, min_lat),
                ]),
                vec![],
            )]),
        }
    }

    fn incident(id: &str, lon: f64, lat: f64) -> IncidentRecord {
        IncidentRecord {
            report_id: id.to_string(),
            geometry: Point::new(lon, lat),
            crash_timestamp: NaiveDate::from_ymd_opt(2020, 5, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            involves_nonmotorist: false,
            region: None,
        }
    }

    fn catalog() -> BoundaryCatalog {
        BoundaryCatalog::load(vec![
            county("Baltimore City", -76.72, 39.19, -76.52, 39.38),
            county("Baltimore County", -76.90, 39.38, -76.30, 39.72),
        ])
    }

    #[test]
    fn keeps_target_region_members_only() {
        let incidents = vec![
            incident("1", -76.6, 39.3),
            incident("2", -76.55, 39.25),
            incident("3", -76.6, 39.5),
            incident("4", -77.5, 39.0),
            incident("5", -76.58, 39.28),
        ];
        let membership = MembershipSet::from_ids(["1", "2", "3", "4"]);
        let outcome = join(
            incidents,
            &catalog(),
            &JoinTarget::county("Baltimore City"),
            &membership,
        );

        let ids: Vec<&str> = outcome
            .incidents
            .iter()
            .map(|i| i.report_id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
        for incident in &outcome.incidents {
            assert_eq!(incident.region.as_deref(), Some("Baltimore City"));
            assert!(membership.contains(&incident.report_id));
        }
        assert_eq!(
            outcome.stats,
            JoinStats {
                input: 5,
                duplicates: 0,
                outside: 1,
                other_region: 1,
                not_member: 1,
                ambiguous: 0,
                output: 2,
            }
        );
    }

    #[test]
    fn empty_membership_yields_empty_output() {
        let outcome = join(
            vec![incident("1", -76.6, 39.3)],
            &catalog(),
            &JoinTarget::county("Baltimore City"),
            &MembershipSet::default(),
        );
        assert!(outcome.incidents.is_empty());
        assert_eq!(outcome.stats.not_member, 1);
    }

    #[test]
    fn empty_boundaries_yield_empty_output() {
        let outcome = join(
            vec![incident("1", -76.6, 39.3)],
            &BoundaryCatalog::default(),
            &JoinTarget::county("Baltimore City"),
            &MembershipSet::from_ids(["1"]),
        );
        assert!(outcome.incidents.is_empty());
        assert_eq!(outcome.stats.outside, 1);
    }

    #[test]
    fn duplicate_report_ids_appear_once() {
        let outcome = join(
            vec![
                incident("1", -76.6, 39.3),
                incident("1", -76.61, 39.31),
                incident("2", -76.6, 39.3),
            ],
            &catalog(),
            &JoinTarget::county("Baltimore City"),
            &MembershipSet::from_ids(["1", "1", " 2 ", ""]),
        );
        let ids: Vec<&str> = outcome
            .incidents
            .iter()
            .map(|i| i.report_id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert!((outcome.incidents[0].longitude() - -76.6).abs() < f64::EPSILON);
        assert_eq!(outcome.stats.duplicates, 1);
    }

    #[test]
    fn membership_set_dedupes_and_trims() {
        let set = MembershipSet::from_ids(["A1", " A1", "B2", "  "]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("A1"));
        assert!(!set.contains(""));
    }

    #[test]
    fn overlapping_boundaries_count_as_ambiguous() {
        let catalog = BoundaryCatalog::load(vec![
            county("Baltimore City", -76.72, 39.19, -76.52, 39.38),
            county("Overlap", -76.65, 39.25, -76.40, 39.45),
        ]);
        let outcome = join(
            vec![incident("1", -76.6, 39.3), incident("2", -76.45, 39.3)],
            &catalog,
            &JoinTarget::county("Baltimore City"),
            &MembershipSet::from_ids(["1", "2"]),
        );
        assert_eq!(outcome.incidents.len(), 1);
        assert_eq!(outcome.incidents[0].report_id, "1");
        assert_eq!(outcome.stats.ambiguous, 1);
        assert_eq!(outcome.stats.other_region, 1);
    }

    #[test]
    fn output_is_subset_of_input() {
        let input = vec![
            incident("1", -76.6, 39.3),
            incident("2", -76.6, 39.6),
            incident("3", -76.7, 39.2),
        ];
        let outcome = join(
            input.clone(),
            &catalog(),
            &JoinTarget::county("Baltimore City"),
            &MembershipSet::from_ids(["1", "2", "3"]),
        );
        for joined in &outcome.incidents {
            assert!(input.iter().any(|i| i.report_id == joined.report_id
                && i.geometry == joined.geometry
                && i.crash_timestamp == joined.crash_timestamp));
        }
        assert!(outcome.incidents.len() <= input.len());
    }
}
