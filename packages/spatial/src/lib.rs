#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory boundary catalog with point-in-polygon lookups.
//!
//! Holds the county, council district, and neighborhood polygons for a
//! session, each kind in its own R-tree of bounding boxes. Lookups are
//! boundary-inclusive: a point on an edge or vertex belongs to the polygon.
//!
//! When several boundaries of the same kind contain a point, the one loaded
//! first wins. The number of matches is reported so callers can count
//! ambiguous points.

use std::collections::BTreeMap;

use crash_map_boundary_models::{BoundaryKind, BoundaryPolygon};
use geo::{Intersects, MultiPolygon, Point};
use rstar::{AABB, RTree, RTreeObject};

/// Bounding box of one boundary, pointing back at its load-order index.
#[derive(Debug, Clone)]
struct BoundaryEntry {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for BoundaryEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// All boundaries of one kind, in load order, plus their R-tree.
#[derive(Debug, Clone)]
struct KindIndex {
    polygons: Vec<BoundaryPolygon>,
    tree: RTree<BoundaryEntry>,
}

impl KindIndex {
    fn build(polygons: Vec<BoundaryPolygon>) -> Self {
        let entries = polygons
            .iter()
            .enumerate()
            .map(|(index, boundary)| BoundaryEntry {
                index,
                envelope: compute_envelope(&boundary.geometry),
            })
            .collect();

        Self {
            polygons,
            tree: RTree::bulk_load(entries),
        }
    }
}

/// Result of a containment lookup.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryMatch<'a> {
    /// The first boundary in load order that contains the point.
    pub boundary: &'a BoundaryPolygon,
    /// How many boundaries of the same kind contain the point. Anything
    /// above 1 means the point sits in an overlap.
    pub match_count: usize,
}

impl BoundaryMatch<'_> {
    /// Whether more than one boundary matched.
    #[must_use]
    pub const fn is_ambiguous(&self) -> bool {
        self.match_count > 1
    }
}

/// Read-only administrative boundary sets keyed by kind.
///
/// Constructed once per session and shared by the spatial join and the
/// layer composer.
#[derive(Debug, Clone, Default)]
pub struct BoundaryCatalog {
    kinds: BTreeMap<BoundaryKind, KindIndex>,
}

impl BoundaryCatalog {
    /// Builds the catalog, grouping boundaries by kind and keeping their
    /// relative load order within each kind.
    #[must_use]
    pub fn load(boundaries: impl IntoIterator<Item = BoundaryPolygon>) -> Self {
        let mut grouped: BTreeMap<BoundaryKind, Vec<BoundaryPolygon>> = BTreeMap::new();
        for boundary in boundaries {
            grouped.entry(boundary.kind).or_default().push(boundary);
        }

        let kinds = grouped
            .into_iter()
            .map(|(kind, polygons)| {
                log::info!("Loaded {} {kind} boundaries into catalog", polygons.len());
                (kind, KindIndex::build(polygons))
            })
            .collect();

        Self { kinds }
    }

    /// Returns the boundaries of `kind` in load order.
    #[must_use]
    pub fn polygons(&self, kind: BoundaryKind) -> &[BoundaryPolygon] {
        self.kinds
            .get(&kind)
            .map_or(&[], |index| index.polygons.as_slice())
    }

    /// Number of boundaries of `kind`.
    #[must_use]
    pub fn len(&self, kind: BoundaryKind) -> usize {
        self.polygons(kind).len()
    }

    /// Whether the catalog holds no boundaries of `kind`.
    #[must_use]
    pub fn is_empty(&self, kind: BoundaryKind) -> bool {
        self.polygons(kind).is_empty()
    }

    /// Finds the boundary of `kind` containing `point`.
    ///
    /// Overlaps resolve to the earliest-loaded boundary.
    #[must_use]
    pub fn lookup(&self, point: &Point<f64>, kind: BoundaryKind) -> Option<BoundaryMatch<'_>> {
        let index = self.kinds.get(&kind)?;
        let query_env = AABB::from_point([point.x(), point.y()]);

        let mut first: Option<usize> = None;
        let mut match_count = 0;

        for entry in index.tree.locate_in_envelope_intersecting(&query_env) {
            if index.polygons[entry.index].geometry.intersects(point) {
                match_count += 1;
                first = Some(first.map_or(entry.index, |i| i.min(entry.index)));
            }
        }

        first.map(|i| BoundaryMatch {
            boundary: &index.polygons[i],
            match_count,
        })
    }

    /// Name of the boundary of `kind` containing `point`, if any.
    #[must_use]
    pub fn contains(&self, point: &Point<f64>, kind: BoundaryKind) -> Option<&str> {
        self.lookup(point, kind)
            .map(|found| found.boundary.name.as_str())
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    use geo::BoundingRect;

    mp.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}
