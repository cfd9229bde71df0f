#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Administrative boundary polygon types.
//!
//! Boundaries are reference data: loaded once per session, never mutated,
//! and used both for scoping incidents (counties) and for map overlays
//! (council districts, neighborhoods).

use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The administrative level a boundary polygon belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BoundaryKind {
    /// County or county-equivalent (e.g. "Baltimore City")
    County,
    /// City council district
    District,
    /// City neighborhood
    Neighborhood,
}

impl BoundaryKind {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::County, Self::District, Self::Neighborhood]
    }
}

/// A named administrative polygon.
///
/// Single polygons are stored as one-member multipolygons so every
/// boundary has the same shape.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryPolygon {
    /// Administrative label (e.g. "Baltimore City", "District 12").
    pub name: String,
    /// Which administrative level this boundary belongs to.
    pub kind: BoundaryKind,
    /// Closed outline in WGS84 `(longitude, latitude)` coordinates.
    pub geometry: MultiPolygon<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr as _;

    #[test]
    fn kind_parses_from_config_names() {
        for kind in BoundaryKind::all() {
            assert_eq!(BoundaryKind::from_str(kind.as_ref()).unwrap(), *kind);
        }
        assert_eq!(
            BoundaryKind::from_str("neighborhood").unwrap(),
            BoundaryKind::Neighborhood
        );
    }
}
