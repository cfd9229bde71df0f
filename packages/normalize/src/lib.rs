#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raw coordinate and geometry normalization.
//!
//! Turns loosely typed source data into the canonical shapes used by the
//! rest of the pipeline: string lon/lat columns become [`geo::Point`]s,
//! `GeoJSON` features become [`CameraPoint`]s and [`BoundaryPolygon`]s.
//! Anything that can't be converted is dropped and logged, never raised.
//!
//! [`CameraPoint`]: crash_map_incident_models::CameraPoint
//! [`BoundaryPolygon`]: crash_map_boundary_models::BoundaryPolygon

pub mod features;
pub mod incidents;
pub mod parsing;

pub use features::{normalize_boundaries, normalize_cameras};
pub use incidents::normalize_incidents;

use thiserror::Error;

/// Why a single record's geometry could not be normalized.
///
/// These are reported per record and cause the record to be dropped; they
/// never abort a load.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// A coordinate field is absent or blank.
    #[error("missing {field}")]
    Missing {
        /// Which field was missing.
        field: &'static str,
    },

    /// A coordinate field is not a number.
    #[error("{field} is not numeric: {value:?}")]
    NotNumeric {
        /// Which field failed to parse.
        field: &'static str,
        /// The raw value.
        value: String,
    },

    /// A coordinate is NaN or infinite.
    #[error("non-finite coordinate ({lon}, {lat})")]
    NonFinite {
        /// Longitude.
        lon: f64,
        /// Latitude.
        lat: f64,
    },

    /// A coordinate is outside `|lat| <= 90`, `|lon| <= 180`.
    #[error("coordinate out of range ({lon}, {lat})")]
    OutOfRange {
        /// Longitude.
        lon: f64,
        /// Latitude.
        lat: f64,
    },

    /// The feature has no geometry.
    #[error("feature has no geometry")]
    NoGeometry,

    /// The geometry type can't be converted to the wanted shape.
    #[error("unsupported geometry type {0}")]
    Unsupported(String),
}
