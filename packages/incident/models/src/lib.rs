#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Crash incident, participant, and camera record types.
//!
//! Raw tabular rows ([`RawIncidentRow`]) are produced by the loading layer
//! and turned into [`IncidentRecord`]s by the normalizer. Every record that
//! survives normalization carries a valid point geometry; the `region`
//! field is only filled in by the spatial join.

use chrono::{NaiveDate, NaiveDateTime};
use geo::Point;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One row of the raw crash report table, with every field still a string.
///
/// Column names are mapped onto these fields by the loader, so the
/// normalizer never deals with source-specific headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawIncidentRow {
    /// Report identifier (e.g. `"ADJ1234567"`).
    pub report_id: Option<String>,
    /// Longitude as it appears in the source.
    pub longitude: Option<String>,
    /// Latitude as it appears in the source.
    pub latitude: Option<String>,
    /// Crash date/time as it appears in the source.
    pub crash_timestamp: Option<String>,
    /// Precomputed non-motorist flag, when the source carries one.
    pub nonmotorist: Option<String>,
}

/// A crash incident with a validated point location.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentRecord {
    /// Report identifier, unique within the incident set.
    pub report_id: String,
    /// Location as `(longitude, latitude)` in WGS84.
    pub geometry: Point<f64>,
    /// When the crash occurred (local time, no zone).
    pub crash_timestamp: NaiveDateTime,
    /// Whether a pedestrian, cyclist, or other non-motorist was involved.
    pub involves_nonmotorist: bool,
    /// Name of the containing boundary. `None` until the spatial join runs.
    pub region: Option<String>,
}

impl IncidentRecord {
    /// Longitude in degrees.
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.geometry.x()
    }

    /// Latitude in degrees.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.geometry.y()
    }

    /// Calendar date of the crash.
    #[must_use]
    pub const fn crash_date(&self) -> NaiveDate {
        self.crash_timestamp.date()
    }
}

/// Automated traffic enforcement camera type.
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
pub enum CameraCategory {
    /// Red light running camera
    RedLight,
    /// Speed enforcement camera
    Speed,
}

impl CameraCategory {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::RedLight, Self::Speed]
    }
}

/// A fixed camera location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPoint {
    /// What the camera enforces.
    pub category: CameraCategory,
    /// Location as `(longitude, latitude)` in WGS84.
    pub geometry: Point<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr as _;

    #[test]
    fn camera_category_string_forms() {
        assert_eq!(CameraCategory::RedLight.as_ref(), "red_light");
        assert_eq!(
            CameraCategory::from_str("speed").unwrap(),
            CameraCategory::Speed
        );
        assert!(CameraCategory::from_str("toll").is_err());
    }

    #[test]
    fn incident_accessors_read_point_axes() {
        let record = IncidentRecord {
            report_id: "1".to_string(),
            geometry: Point::new(-76.6, 39.3),
            crash_timestamp: NaiveDate::from_ymd_opt(2020, 5, 1)
                .unwrap()
                .and_hms_opt(13, 45, 0)
                .unwrap(),
            involves_nonmotorist: true,
            region: None,
        };
        assert!((record.longitude() - -76.6).abs() < f64::EPSILON);
        assert!((record.latitude() - 39.3).abs() < f64::EPSILON);
        assert_eq!(
            record.crash_date(),
            NaiveDate::from_ymd_opt(2020, 5, 1).unwrap()
        );
    }
}
