//! Shared parsing utilities for raw crash data.
//!
//! Coordinate, timestamp, and yes/no flag parsing used by the incident
//! normalizer and the `GeoJSON` feature normalizers.

use chrono::{NaiveDate, NaiveDateTime};
use geo::Point;

use crate::GeometryError;

/// Date-time layouts seen in crash report exports, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts, interpreted as midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parses a crash timestamp in any of the supported layouts.
#[must_use]
pub fn parse_crash_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    DATE_FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(s, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    })
}

/// Parses a yes/no style flag. Blank values count as `false`; anything
/// unrecognized is `None`.
#[must_use]
pub fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_uppercase().as_str() {
        "Y" | "YES" | "TRUE" | "T" | "1" => Some(true),
        "" | "N" | "NO" | "FALSE" | "F" | "0" => Some(false),
        _ => None,
    }
}

/// Validates a numeric `(lon, lat)` pair and builds a point.
///
/// # Errors
///
/// Returns [`GeometryError`] if either value is non-finite or out of range.
pub fn point_from_lon_lat(lon: f64, lat: f64) -> Result<Point<f64>, GeometryError> {
    if !lon.is_finite() || !lat.is_finite() {
        return Err(GeometryError::NonFinite { lon, lat });
    }
    if lat.abs() > 90.0 || lon.abs() > 180.0 {
        return Err(GeometryError::OutOfRange { lon, lat });
    }
    Ok(Point::new(lon, lat))
}

/// Parses lon/lat from optional string fields and builds a point.
///
/// # Errors
///
/// Returns [`GeometryError`] if a field is missing, not numeric,
/// non-finite, or out of range.
pub fn parse_lon_lat_str(
    lon: Option<&str>,
    lat: Option<&str>,
) -> Result<Point<f64>, GeometryError> {
    let lon = parse_coordinate("longitude", lon)?;
    let lat = parse_coordinate("latitude", lat)?;
    point_from_lon_lat(lon, lat)
}

fn parse_coordinate(field: &'static str, value: Option<&str>) -> Result<f64, GeometryError> {
    let value = value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(GeometryError::Missing { field })?;
    value.parse::<f64>().map_err(|_| GeometryError::NotNumeric {
        field,
        value: value.to_string(),
    })
}
