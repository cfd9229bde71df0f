//! Readers for the CSV and `GeoJSON` source datasets.
//!
//! The `read_*` functions parse from any [`Read`] so they can be exercised
//! on in-memory data; the `load_*` wrappers open a file and attach its path
//! to any failure.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crash_map_incident_models::RawIncidentRow;
use crash_map_join::MembershipSet;

use crate::config::IncidentFieldMapping;
use crate::{LoadError, PipelineError};

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new().flexible(true).from_reader(reader)
}

/// Trimmed header names, with any UTF-8 byte order mark removed.
fn headers<R: Read>(reader: &mut csv::Reader<R>) -> Result<Vec<String>, LoadError> {
    Ok(reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_owned())
        .collect())
}

fn column_index(headers: &[String], name: &str) -> Result<usize, LoadError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| LoadError::MissingColumn(name.to_owned()))
}

fn cell(record: &csv::StringRecord, index: usize) -> Option<String> {
    record
        .get(index)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Reads the crash report table into raw rows using the configured column
/// names. Blank cells become `None`.
///
/// # Errors
///
/// Returns [`LoadError::MissingColumn`] if a configured column is absent,
/// or [`LoadError::Csv`] if the data is malformed.
pub fn read_incident_rows<R: Read>(
    reader: R,
    fields: &IncidentFieldMapping,
) -> Result<Vec<RawIncidentRow>, LoadError> {
    let mut reader = csv_reader(reader);
    let headers = headers(&mut reader)?;

    let report_id = column_index(&headers, &fields.report_id)?;
    let longitude = column_index(&headers, &fields.longitude)?;
    let latitude = column_index(&headers, &fields.latitude)?;
    let crash_timestamp = column_index(&headers, &fields.crash_timestamp)?;
    let nonmotorist = fields
        .nonmotorist
        .as_deref()
        .map(|name| column_index(&headers, name))
        .transpose()?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(RawIncidentRow {
            report_id: cell(&record, report_id),
            longitude: cell(&record, longitude),
            latitude: cell(&record, latitude),
            crash_timestamp: cell(&record, crash_timestamp),
            nonmotorist: nonmotorist.and_then(|i| cell(&record, i)),
        });
    }

    Ok(rows)
}

/// Reads the report id column of a participant table into a membership
/// set. A report with several participants appears once.
///
/// # Errors
///
/// Returns [`LoadError::MissingColumn`] if `report_id_column` is absent,
/// or [`LoadError::Csv`] if the data is malformed.
pub fn read_membership<R: Read>(
    reader: R,
    report_id_column: &str,
) -> Result<MembershipSet, LoadError> {
    let mut reader = csv_reader(reader);
    let headers = headers(&mut reader)?;
    let index = column_index(&headers, report_id_column)?;

    let mut ids = Vec::new();
    for result in reader.records() {
        let record = result?;
        if let Some(id) = cell(&record, index) {
            ids.push(id);
        }
    }

    Ok(MembershipSet::from_ids(ids))
}

/// Reads the features of a `GeoJSON` document. A single `Feature` is
/// treated as a collection of one.
///
/// # Errors
///
/// Returns [`LoadError`] if the document is not JSON, not `GeoJSON`, or a
/// bare geometry.
pub fn read_features<R: Read>(reader: R) -> Result<Vec<geojson::Feature>, LoadError> {
    let value: serde_json::Value = serde_json::from_reader(reader)?;
    match geojson::GeoJson::from_json_value(value)? {
        geojson::GeoJson::FeatureCollection(collection) => Ok(collection.features),
        geojson::GeoJson::Feature(feature) => Ok(vec![feature]),
        geojson::GeoJson::Geometry(_) => Err(LoadError::NotFeatureCollection),
    }
}

fn with_path<T>(path: &Path, result: Result<T, LoadError>) -> Result<T, PipelineError> {
    result.map_err(|source| PipelineError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })
}

fn open(path: &Path) -> Result<BufReader<File>, LoadError> {
    Ok(BufReader::new(File::open(path)?))
}

/// Opens and reads a crash report CSV.
///
/// # Errors
///
/// Returns [`PipelineError::SourceUnavailable`] if the file can't be
/// opened or parsed.
pub fn load_incident_rows(
    path: &Path,
    fields: &IncidentFieldMapping,
) -> Result<Vec<RawIncidentRow>, PipelineError> {
    let rows = with_path(path, open(path).and_then(|r| read_incident_rows(r, fields)))?;
    log::info!("Read {} incident rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Opens and reads a participant CSV.
///
/// # Errors
///
/// Returns [`PipelineError::SourceUnavailable`] if the file can't be
/// opened or parsed.
pub fn load_membership(
    path: &Path,
    report_id_column: &str,
) -> Result<MembershipSet, PipelineError> {
    let membership = with_path(
        path,
        open(path).and_then(|r| read_membership(r, report_id_column)),
    )?;
    log::info!(
        "Read {} distinct participant report ids from {}",
        membership.len(),
        path.display()
    );
    Ok(membership)
}

/// Opens and reads a `GeoJSON` file.
///
/// # Errors
///
/// Returns [`PipelineError::SourceUnavailable`] if the file can't be
/// opened or parsed.
pub fn load_features(path: &Path) -> Result<Vec<geojson::Feature>, PipelineError> {
    let features = with_path(path, open(path).and_then(read_features))?;
    log::debug!("Read {} features from {}", features.len(), path.display());
    Ok(features)
}
