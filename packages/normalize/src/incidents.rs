//! Normalizes raw crash report rows into [`IncidentRecord`]s.

use crash_map_incident_models::{IncidentRecord, RawIncidentRow};

use crate::parsing::{parse_crash_timestamp, parse_flag, parse_lon_lat_str};

/// Normalizes raw rows into incidents with validated point geometry.
///
/// Rows with a missing report id, an unparseable timestamp, or a missing,
/// non-numeric, or out-of-range coordinate are dropped. Output order
/// matches input order.
#[must_use]
pub fn normalize_incidents(rows: &[RawIncidentRow]) -> Vec<IncidentRecord> {
    let incidents: Vec<IncidentRecord> = rows.iter().filter_map(normalize_row).collect();

    let dropped = rows.len() - incidents.len();
    if dropped > 0 {
        log::info!(
            "Normalized {} of {} incident rows ({dropped} dropped)",
            incidents.len(),
            rows.len()
        );
    }

    incidents
}

fn normalize_row(row: &RawIncidentRow) -> Option<IncidentRecord> {
    let Some(report_id) = row
        .report_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    else {
        log::debug!(
            "Dropping incident at ({:?}, {:?}): missing report id",
            row.longitude,
            row.latitude
        );
        return None;
    };
    let report_id = report_id.to_string();

    let geometry = match parse_lon_lat_str(row.longitude.as_deref(), row.latitude.as_deref()) {
        Ok(point) => point,
        Err(e) => {
            log::debug!("Dropping incident {report_id}: {e}");
            return None;
        }
    };

    let Some(crash_timestamp) = row.crash_timestamp.as_deref().and_then(parse_crash_timestamp)
    else {
        log::debug!(
            "Dropping incident {report_id}: unparseable timestamp {:?}",
            row.crash_timestamp
        );
        return None;
    };

    let involves_nonmotorist = row
        .nonmotorist
        .as_deref()
        .and_then(parse_flag)
        .unwrap_or(false);

    Some(IncidentRecord {
        report_id,
        geometry,
        crash_timestamp,
        involves_nonmotorist,
        region: None,
    })
}
