#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Temporal and non-motorist predicates over joined crash incidents.
//!
//! Runs on every user interaction against the cached, already-joined
//! incident set. Each predicate is a plain function over an
//! [`IncidentRecord`] so it can be tested without any session state.

use chrono::NaiveDate;
use crash_map_incident_models::IncidentRecord;
use crash_map_join::MembershipSet;
use crash_map_layer_models::{DateRange, FilterCriteria};
use thiserror::Error;

/// Invalid filter input. Filtering is skipped and the caller is expected
/// to surface the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The start date is after the end date.
    #[error("End date must fall after start date.")]
    InvertedDateRange {
        /// Requested start date.
        start: NaiveDate,
        /// Requested end date.
        end: NaiveDate,
    },
}

/// Where the non-motorist flag of an incident comes from.
///
/// Both sources give the same answer when the column was derived from the
/// same participant table as the membership set.
#[derive(Debug, Clone, Copy)]
pub enum NonmotoristSource<'a> {
    /// Use the precomputed `involves_nonmotorist` column.
    Column,
    /// An incident involves a non-motorist if its report id is in the set.
    Membership(&'a MembershipSet),
}

impl NonmotoristSource<'_> {
    /// Resolves the non-motorist flag for `incident`.
    #[must_use]
    pub fn involves_nonmotorist(&self, incident: &IncidentRecord) -> bool {
        match self {
            Self::Column => incident.involves_nonmotorist,
            Self::Membership(set) => set.contains(&incident.report_id),
        }
    }
}

/// Filtered incidents, plus the validation problem that caused filtering
/// to be skipped, if any.
#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    /// Incidents in input order.
    pub incidents: Vec<IncidentRecord>,
    /// Set when the criteria were invalid and `incidents` is the
    /// unfiltered input.
    pub validation: Option<ValidationError>,
}

/// Whether the crash happened within `range`, counting the whole of the
/// end date.
#[must_use]
pub fn in_date_range(incident: &IncidentRecord, range: &DateRange) -> bool {
    range.contains(incident.crash_date())
}

/// Whether the incident passes the non-motorist toggle.
#[must_use]
pub fn passes_nonmotorist(
    incident: &IncidentRecord,
    nonmotorist_only: bool,
    source: &NonmotoristSource<'_>,
) -> bool {
    !nonmotorist_only || source.involves_nonmotorist(incident)
}

/// Checks that the criteria can be applied.
///
/// # Errors
///
/// Returns [`ValidationError::InvertedDateRange`] if the start date is
/// after the end date.
pub fn validate(criteria: &FilterCriteria) -> Result<(), ValidationError> {
    let DateRange { start, end } = criteria.date_range;
    if !criteria.date_range.is_ordered() {
        return Err(ValidationError::InvertedDateRange { start, end });
    }
    Ok(())
}

/// Applies the date range and non-motorist predicates.
///
/// With an inverted date range nothing is filtered: the input comes back
/// unchanged alongside a [`ValidationError`].
#[must_use]
pub fn filter(
    incidents: &[IncidentRecord],
    criteria: &FilterCriteria,
    nonmotorist: &NonmotoristSource<'_>,
) -> FilterOutcome {
    if let Err(e) = validate(criteria) {
        log::warn!("Skipping filter: {e}");
        return FilterOutcome {
            incidents: incidents.to_vec(),
            validation: Some(e),
        };
    }

    let filtered: Vec<IncidentRecord> = incidents
        .iter()
        .filter(|incident| in_date_range(incident, &criteria.date_range))
        .filter(|incident| passes_nonmotorist(incident, criteria.nonmotorist_only, nonmotorist))
        .cloned()
        .collect();

    log::debug!(
        "Filtered {} of {} incidents ({} to {}, nonmotorist_only={})",
        filtered.len(),
        incidents.len(),
        criteria.date_range.start,
        criteria.date_range.end,
        criteria.nonmotorist_only
    );

    FilterOutcome {
        incidents: filtered,
        validation: None,
    }
}
