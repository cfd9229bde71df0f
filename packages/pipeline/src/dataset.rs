//! The joined base dataset and the per-interaction render step.

use crash_map_boundary_models::BoundaryPolygon;
use crash_map_filter::{NonmotoristSource, ValidationError};
use crash_map_incident_models::{CameraPoint, IncidentRecord, RawIncidentRow};
use crash_map_join::{JoinStats, JoinTarget, MembershipSet};
use crash_map_layer_models::{FilterCriteria, MapLayer, MapView};
use crash_map_spatial::BoundaryCatalog;
use serde::Serialize;

use crate::PipelineError;
use crate::config::{PipelineConfig, ViewConfig};
use crate::progress::ProgressCallback;
use crate::sources;

/// Everything loaded once per session: joined incidents plus the reference
/// layers. Read-only after construction.
#[derive(Debug, Clone)]
pub struct BaseDataset {
    /// Incidents inside the target region whose report id is a member.
    pub incidents: Vec<IncidentRecord>,
    /// Every loaded boundary, by kind.
    pub catalog: BoundaryCatalog,
    /// Every loaded camera.
    pub cameras: Vec<CameraPoint>,
    /// Report ids from the participant table.
    pub membership: MembershipSet,
    /// Bookkeeping from the join.
    pub join_stats: JoinStats,
    /// Whether incidents carry their own non-motorist flag column.
    pub nonmotorist_from_column: bool,
    /// Initial map position.
    pub view: ViewConfig,
}

/// Output of one render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRender {
    /// Heatmap first, then visible overlays in fixed order.
    pub layers: Vec<MapLayer>,
    /// Initial map position and tiles.
    pub view: MapView,
    /// Number of incidents in the heatmap.
    pub incident_count: usize,
    /// Set when the criteria were invalid and filtering was skipped.
    #[serde(skip)]
    pub validation: Option<ValidationError>,
    /// User-facing text of `validation`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_message: Option<String>,
}

impl BaseDataset {
    /// Reads every source named by `config`, then normalizes and joins.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::SourceUnavailable`] if any source file
    /// can't be read or parsed.
    pub fn load(
        config: &PipelineConfig,
        progress: &dyn ProgressCallback,
    ) -> Result<Self, PipelineError> {
        let total = 3 + config.boundaries.len() + config.cameras.len();
        progress.set_total(total as u64);

        progress.set_message("Reading incidents".to_string());
        let rows = sources::load_incident_rows(&config.incidents.path, &config.incidents.fields)?;
        progress.inc(1);

        progress.set_message("Reading participants".to_string());
        let membership =
            sources::load_membership(&config.participants.path, &config.participants.report_id)?;
        progress.inc(1);

        let mut boundaries = Vec::new();
        for source in &config.boundaries {
            progress.set_message(format!("Reading {} boundaries", source.kind));
            let features = sources::load_features(&source.path)?;
            boundaries.extend(crash_map_normalize::normalize_boundaries(
                source.kind,
                &features,
                &source.name_field,
            ));
            progress.inc(1);
        }

        let mut cameras = Vec::new();
        for source in &config.cameras {
            progress.set_message(format!("Reading {} cameras", source.category));
            let features = sources::load_features(&source.path)?;
            cameras.extend(crash_map_normalize::normalize_cameras(
                source.category,
                &features,
            ));
            progress.inc(1);
        }

        progress.set_message("Joining".to_string());
        let dataset = Self::from_parts(config, &rows, membership, boundaries, cameras);
        progress.inc(1);
        progress.finish(format!("Loaded {} incidents", dataset.incidents.len()));

        Ok(dataset)
    }

    /// Normalizes and joins already-read sources.
    #[must_use]
    pub fn from_parts(
        config: &PipelineConfig,
        rows: &[RawIncidentRow],
        membership: MembershipSet,
        boundaries: Vec<BoundaryPolygon>,
        cameras: Vec<CameraPoint>,
    ) -> Self {
        let incidents = crash_map_normalize::normalize_incidents(rows);
        let catalog = BoundaryCatalog::load(boundaries);
        let target = JoinTarget {
            kind: config.target_kind,
            region: config.target_region.clone(),
        };
        let outcome = crash_map_join::join(incidents, &catalog, &target, &membership);

        let nonmotorist_from_column = config.incidents.fields.nonmotorist.is_some();
        let mut incidents = outcome.incidents;
        if !nonmotorist_from_column {
            for incident in &mut incidents {
                incident.involves_nonmotorist = membership.contains(&incident.report_id);
            }
        }

        Self {
            incidents,
            catalog,
            cameras,
            membership,
            join_stats: outcome.stats,
            nonmotorist_from_column,
            view: config.view,
        }
    }

    /// Where the filter reads the non-motorist flag from.
    #[must_use]
    pub const fn nonmotorist_source(&self) -> NonmotoristSource<'_> {
        if self.nonmotorist_from_column {
            NonmotoristSource::Column
        } else {
            NonmotoristSource::Membership(&self.membership)
        }
    }

    /// Criteria spanning the earliest to latest crash date, with every
    /// other setting at its default. `None` when there are no incidents.
    #[must_use]
    pub fn default_criteria(&self) -> Option<FilterCriteria> {
        FilterCriteria::defaults_for(self.incidents.iter().map(IncidentRecord::crash_date))
    }

    /// Filters and composes the layers for one set of criteria.
    ///
    /// The map is centered on the whole joined set, so the view stays put
    /// while filters change.
    #[must_use]
    pub fn render(&self, criteria: &FilterCriteria) -> MapRender {
        let source = self.nonmotorist_source();
        let outcome = crash_map_filter::filter(&self.incidents, criteria, &source);
        let layers =
            crash_map_layers::compose(&outcome.incidents, &self.catalog, &self.cameras, criteria);
        let view = crash_map_layers::map_view(
            &self.incidents,
            self.view.center,
            self.view.zoom,
            criteria.base_map,
        );

        MapRender {
            layers,
            view,
            incident_count: outcome.incidents.len(),
            validation: outcome.validation,
            validation_message: outcome.validation.map(|e| e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::progress::NullProgress;
    use chrono::NaiveDate;
    use crash_map_boundary_models::BoundaryKind;
    use crash_map_layer_models::{DateRange, HeatPoint, LayerId, LayerPayload};
    use geo::{LineString, MultiPolygon, Polygon};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn square(name: &str, min: (f64, f64), max: (f64, f64)) -> BoundaryPolygon {
        BoundaryPolygon {
            name: name.to_string(),
            kind: BoundaryKind::County,
            geometry: MultiPolygon(vec![Polygon::new(
                LineString::from(vec![
                    (min.0, min.1),
                    (max.0, min.1),
                    (max.0, max.1),
                    (min.0, max.1),
                    (min.0, min.1),
                ]),
                vec![],
            )]),
        }
    }

    fn row(id: &str, ts: &str, lon: &str, lat: &str) -> RawIncidentRow {
        RawIncidentRow {
            report_id: Some(id.to_string()),
            longitude: Some(lon.to_string()),
            latitude: Some(lat.to_string()),
            crash_timestamp: Some(ts.to_string()),
            nonmotorist: None,
        }
    }

    fn two_incident_dataset() -> BaseDataset {
        BaseDataset::from_parts(
            &PipelineConfig::baltimore(),
            &[
                row("1", "2020-05-01 00:00:00", "-76.6", "39.3"),
                row("2", "2021-01-01 00:00:00", "-76.5", "39.2"),
            ],
            MembershipSet::from_ids(["1"]),
            vec![square("Baltimore City", (-76.8, 39.1), (-76.4, 39.4))],
            vec![],
        )
    }

    #[test]
    fn two_incident_scenario_yields_one_heat_point() {
        let dataset = two_incident_dataset();
        assert_eq!(dataset.join_stats.not_member, 1);

        let criteria = FilterCriteria {
            nonmotorist_only: true,
            ..FilterCriteria::new(DateRange::new(date(2020, 1, 1), date(2020, 12, 31)))
        };
        let render = dataset.render(&criteria);

        assert_eq!(render.incident_count, 1);
        assert_eq!(render.layers.len(), 1);
        let LayerPayload::HeatmapPoints { points, .. } = &render.layers[0].payload else {
            panic!("expected heatmap payload");
        };
        assert_eq!(
            points,
            &vec![HeatPoint {
                lat: 39.3,
                lon: -76.6,
                weight: 1.0
            }]
        );
        assert!(render.validation_message.is_none());
    }

    #[test]
    fn view_center_ignores_filters() {
        let dataset = BaseDataset::from_parts(
            &PipelineConfig::baltimore(),
            &[
                row("1", "2020-05-01 00:00:00", "-76.6", "39.3"),
                row("2", "2021-01-01 00:00:00", "-76.5", "39.2"),
            ],
            MembershipSet::from_ids(["1", "2"]),
            vec![square("Baltimore City", (-76.8, 39.1), (-76.4, 39.4))],
            vec![],
        );

        let all = dataset.render(&FilterCriteria::new(DateRange::new(
            date(2020, 1, 1),
            date(2021, 12, 31),
        )));
        let narrowed = dataset.render(&FilterCriteria::new(DateRange::new(
            date(2020, 1, 1),
            date(2020, 12, 31),
        )));

        assert_eq!(all.incident_count, 2);
        assert_eq!(narrowed.incident_count, 1);
        assert_eq!(all.view.center, narrowed.view.center);
        assert!((all.view.center[0] - 39.25).abs() < 1e-9);
        assert!((all.view.center[1] - -76.55).abs() < 1e-9);
    }

    #[test]
    fn membership_flag_matches_membership_source() {
        let tmp = std::env::temp_dir().join("crash_map_dataset_membership_flag");
        let config = fixtures::write_sources(&tmp);
        let dataset = BaseDataset::load(&config, &NullProgress).unwrap();
        assert!(!dataset.nonmotorist_from_column);
        assert!(dataset.incidents.iter().all(|i| i.involves_nonmotorist));

        let criteria = FilterCriteria {
            nonmotorist_only: true,
            ..dataset.default_criteria().unwrap()
        };
        let by_column =
            crash_map_filter::filter(&dataset.incidents, &criteria, &NonmotoristSource::Column);
        let by_membership = crash_map_filter::filter(
            &dataset.incidents,
            &criteria,
            &NonmotoristSource::Membership(&dataset.membership),
        );
        assert_eq!(by_column.incidents.len(), 2);
        assert_eq!(by_column.incidents, by_membership.incidents);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn membership_source_used_without_flag_column() {
        let dataset = two_incident_dataset();
        assert!(matches!(
            dataset.nonmotorist_source(),
            NonmotoristSource::Membership(_)
        ));
    }

    #[test]
    fn default_criteria_span_joined_incidents() {
        let dataset = two_incident_dataset();
        let criteria = dataset.default_criteria().unwrap();
        assert_eq!(criteria.date_range, DateRange::new(date(2020, 5, 1), date(2020, 5, 1)));
        assert!(!criteria.nonmotorist_only);
        assert!(criteria.visible_layers.is_empty());
    }

    #[test]
    fn inverted_range_renders_everything_with_message() {
        let dataset = two_incident_dataset();
        let render = dataset.render(&FilterCriteria::new(DateRange::new(
            date(2021, 1, 1),
            date(2020, 1, 1),
        )));
        assert_eq!(render.incident_count, dataset.incidents.len());
        assert_eq!(
            render.validation_message.as_deref(),
            Some("End date must fall after start date.")
        );
    }

    #[test]
    fn empty_dataset_has_no_default_criteria() {
        let dataset = BaseDataset::from_parts(
            &PipelineConfig::baltimore(),
            &[],
            MembershipSet::default(),
            vec![],
            vec![],
        );
        assert!(dataset.default_criteria().is_none());
        let render = dataset.render(&FilterCriteria::new(DateRange::new(
            date(2020, 1, 1),
            date(2020, 12, 31),
        )));
        assert_eq!(render.view.center, [39.2904, -76.6122]);
    }

    #[test]
    fn loads_sources_from_disk() {
        let tmp = std::env::temp_dir().join("crash_map_dataset_load");
        let config = fixtures::write_sources(&tmp);

        let dataset = BaseDataset::load(&config, &NullProgress).unwrap();

        let ids: Vec<&str> = dataset
            .incidents
            .iter()
            .map(|i| i.report_id.as_str())
            .collect();
        assert_eq!(ids, vec!["ADJ1", "ADJ2"]);
        assert!(
            dataset
                .incidents
                .iter()
                .all(|i| i.region.as_deref() == Some("Baltimore City"))
        );
        assert_eq!(dataset.join_stats.input, 4);
        assert_eq!(dataset.join_stats.other_region, 1);
        assert_eq!(dataset.join_stats.not_member, 1);
        assert_eq!(dataset.catalog.len(BoundaryKind::County), 2);
        assert_eq!(dataset.catalog.len(BoundaryKind::District), 1);
        assert_eq!(dataset.cameras.len(), 2);

        let criteria = dataset
            .default_criteria()
            .unwrap()
            .with_layer(LayerId::CouncilDistricts)
            .with_layer(LayerId::RedLightCameras);
        let render = dataset.render(&criteria);
        assert_eq!(render.incident_count, 2);
        assert_eq!(render.layers.len(), 3);

        let json = serde_json::to_value(&render).unwrap();
        assert_eq!(json["incidentCount"], 2);
        assert!(json.get("validationMessage").is_none());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[test]
    fn missing_source_fails_load() {
        let tmp = std::env::temp_dir().join("crash_map_dataset_missing");
        let config = fixtures::write_sources(&tmp);
        std::fs::remove_file(&config.boundaries[0].path).unwrap();

        let err = BaseDataset::load(&config, &NullProgress).unwrap_err();
        assert!(matches!(err, PipelineError::SourceUnavailable { .. }));

        let _ = std::fs::remove_dir_all(&tmp);
    }
}
