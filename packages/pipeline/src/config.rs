//! TOML pipeline configuration.
//!
//! A [`PipelineConfig`] names every input dataset of a session (incident
//! table, participant table, boundary and camera feature collections), the
//! column names to read, and the region incidents are scoped to. A
//! Baltimore configuration is embedded at compile time.

use std::path::{Path, PathBuf};

use crash_map_boundary_models::BoundaryKind;
use crash_map_incident_models::CameraCategory;
use serde::{Deserialize, Serialize};

use crate::PipelineError;

/// Embedded configuration for Baltimore City.
const BALTIMORE_TOML: &str = include_str!("../config/baltimore.toml");

/// Full description of one session's input datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Unique configuration identifier (e.g. `"baltimore_nonmotorist"`).
    pub id: String,
    /// Human-readable title.
    pub name: String,
    /// Boundary name incidents must fall inside (e.g. `"Baltimore City"`).
    pub target_region: String,
    /// Boundary kind `target_region` belongs to.
    #[serde(default = "default_target_kind")]
    pub target_kind: BoundaryKind,
    /// Crash report table.
    pub incidents: IncidentSourceConfig,
    /// Participant table supplying the membership set.
    pub participants: ParticipantSourceConfig,
    /// Boundary feature collections, in load order.
    #[serde(default)]
    pub boundaries: Vec<BoundarySourceConfig>,
    /// Camera feature collections.
    #[serde(default)]
    pub cameras: Vec<CameraSourceConfig>,
    /// Initial map position.
    #[serde(default)]
    pub view: ViewConfig,
}

const fn default_target_kind() -> BoundaryKind {
    BoundaryKind::County
}

/// Location and column mapping of the crash report CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentSourceConfig {
    /// Path to the CSV file.
    pub path: PathBuf,
    /// Column names.
    #[serde(default)]
    pub fields: IncidentFieldMapping,
}

/// Column names of the crash report CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentFieldMapping {
    /// Report identifier column.
    pub report_id: String,
    /// Longitude column.
    pub longitude: String,
    /// Latitude column.
    pub latitude: String,
    /// Crash date/time column.
    pub crash_timestamp: String,
    /// Optional precomputed non-motorist flag column. When absent, the flag
    /// is resolved through the participant membership set.
    #[serde(default)]
    pub nonmotorist: Option<String>,
}

impl Default for IncidentFieldMapping {
    fn default() -> Self {
        Self {
            report_id: default_report_id_column(),
            longitude: "Longitude".to_string(),
            latitude: "Latitude".to_string(),
            crash_timestamp: "Crashdate".to_string(),
            nonmotorist: None,
        }
    }
}

fn default_report_id_column() -> String {
    "ReportNumber".to_string()
}

/// Location of the participant CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantSourceConfig {
    /// Path to the CSV file.
    pub path: PathBuf,
    /// Report identifier column.
    #[serde(default = "default_report_id_column")]
    pub report_id: String,
}

/// One boundary `GeoJSON` feature collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundarySourceConfig {
    /// Administrative level of every feature in the file.
    pub kind: BoundaryKind,
    /// Path to the `GeoJSON` file.
    pub path: PathBuf,
    /// Feature property holding the boundary name.
    pub name_field: String,
}

/// One camera `GeoJSON` feature collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraSourceConfig {
    /// Camera type of every feature in the file.
    pub category: CameraCategory,
    /// Path to the `GeoJSON` file.
    pub path: PathBuf,
}

/// Initial map position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// `[lat, lon]` used when there are no incidents to center on.
    pub center: [f64; 2],
    /// Initial zoom level.
    pub zoom: u8,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            center: [39.2904, -76.6122],
            zoom: crash_map_layers::DEFAULT_ZOOM,
        }
    }
}

impl PipelineConfig {
    /// Returns the embedded Baltimore City configuration. Paths are
    /// relative to the working directory.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML fails to parse. Since it is a
    /// compile-time constant, a parse failure indicates a development error
    /// and is caught by the tests.
    #[must_use]
    pub fn baltimore() -> Self {
        toml::de::from_str(BALTIMORE_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded baltimore config: {e}"))
    }

    /// Parses a configuration from TOML text. Paths are left as written.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the TOML is invalid.
    pub fn from_toml_str(s: &str) -> Result<Self, PipelineError> {
        Ok(toml::de::from_str(s)?)
    }

    /// Reads a configuration file. Relative paths inside it are resolved
    /// against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] if the file can't be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        let text = std::fs::read_to_string(path).map_err(|e| PipelineError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Rewrites every relative dataset path to be relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.incidents.path);
        resolve(&mut self.participants.path);
        for boundary in &mut self.boundaries {
            resolve(&mut boundary.path);
        }
        for camera in &mut self.cameras {
            resolve(&mut camera.path);
        }
    }

    /// Every dataset path, in load order.
    #[must_use]
    pub fn source_paths(&self) -> Vec<&Path> {
        let mut paths = vec![
            self.incidents.path.as_path(),
            self.participants.path.as_path(),
        ];
        paths.extend(self.boundaries.iter().map(|b| b.path.as_path()));
        paths.extend(self.cameras.iter().map(|c| c.path.as_path()));
        paths
    }
}
