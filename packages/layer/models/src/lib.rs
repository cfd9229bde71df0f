#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter criteria, heatmap configuration, and map layer output types.
//!
//! [`FilterCriteria`] is the per-interaction input of the render step and
//! [`MapLayer`] / [`MapView`] are its output. These types are serialized to
//! JSON for the external renderer, so field names follow the same
//! `camelCase` convention as the rest of the API surface.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use crash_map_boundary_models::BoundaryKind;
use crash_map_incident_models::CameraCategory;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Identifier of one independently toggleable map layer.
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
pub enum LayerId {
    /// Crash density heatmap (always present)
    Heatmap,
    /// County outlines
    Counties,
    /// City council district outlines
    CouncilDistricts,
    /// Neighborhood outlines
    Neighborhoods,
    /// Red light camera markers
    RedLightCameras,
    /// Speed camera markers
    SpeedCameras,
}

impl LayerId {
    /// Returns the overlay layer that draws boundaries of `kind`.
    #[must_use]
    pub const fn for_boundary(kind: BoundaryKind) -> Self {
        match kind {
            BoundaryKind::County => Self::Counties,
            BoundaryKind::District => Self::CouncilDistricts,
            BoundaryKind::Neighborhood => Self::Neighborhoods,
        }
    }

    /// Returns the overlay layer that draws cameras of `category`.
    #[must_use]
    pub const fn for_camera(category: CameraCategory) -> Self {
        match category {
            CameraCategory::RedLight => Self::RedLightCameras,
            CameraCategory::Speed => Self::SpeedCameras,
        }
    }

    /// Human-readable layer name shown in the layer control.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Heatmap => "Crash Heatmap",
            Self::Counties => "Counties",
            Self::CouncilDistricts => "City Council Districts",
            Self::Neighborhoods => "Neighborhoods",
            Self::RedLightCameras => "Red Light Cameras",
            Self::SpeedCameras => "Speed Cameras",
        }
    }

    /// Returns every overlay layer (everything except the heatmap).
    #[must_use]
    pub const fn overlays() -> &'static [Self] {
        &[
            Self::Counties,
            Self::CouncilDistricts,
            Self::Neighborhoods,
            Self::RedLightCameras,
            Self::SpeedCameras,
        ]
    }
}

/// Background tile style for the rendered map.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BaseMap {
    /// Light, low-contrast basemap
    #[default]
    CartodbPositron,
    /// Dark basemap
    CartodbDarkMatter,
    /// Standard OpenStreetMap tiles
    OpenStreetMap,
}

impl BaseMap {
    /// Tile set name understood by the renderer.
    #[must_use]
    pub const fn tiles(self) -> &'static str {
        match self {
            Self::CartodbPositron => "CartoDB positron",
            Self::CartodbDarkMatter => "CartoDB dark_matter",
            Self::OpenStreetMap => "OpenStreetMap",
        }
    }
}

/// One stop of the heatmap color ramp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradientStop {
    /// Normalized density threshold in `0.0..=1.0`.
    pub threshold: f64,
    /// CSS color name applied from this threshold upward.
    pub color: String,
}

/// Error returned when a heatmap parameter is outside its allowed range.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum HeatmapConfigError {
    /// Radius must be within `1..=100` pixels.
    #[error("radius {0} out of range: expected 1-100 pixels")]
    Radius(u32),
    /// Blur must be within `1..=100` pixels.
    #[error("blur {0} out of range: expected 1-100 pixels")]
    Blur(u32),
    /// Minimum opacity must be within `0.0..=1.0`.
    #[error("min opacity {0} out of range: expected 0.0-1.0")]
    MinOpacity(f64),
}

/// Kernel density rendering parameters for the heatmap layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapConfig {
    /// Point radius in pixels.
    pub radius: u32,
    /// Blur amount in pixels.
    pub blur: u32,
    /// Opacity of the faintest rendered density.
    pub min_opacity: f64,
    /// Color ramp keyed by normalized density.
    pub gradient: Vec<GradientStop>,
}

impl HeatmapConfig {
    /// Allowed range for `radius` and `blur`.
    pub const PIXEL_RANGE: std::ops::RangeInclusive<u32> = 1..=100;

    /// Creates a config with the default gradient.
    ///
    /// # Errors
    ///
    /// Returns [`HeatmapConfigError`] if any parameter is out of range.
    pub fn new(radius: u32, blur: u32, min_opacity: f64) -> Result<Self, HeatmapConfigError> {
        if !Self::PIXEL_RANGE.contains(&radius) {
            return Err(HeatmapConfigError::Radius(radius));
        }
        if !Self::PIXEL_RANGE.contains(&blur) {
            return Err(HeatmapConfigError::Blur(blur));
        }
        if !(0.0..=1.0).contains(&min_opacity) {
            return Err(HeatmapConfigError::MinOpacity(min_opacity));
        }
        Ok(Self {
            radius,
            blur,
            min_opacity,
            gradient: default_gradient(),
        })
    }
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            radius: 8,
            blur: 6,
            min_opacity: 0.3,
            gradient: default_gradient(),
        }
    }
}

/// Blue → lime → yellow → red ramp at 0.2 / 0.4 / 0.6 / 1.0.
fn default_gradient() -> Vec<GradientStop> {
    [(0.2, "blue"), (0.4, "lime"), (0.6, "yellow"), (1.0, "red")]
        .into_iter()
        .map(|(threshold, color)| GradientStop {
            threshold,
            color: color.to_string(),
        })
        .collect()
}

/// Inclusive calendar date range.
///
/// Both ends cover whole days: a timestamp on `end` at 23:59:59 is inside
/// the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// First day included.
    pub start: NaiveDate,
    /// Last day included.
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range. Ordering is not checked here; see [`Self::is_ordered`].
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Smallest range covering every given date, or `None` if there are none.
    #[must_use]
    pub fn spanning(dates: impl IntoIterator<Item = NaiveDate>) -> Option<Self> {
        dates.into_iter().fold(None, |range, date| {
            Some(match range {
                None => Self::new(date, date),
                Some(Self { start, end }) => Self::new(start.min(date), end.max(date)),
            })
        })
    }

    /// Whether `start <= end`.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }

    /// Whether `date` falls within the range, both ends inclusive.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// User-adjustable settings for one render of the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    /// Crash dates to include.
    pub date_range: DateRange,
    /// Restrict to crashes involving a non-motorist.
    pub nonmotorist_only: bool,
    /// Overlay layers to emit. The heatmap is always emitted.
    pub visible_layers: BTreeSet<LayerId>,
    /// Heatmap rendering parameters.
    pub heatmap: HeatmapConfig,
    /// Background tiles.
    pub base_map: BaseMap,
}

impl FilterCriteria {
    /// Criteria covering `date_range` with every other setting at its default.
    #[must_use]
    pub fn new(date_range: DateRange) -> Self {
        Self {
            date_range,
            nonmotorist_only: false,
            visible_layers: BTreeSet::new(),
            heatmap: HeatmapConfig::default(),
            base_map: BaseMap::default(),
        }
    }

    /// Default criteria for a dataset: the date range spans its earliest to
    /// latest crash date. Returns `None` for an empty dataset.
    #[must_use]
    pub fn defaults_for(dates: impl IntoIterator<Item = NaiveDate>) -> Option<Self> {
        DateRange::spanning(dates).map(Self::new)
    }

    /// Returns a copy with `layer` toggled on.
    #[must_use]
    pub fn with_layer(mut self, layer: LayerId) -> Self {
        self.visible_layers.insert(layer);
        self
    }

    /// Whether `layer` is toggled on.
    #[must_use]
    pub fn is_visible(&self, layer: LayerId) -> bool {
        self.visible_layers.contains(&layer)
    }
}

/// A single weighted heatmap sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Relative weight of this sample.
    pub weight: f64,
}

/// Outline style for a boundary overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayStyle {
    /// Polygon fill color.
    pub fill_color: String,
    /// Outline color.
    pub color: String,
    /// Outline weight in pixels.
    pub weight: u32,
}

/// Icon style shared by every marker of an overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    /// Icon glyph name.
    pub icon: String,
    /// Icon background color.
    pub icon_color: String,
}

/// A single point marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Hover text.
    pub tooltip: String,
}

/// The kind of content a [`MapLayer`] carries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LayerKind {
    /// Weighted points for a density heatmap
    HeatmapPoints,
    /// Polygon outlines
    BoundaryOverlay,
    /// Point markers
    MarkerOverlay,
}

/// Content of a [`MapLayer`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerPayload {
    /// One weighted point per incident.
    HeatmapPoints {
        /// Samples in `(lat, lon)` order.
        points: Vec<HeatPoint>,
        /// Rendering parameters.
        config: HeatmapConfig,
    },
    /// Boundary polygons as a `GeoJSON` feature collection.
    BoundaryOverlay {
        /// One feature per boundary, with a `name` property.
        features: geojson::FeatureCollection,
        /// Outline style.
        style: OverlayStyle,
    },
    /// Point markers sharing one icon style.
    MarkerOverlay {
        /// One marker per point.
        markers: Vec<Marker>,
        /// Icon style.
        style: MarkerStyle,
    },
}

impl LayerPayload {
    /// Returns which kind of layer this payload belongs to.
    #[must_use]
    pub const fn kind(&self) -> LayerKind {
        match self {
            Self::HeatmapPoints { .. } => LayerKind::HeatmapPoints,
            Self::BoundaryOverlay { .. } => LayerKind::BoundaryOverlay,
            Self::MarkerOverlay { .. } => LayerKind::MarkerOverlay,
        }
    }
}

/// One named, independently toggleable component of the output map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapLayer {
    /// Stable layer identifier.
    pub identifier: LayerId,
    /// Display name.
    pub label: String,
    /// Layer content.
    pub payload: LayerPayload,
}

impl MapLayer {
    /// Returns the kind of this layer.
    #[must_use]
    pub const fn kind(&self) -> LayerKind {
        self.payload.kind()
    }
}

/// Initial camera position and tiles for the rendered map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    /// Map center as `[lat, lon]`.
    pub center: [f64; 2],
    /// Initial zoom level.
    pub zoom: u8,
    /// Background tiles.
    pub base_map: BaseMap,
}
