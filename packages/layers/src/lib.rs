#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Composes filtered incidents, boundaries, and cameras into map layers.
//!
//! The output is always led by the heatmap layer, followed by one overlay
//! per visible boundary kind and one per visible camera category. Layers
//! that are toggled off are left out entirely. Composition is a pure
//! function of its inputs.

pub mod style;
pub mod view;

pub use view::{DEFAULT_ZOOM, map_view};

use crash_map_boundary_models::{BoundaryKind, BoundaryPolygon};
use crash_map_incident_models::{CameraCategory, CameraPoint, IncidentRecord};
use crash_map_layer_models::{
    FilterCriteria, HeatPoint, HeatmapConfig, LayerId, LayerPayload, MapLayer, Marker,
};
use crash_map_spatial::BoundaryCatalog;

/// Builds the ordered layer list for one render.
#[must_use]
pub fn compose(
    filtered: &[IncidentRecord],
    catalog: &BoundaryCatalog,
    cameras: &[CameraPoint],
    criteria: &FilterCriteria,
) -> Vec<MapLayer> {
    let mut layers = vec![heatmap_layer(filtered, &criteria.heatmap)];

    for kind in BoundaryKind::all() {
        if criteria.is_visible(LayerId::for_boundary(*kind)) {
            layers.push(boundary_layer(*kind, catalog.polygons(*kind)));
        }
    }

    for category in CameraCategory::all() {
        if criteria.is_visible(LayerId::for_camera(*category)) {
            layers.push(camera_layer(*category, cameras));
        }
    }

    log::debug!(
        "Composed {} layers from {} incidents",
        layers.len(),
        filtered.len()
    );

    layers
}

/// One weight-1 heat point per incident, in `(lat, lon)` order.
#[must_use]
pub fn heat_points(incidents: &[IncidentRecord]) -> Vec<HeatPoint> {
    incidents
        .iter()
        .map(|incident| HeatPoint {
            lat: incident.latitude(),
            lon: incident.longitude(),
            weight: 1.0,
        })
        .collect()
}

fn heatmap_layer(incidents: &[IncidentRecord], config: &HeatmapConfig) -> MapLayer {
    MapLayer {
        identifier: LayerId::Heatmap,
        label: LayerId::Heatmap.label().to_string(),
        payload: LayerPayload::HeatmapPoints {
            points: heat_points(incidents),
            config: config.clone(),
        },
    }
}

fn boundary_layer(kind: BoundaryKind, boundaries: &[BoundaryPolygon]) -> MapLayer {
    let identifier = LayerId::for_boundary(kind);
    let features = boundaries.iter().map(boundary_feature).collect();

    MapLayer {
        identifier,
        label: identifier.label().to_string(),
        payload: LayerPayload::BoundaryOverlay {
            features: geojson::FeatureCollection {
                bbox: None,
                features,
                foreign_members: None,
            },
            style: style::overlay_style(kind),
        },
    }
}

fn boundary_feature(boundary: &BoundaryPolygon) -> geojson::Feature {
    let mut properties = geojson::JsonObject::new();
    properties.insert(
        "name".to_string(),
        serde_json::Value::String(boundary.name.clone()),
    );
    properties.insert(
        "kind".to_string(),
        serde_json::Value::String(boundary.kind.to_string()),
    );

    geojson::Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(
            &boundary.geometry,
        ))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn camera_layer(category: CameraCategory, cameras: &[CameraPoint]) -> MapLayer {
    let identifier = LayerId::for_camera(category);
    let tooltip = style::camera_tooltip(category);
    let markers = cameras
        .iter()
        .filter(|camera| camera.category == category)
        .map(|camera| Marker {
            lat: camera.geometry.y(),
            lon: camera.geometry.x(),
            tooltip: tooltip.to_string(),
        })
        .collect();

    MapLayer {
        identifier,
        label: identifier.label().to_string(),
        payload: LayerPayload::MarkerOverlay {
            markers,
            style: style::marker_style(category),
        },
    }
}
