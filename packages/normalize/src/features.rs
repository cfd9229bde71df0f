//! Normalizes `GeoJSON` features into camera points and boundary polygons.
//!
//! Camera and boundary datasets come from open data portals as `GeoJSON`
//! feature collections. Features with null, empty, or wrongly-typed
//! geometries are common and are skipped.

use crash_map_boundary_models::{BoundaryKind, BoundaryPolygon};
use crash_map_incident_models::{CameraCategory, CameraPoint};
use geo::{MultiPolygon, Point};

use crate::GeometryError;
use crate::parsing::point_from_lon_lat;

/// Normalizes camera features of one category into points.
///
/// Point geometries, and `MultiPoint` geometries with exactly one member,
/// are kept. Everything else is dropped.
#[must_use]
pub fn normalize_cameras(
    category: CameraCategory,
    features: &[geojson::Feature],
) -> Vec<CameraPoint> {
    let cameras: Vec<CameraPoint> = features
        .iter()
        .filter_map(|feature| match camera_point(feature) {
            Ok(geometry) => Some(CameraPoint { category, geometry }),
            Err(e) => {
                log::debug!("Dropping {category} camera: {e}");
                None
            }
        })
        .collect();

    log::info!(
        "Normalized {} of {} {category} camera features",
        cameras.len(),
        features.len()
    );

    cameras
}

fn camera_point(feature: &geojson::Feature) -> Result<Point<f64>, GeometryError> {
    let geometry = feature.geometry.as_ref().ok_or(GeometryError::NoGeometry)?;
    match &geometry.value {
        geojson::Value::Point(position) => point_from_position(position),
        geojson::Value::MultiPoint(positions) if positions.len() == 1 => {
            point_from_position(&positions[0])
        }
        other => Err(GeometryError::Unsupported(type_name(other).to_string())),
    }
}

fn point_from_position(position: &[f64]) -> Result<Point<f64>, GeometryError> {
    match position {
        [lon, lat, ..] => point_from_lon_lat(*lon, *lat),
        _ => Err(GeometryError::Unsupported("short position".to_string())),
    }
}

/// Normalizes boundary features of one kind into named polygons.
///
/// The boundary name is read from the `name_field` property; numeric
/// values (e.g. district numbers) are accepted. Features with a blank name
/// or a non-polygonal geometry are skipped with a warning.
#[must_use]
pub fn normalize_boundaries(
    kind: BoundaryKind,
    features: &[geojson::Feature],
    name_field: &str,
) -> Vec<BoundaryPolygon> {
    features
        .iter()
        .enumerate()
        .filter_map(|(i, feature)| {
            let Some(name) = feature_name(feature, name_field) else {
                log::warn!("Skipping {kind} feature {i}: no '{name_field}' property");
                return None;
            };
            match boundary_geometry(feature) {
                Ok(geometry) => Some(BoundaryPolygon {
                    name,
                    kind,
                    geometry,
                }),
                Err(e) => {
                    log::warn!("Skipping {kind} boundary {name}: {e}");
                    None
                }
            }
        })
        .collect()
}

fn feature_name(feature: &geojson::Feature, name_field: &str) -> Option<String> {
    let name = match feature.property(name_field)? {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!name.is_empty()).then_some(name)
}

/// Converts a polygonal feature geometry into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn boundary_geometry(feature: &geojson::Feature) -> Result<MultiPolygon<f64>, GeometryError> {
    let geometry = feature.geometry.clone().ok_or(GeometryError::NoGeometry)?;
    let geometry_type = type_name(&geometry.value);
    let geo_geom: geo::Geometry<f64> = geometry
        .try_into()
        .map_err(|_| GeometryError::Unsupported(geometry_type.to_string()))?;
    let multi_polygon = match geo_geom {
        geo::Geometry::MultiPolygon(mp) => mp,
        geo::Geometry::Polygon(p) => MultiPolygon(vec![p]),
        _ => return Err(GeometryError::Unsupported(geometry_type.to_string())),
    };
    if multi_polygon.0.is_empty() {
        return Err(GeometryError::NoGeometry);
    }
    Ok(multi_polygon)
}

const fn type_name(value: &geojson::Value) -> &'static str {
    match value {
        geojson::Value::Point(_) => "Point",
        geojson::Value::MultiPoint(_) => "MultiPoint",
        geojson::Value::LineString(_) => "LineString",
        geojson::Value::MultiLineString(_) => "MultiLineString",
        geojson::Value::Polygon(_) => "Polygon",
        geojson::Value::MultiPolygon(_) => "MultiPolygon",
        geojson::Value::GeometryCollection(_) => "GeometryCollection",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(json: &str) -> Vec<geojson::Feature> {
        serde_json::from_str::<geojson::FeatureCollection>(json)
            .unwrap()
            .features
    }

    #[test]
    fn keeps_point_cameras_and_drops_null_geometry() {
        let features = features(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [-76.61, 39.29]}},
                    {"type": "Feature", "properties": {}, "geometry": null},
                    {"type": "Feature", "properties": {}, "geometry": {"type": "MultiPoint", "coordinates": [[-76.62, 39.30]]}},
                    {"type": "Feature", "properties": {}, "geometry": {"type": "MultiPoint", "coordinates": [[-76.62, 39.30], [-76.63, 39.31]]}},
                    {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [-76.61, 95.0]}}
                ]
            }"#,
        );
        let cameras = normalize_cameras(CameraCategory::Speed, &features);
        assert_eq!(cameras.len(), 2);
        assert!(cameras.iter().all(|c| c.category == CameraCategory::Speed));
        assert!((cameras[1].geometry.x() - -76.62).abs() < f64::EPSILON);
    }

    #[test]
    fn boundaries_accept_polygon_and_multipolygon() {
        let features = features(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {"type": "Feature", "properties": {"county": "Baltimore City"},
                     "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}},
                    {"type": "Feature", "properties": {"county": "Howard"},
                     "geometry": {"type": "MultiPolygon", "coordinates": [[[[2,2],[3,2],[3,3],[2,2]]], [[[5,5],[6,5],[6,6],[5,5]]]]}}
                ]
            }"#,
        );
        let boundaries = normalize_boundaries(BoundaryKind::County, &features, "county");
        assert_eq!(boundaries.len(), 2);
        assert_eq!(boundaries[0].name, "Baltimore City");
        assert_eq!(boundaries[0].geometry.0.len(), 1);
        assert_eq!(boundaries[1].geometry.0.len(), 2);
        assert!(boundaries.iter().all(|b| b.kind == BoundaryKind::County));
    }

    #[test]
    fn boundaries_skip_unnamed_and_non_polygonal() {
        let features = features(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {"type": "Feature", "properties": {"area_name": 12},
                     "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}},
                    {"type": "Feature", "properties": {"area_name": " "},
                     "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}},
                    {"type": "Feature", "properties": {"area_name": "Line"},
                     "geometry": {"type": "LineString", "coordinates": [[0,0],[1,1]]}},
                    {"type": "Feature", "properties": {"area_name": "Empty"}, "geometry": null}
                ]
            }"#,
        );
        let boundaries = normalize_boundaries(BoundaryKind::District, &features, "area_name");
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].name, "12");
    }
}
