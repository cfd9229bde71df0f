//! Fixed styles for boundary and camera overlays.

use crash_map_boundary_models::BoundaryKind;
use crash_map_incident_models::CameraCategory;
use crash_map_layer_models::{MarkerStyle, OverlayStyle};

/// Outline weight shared by every boundary overlay.
pub const OUTLINE_WEIGHT: u32 = 2;

/// Icon glyph shared by every camera overlay.
pub const CAMERA_ICON: &str = "camera";

/// Transparent-fill outline style for boundaries of `kind`.
#[must_use]
pub fn overlay_style(kind: BoundaryKind) -> OverlayStyle {
    let color = match kind {
        BoundaryKind::County => "gray",
        BoundaryKind::District => "black",
        BoundaryKind::Neighborhood => "red",
    };
    OverlayStyle {
        fill_color: "transparent".to_string(),
        color: color.to_string(),
        weight: OUTLINE_WEIGHT,
    }
}

/// Marker icon style for cameras of `category`.
#[must_use]
pub fn marker_style(category: CameraCategory) -> MarkerStyle {
    let icon_color = match category {
        CameraCategory::RedLight => "red",
        CameraCategory::Speed => "blue",
    };
    MarkerStyle {
        icon: CAMERA_ICON.to_string(),
        icon_color: icon_color.to_string(),
    }
}

/// Hover text for cameras of `category`.
#[must_use]
pub const fn camera_tooltip(category: CameraCategory) -> &'static str {
    match category {
        CameraCategory::RedLight => "Red Light Camera",
        CameraCategory::Speed => "Speed Camera",
    }
}
