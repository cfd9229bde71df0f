//! Initial map position.

use crash_map_incident_models::IncidentRecord;
use crash_map_layer_models::{BaseMap, MapView};

/// Zoom level the map opens at.
pub const DEFAULT_ZOOM: u8 = 12;

/// Centers the map on the mean incident location, or on `fallback_center`
/// (`[lat, lon]`) when there are no incidents.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn map_view(
    incidents: &[IncidentRecord],
    fallback_center: [f64; 2],
    zoom: u8,
    base_map: BaseMap,
) -> MapView {
    let center = if incidents.is_empty() {
        fallback_center
    } else {
        let n = incidents.len() as f64;
        let (lat_sum, lon_sum) = incidents.iter().fold((0.0, 0.0), |(lat, lon), i| {
            (lat + i.latitude(), lon + i.longitude())
        });
        [lat_sum / n, lon_sum / n]
    };

    MapView {
        center,
        zoom,
        base_map,
    }
}
