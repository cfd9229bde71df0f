//! On-disk source datasets shared by the load and cache tests.

use std::path::Path;

use crate::config::PipelineConfig;

const CONFIG: &str = r#"
id = "fixture"
name = "Fixture"
target_region = "Baltimore City"

[incidents]
path = "reports.csv"

[participants]
path = "people.csv"

[[boundaries]]
kind = "county"
path = "counties.geojson"
name_field = "county"

[[boundaries]]
kind = "district"
path = "districts.geojson"
name_field = "area_name"

[[cameras]]
category = "red_light"
path = "red_light.geojson"

[[cameras]]
category = "speed"
path = "speed.geojson"
"#;

const REPORTS: &str = "ReportNumber,Crashdate,Longitude,Latitude\n\
    ADJ1,2020-05-01 00:00:00,-76.6,39.3\n\
    ADJ2,2021-01-01 00:00:00,-76.5,39.2\n\
    ADJ3,2020-06-01 00:00:00,-76.9,39.5\n\
    ADJ4,2020-07-01,-76.55,39.25\n\
    ADJ5,2020-08-01,bad,39.3\n";

const PEOPLE: &str = "ReportNumber,PersonType\nADJ1,Pedestrian\nADJ1,Pedestrian\nADJ2,Bicyclist\nADJ3,Pedestrian\n";

const COUNTIES: &str = r#"{"type":"FeatureCollection","features":[
    {"type":"Feature","properties":{"county":"Baltimore City"},"geometry":{"type":"Polygon","coordinates":[[[-76.7,39.1],[-76.4,39.1],[-76.4,39.4],[-76.7,39.4],[-76.7,39.1]]]}},
    {"type":"Feature","properties":{"county":"Baltimore County"},"geometry":{"type":"Polygon","coordinates":[[[-77.0,39.4],[-76.7,39.4],[-76.7,39.7],[-77.0,39.7],[-77.0,39.4]]]}}
]}"#;

const DISTRICTS: &str = r#"{"type":"FeatureCollection","features":[
    {"type":"Feature","properties":{"area_name":"District 1"},"geometry":{"type":"Polygon","coordinates":[[[-76.7,39.1],[-76.55,39.1],[-76.55,39.4],[-76.7,39.4],[-76.7,39.1]]]}}
]}"#;

const RED_LIGHT: &str = r#"{"type":"FeatureCollection","features":[
    {"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[-76.61,39.29]}},
    {"type":"Feature","properties":{},"geometry":null}
]}"#;

const SPEED: &str = r#"{"type":"FeatureCollection","features":[
    {"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[-76.62,39.30]}}
]}"#;

/// Writes a small Baltimore-like dataset into a fresh `dir` and returns
/// its configuration with paths resolved.
pub fn write_sources(dir: &Path) -> PipelineConfig {
    let _ = std::fs::remove_dir_all(dir);
    std::fs::create_dir_all(dir).unwrap();

    for (name, contents) in [
        ("pipeline.toml", CONFIG),
        ("reports.csv", REPORTS),
        ("people.csv", PEOPLE),
        ("counties.geojson", COUNTIES),
        ("districts.geojson", DISTRICTS),
        ("red_light.geojson", RED_LIGHT),
        ("speed.geojson", SPEED),
    ] {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    PipelineConfig::from_file(&dir.join("pipeline.toml")).unwrap()
}
