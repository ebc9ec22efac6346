use geo::{LineString, Polygon};
use geojson::{Feature, FeatureCollection, Geometry, Value};

use crate::domain::OutputFeature;

fn ring_positions(ring: &LineString<f64>) -> Vec<Vec<f64>> {
    ring.0.iter().map(|c| vec![c.x, c.y]).collect()
}

fn polygon_rings(polygon: &Polygon<f64>) -> Vec<Vec<Vec<f64>>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(ring_positions)
        .collect()
}

/// Polygon for single-part shapes, MultiPolygon otherwise
fn feature_geometry(feature: &OutputFeature) -> Geometry {
    let parts = &feature.geometry.0;
    let value = if parts.len() == 1 {
        Value::Polygon(polygon_rings(&parts[0]))
    } else {
        Value::MultiPolygon(parts.iter().map(polygon_rings).collect())
    };
    Geometry::new(value)
}

/// Build the output collection; every feature carries `source` and `area_m2`
pub fn to_feature_collection(features: &[OutputFeature]) -> FeatureCollection {
    let features: Vec<Feature> = features
        .iter()
        .enumerate()
        .map(|(i, feature)| {
            let mut properties = serde_json::Map::new();
            properties.insert(
                "source".to_string(),
                serde_json::Value::String(feature.source.as_str().to_string()),
            );
            properties.insert(
                "area_m2".to_string(),
                serde_json::Number::from_f64(feature.area_m2.round())
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null),
            );

            Feature {
                bbox: None,
                geometry: Some(feature_geometry(feature)),
                id: Some(geojson::feature::Id::Number(serde_json::Number::from(i))),
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    let mut foreign_members = serde_json::Map::new();
    foreign_members.insert(
        "feature_count".to_string(),
        serde_json::Value::Number(serde_json::Number::from(features.len())),
    );

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign_members),
    }
}

/// Serialize the output collection as pretty-printed JSON
pub fn to_geojson_string(features: &[OutputFeature]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&to_feature_collection(features))
}
