use geo::{Coord, LineString, MultiLineString, Polygon};
use geojson::{FeatureCollection, GeoJson, Value};
use std::collections::HashMap;

use crate::domain::{LineFeature, LineGeometry};
use crate::error::InputFormatError;

/// Parse text as a GeoJSON FeatureCollection
pub fn parse_feature_collection(text: &str) -> Result<FeatureCollection, InputFormatError> {
    match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        GeoJson::Feature(_) => Err(InputFormatError::NotFeatureCollection("Feature")),
        GeoJson::Geometry(_) => Err(InputFormatError::NotFeatureCollection("Geometry")),
    }
}

fn to_coords(positions: &[Vec<f64>]) -> Vec<Coord<f64>> {
    positions
        .iter()
        .filter(|p| p.len() >= 2)
        .map(|p| Coord { x: p[0], y: p[1] })
        .collect()
}

fn to_ring(positions: &[Vec<f64>]) -> Option<LineString<f64>> {
    let coords = to_coords(positions);
    if coords.len() < 4 {
        return None;
    }
    let mut ring = LineString::new(coords);
    ring.close();
    Some(ring)
}

fn to_polygon(rings: &[Vec<Vec<f64>>]) -> Option<Polygon<f64>> {
    let (exterior, holes) = rings.split_first()?;
    let exterior = to_ring(exterior)?;
    let holes = holes.iter().filter_map(|h| to_ring(h)).collect();
    Some(Polygon::new(exterior, holes))
}

/// Flatten JSON properties to strings; nulls are dropped
fn flatten_properties(
    properties: Option<&serde_json::Map<String, serde_json::Value>>,
) -> HashMap<String, String> {
    let Some(properties) = properties else {
        return HashMap::new();
    };
    properties
        .iter()
        .filter_map(|(key, value)| {
            let text = match value {
                serde_json::Value::Null => return None,
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), text))
        })
        .collect()
}

/// Line geometry of one GeoJSON value.
///
/// Polygon boundaries (county or administrative outlines) become multi-part
/// lines made of their rings. Points and empty parts yield `None`.
fn line_geometry(value: &Value) -> Option<LineGeometry> {
    let parts: Vec<LineString<f64>> = match value {
        Value::LineString(positions) => {
            let coords = to_coords(positions);
            return (coords.len() >= 2).then(|| LineGeometry::Single(LineString::new(coords)));
        }
        Value::MultiLineString(lines) => lines
            .iter()
            .map(|l| LineString::new(to_coords(l)))
            .collect(),
        Value::Polygon(rings) => rings
            .iter()
            .map(|r| LineString::new(to_coords(r)))
            .collect(),
        Value::MultiPolygon(polygons) => polygons
            .iter()
            .flatten()
            .map(|r| LineString::new(to_coords(r)))
            .collect(),
        _ => return None,
    };

    let parts: Vec<LineString<f64>> = parts.into_iter().filter(|p| p.0.len() >= 2).collect();
    if parts.is_empty() {
        return None;
    }
    Some(LineGeometry::Multi(MultiLineString::new(parts)))
}

/// Extract every line-like feature from a collection
pub fn line_features(collection: &FeatureCollection) -> Vec<LineFeature> {
    let mut features = Vec::new();

    for feature in &collection.features {
        let Some(geometry) = &feature.geometry else {
            continue;
        };
        let Some(lines) = line_geometry(&geometry.value) else {
            continue;
        };
        features.push(LineFeature::new(
            lines,
            flatten_properties(feature.properties.as_ref()),
        ));
    }

    features
}

/// Extract polygons from Polygon and MultiPolygon features.
///
/// Rings with fewer than 4 positions are skipped.
pub fn water_polygons(collection: &FeatureCollection) -> Vec<Polygon<f64>> {
    let mut polygons = Vec::new();

    for feature in &collection.features {
        let Some(geometry) = &feature.geometry else {
            continue;
        };
        match &geometry.value {
            Value::Polygon(rings) => polygons.extend(to_polygon(rings)),
            Value::MultiPolygon(parts) => {
                polygons.extend(parts.iter().filter_map(|rings| to_polygon(rings)));
            }
            _ => {}
        }
    }

    polygons
}

/// Features merged from several inputs, plus the inputs that failed to parse
#[derive(Debug, Default)]
pub struct LoadedSources<T> {
    pub items: Vec<T>,
    pub invalid: Vec<(String, InputFormatError)>,
}

fn load_sources<T>(
    sources: &[(&str, &str)],
    extract: impl Fn(&FeatureCollection) -> Vec<T>,
) -> LoadedSources<T> {
    let mut loaded = LoadedSources {
        items: Vec::new(),
        invalid: Vec::new(),
    };

    for &(name, text) in sources {
        match parse_feature_collection(text) {
            Ok(collection) => loaded.items.extend(extract(&collection)),
            Err(e) => {
                log::warn!("Skipping input {name}: {e}");
                loaded.invalid.push((name.to_string(), e));
            }
        }
    }

    loaded
}

/// Parse several (name, text) inputs as line sources, continuing past invalid ones
pub fn load_line_sources(sources: &[(&str, &str)]) -> LoadedSources<LineFeature> {
    load_sources(sources, line_features)
}

/// Parse several (name, text) inputs as water masks, continuing past invalid ones
pub fn load_water_sources(sources: &[(&str, &str)]) -> LoadedSources<Polygon<f64>> {
    load_sources(sources, water_polygons)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COAST: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"tidal": "yes", "ftype": null, "length": 12.5},
             "geometry": {"type": "LineString", "coordinates": [[-74.0, 40.7], [-73.9, 40.8]]}},
            {"type": "Feature", "properties": {},
             "geometry": {"type": "MultiLineString", "coordinates": [
                [[-74.0, 40.6], [-73.95, 40.6]], [[-73.9, 40.6]]]}},
            {"type": "Feature", "properties": {"name": "Richmond"},
             "geometry": {"type": "Polygon", "coordinates": [
                [[-74.2, 40.5], [-74.1, 40.5], [-74.1, 40.6], [-74.2, 40.5]]]}},
            {"type": "Feature", "properties": {},
             "geometry": {"type": "Point", "coordinates": [-74.0, 40.7]}}
        ]
    }"#;

    #[test]
    fn test_parse_line_features() {
        let collection = parse_feature_collection(COAST).unwrap();
        let features = line_features(&collection);
        assert_eq!(features.len(), 3);

        assert!(matches!(features[0].geometry, LineGeometry::Single(_)));
        assert_eq!(features[0].property("tidal"), Some("yes"));
        assert_eq!(features[0].property("ftype"), None);
        assert_eq!(features[0].property("length"), Some("12.5"));

        // The one-point part is dropped
        assert_eq!(features[1].geometry.part_count(), 1);
        assert_eq!(features[2].property("name"), Some("Richmond"));
    }

    #[test]
    fn test_water_polygons() {
        let collection = parse_feature_collection(COAST).unwrap();
        let polygons = water_polygons(&collection);
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].exterior().0.len(), 4);
    }

    #[test]
    fn test_rejects_non_collections() {
        let geometry = r#"{"type": "Point", "coordinates": [0.0, 0.0]}"#;
        assert!(matches!(
            parse_feature_collection(geometry),
            Err(InputFormatError::NotFeatureCollection("Geometry"))
        ));
        assert!(matches!(
            parse_feature_collection("not json"),
            Err(InputFormatError::GeoJson(_))
        ));
    }

    #[test]
    fn test_multi_input_continues_past_invalid() {
        let loaded = load_line_sources(&[("coast", COAST), ("broken", "{]"), ("again", COAST)]);
        assert_eq!(loaded.items.len(), 6);
        assert_eq!(loaded.invalid.len(), 1);
        assert_eq!(loaded.invalid[0].0, "broken");
    }
}
