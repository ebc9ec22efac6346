use geo::{LineString, MultiLineString};
use std::collections::HashMap;

/// Line geometry of one input feature, single- or multi-part
#[derive(Debug, Clone, PartialEq)]
pub enum LineGeometry {
    Single(LineString<f64>),
    Multi(MultiLineString<f64>),
}

impl LineGeometry {
    /// Iterate over every part, regardless of shape
    pub fn parts(&self) -> impl Iterator<Item = &LineString<f64>> {
        let parts: &[LineString<f64>] = match self {
            LineGeometry::Single(line) => std::slice::from_ref(line),
            LineGeometry::Multi(lines) => &lines.0,
        };
        parts.iter()
    }

    pub fn part_count(&self) -> usize {
        match self {
            LineGeometry::Single(_) => 1,
            LineGeometry::Multi(lines) => lines.0.len(),
        }
    }
}

/// An input line feature: geometry plus flat string attributes
#[derive(Debug, Clone, PartialEq)]
pub struct LineFeature {
    pub geometry: LineGeometry,
    pub properties: HashMap<String, String>,
}

impl LineFeature {
    pub fn new(geometry: LineGeometry, properties: HashMap<String, String>) -> Self {
        Self {
            geometry,
            properties,
        }
    }

    /// Convenience constructor for an untagged single line
    pub fn from_coords(coords: Vec<(f64, f64)>) -> Self {
        Self::new(LineGeometry::Single(coords.into()), HashMap::new())
    }

    pub fn with_property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedKind {
    Land,
    Water,
}

/// A known land or water location used to steer segmentation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeedPoint {
    pub lon: f64,
    pub lat: f64,
    pub kind: SeedKind,
}

impl SeedPoint {
    pub fn land(lon: f64, lat: f64) -> Self {
        Self {
            lon,
            lat,
            kind: SeedKind::Land,
        }
    }

    pub fn water(lon: f64, lat: f64) -> Self {
        Self {
            lon,
            lat,
            kind: SeedKind::Water,
        }
    }

    pub fn point(&self) -> geo::Point<f64> {
        geo::Point::new(self.lon, self.lat)
    }
}
