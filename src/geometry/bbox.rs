use geo::{Coord, Polygon, Rect, coord};

use crate::error::ConfigError;

/// Axis-aligned geographic bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// Create a bounding box, rejecting non-finite or inverted extents
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Result<Self, ConfigError> {
        if ![west, south, east, north].iter().all(|v| v.is_finite()) {
            return Err(ConfigError::BboxNotFinite);
        }
        if west >= east || south >= north {
            return Err(ConfigError::BboxOrdering {
                west,
                south,
                east,
                north,
            });
        }
        Ok(Self {
            west,
            south,
            east,
            north,
        })
    }

    /// Build from the `[west, south, east, north]` order used in config files
    pub fn from_array(values: [f64; 4]) -> Result<Self, ConfigError> {
        Self::new(values[0], values[1], values[2], values[3])
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Inclusive containment test
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.west && lon <= self.east && lat >= self.south && lat <= self.north
    }

    /// Inclusive containment test with the box grown by `margin` degrees on every side
    pub fn contains_with_margin(&self, lon: f64, lat: f64, margin: f64) -> bool {
        lon >= self.west - margin
            && lon <= self.east + margin
            && lat >= self.south - margin
            && lat <= self.north + margin
    }

    pub fn contains_rect(&self, rect: &Rect<f64>) -> bool {
        self.contains(rect.min().x, rect.min().y) && self.contains(rect.max().x, rect.max().y)
    }

    pub fn intersects_rect(&self, rect: &Rect<f64>) -> bool {
        rect.min().x <= self.east
            && rect.max().x >= self.west
            && rect.min().y <= self.north
            && rect.max().y >= self.south
    }

    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            coord! { x: self.west, y: self.south },
            coord! { x: self.east, y: self.north },
        )
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        self.to_rect().to_polygon()
    }

    /// Corners in counter-clockwise order starting at the south-west corner
    pub fn corners(&self) -> [Coord<f64>; 4] {
        [
            coord! { x: self.west, y: self.south },
            coord! { x: self.east, y: self.south },
            coord! { x: self.east, y: self.north },
            coord! { x: self.west, y: self.north },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_rejects_inverted() {
        assert!(matches!(
            BoundingBox::new(10.0, 0.0, 0.0, 10.0),
            Err(ConfigError::BboxOrdering { .. })
        ));
        assert!(BoundingBox::new(0.0, 10.0, 10.0, 10.0).is_err());
    }

    #[test]
    fn test_bbox_rejects_nan() {
        assert_eq!(
            BoundingBox::new(f64::NAN, 0.0, 1.0, 1.0),
            Err(ConfigError::BboxNotFinite)
        );
    }

    #[test]
    fn test_bbox_contains_edges() {
        let bbox = BoundingBox::new(-74.26, 40.48, -73.75, 40.92).unwrap();
        assert!(bbox.contains(-74.26, 40.48));
        assert!(bbox.contains(-73.75, 40.92));
        assert!(!bbox.contains(-73.70, 40.60));
        assert!(bbox.contains_with_margin(-73.70, 40.60, 0.1));
    }

    #[test]
    fn test_bbox_rect_relations() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0).unwrap();
        let inside = Rect::new(coord! { x: 1.0, y: 1.0 }, coord! { x: 2.0, y: 2.0 });
        let straddling = Rect::new(coord! { x: 9.0, y: 9.0 }, coord! { x: 12.0, y: 12.0 });
        let outside = Rect::new(coord! { x: 11.0, y: 11.0 }, coord! { x: 12.0, y: 12.0 });

        assert!(bbox.contains_rect(&inside));
        assert!(!bbox.contains_rect(&straddling));
        assert!(bbox.intersects_rect(&straddling));
        assert!(!bbox.intersects_rect(&outside));
    }
}
