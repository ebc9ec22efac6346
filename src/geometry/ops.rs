//! Fallible wrappers around the polygon operations of the `geo` crate.
//!
//! Every operation returns `Result<_, GeometryError>` so the pipeline can skip
//! one bad feature and keep going.

use std::panic::{self, AssertUnwindSafe};

use geo::{BooleanOps, BoundingRect, Coord, MultiLineString, MultiPolygon, Polygon};

use super::BoundingBox;
use super::area::multi_polygon_area_m2;
use crate::error::GeometryError;

/// Relative slack allowed when checking that a difference did not grow its input
const AREA_GROWTH_TOLERANCE: f64 = 1e-6;

fn guarded<T>(op: &'static str, f: impl FnOnce() -> T) -> Result<T, GeometryError> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|_| GeometryError::OperationPanicked(op))
}

fn coords_finite<'a>(mut coords: impl Iterator<Item = &'a Coord<f64>>) -> bool {
    coords.all(|c| c.x.is_finite() && c.y.is_finite())
}

/// Reject polygons whose outer ring cannot bound an area or that hold NaN/inf
pub fn validate_polygon(polygon: &Polygon<f64>) -> Result<(), GeometryError> {
    let exterior = polygon.exterior();
    if exterior.0.len() < 4 {
        return Err(GeometryError::DegenerateRing(exterior.0.len()));
    }
    let all_rings = std::iter::once(exterior).chain(polygon.interiors());
    for ring in all_rings {
        if !coords_finite(ring.0.iter()) {
            return Err(GeometryError::NonFinite);
        }
    }
    Ok(())
}

fn validate_result(op: &'static str, result: &MultiPolygon<f64>) -> Result<(), GeometryError> {
    for polygon in &result.0 {
        let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors());
        for ring in rings {
            if !coords_finite(ring.0.iter()) {
                return Err(GeometryError::InvalidResult {
                    op,
                    reason: "non-finite coordinates".to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Truncate a polygon to the bbox.
///
/// Polygons already inside the box come back unchanged.
pub fn clip_polygon_to_bbox(
    polygon: &Polygon<f64>,
    bbox: &BoundingBox,
) -> Result<MultiPolygon<f64>, GeometryError> {
    validate_polygon(polygon)?;

    if let Some(rect) = polygon.bounding_rect() {
        if bbox.contains_rect(&rect) {
            return Ok(MultiPolygon::new(vec![polygon.clone()]));
        }
        if !bbox.intersects_rect(&rect) {
            return Ok(MultiPolygon::new(Vec::new()));
        }
    }

    let frame = bbox.to_polygon();
    let clipped = guarded("bbox clip", || polygon.intersection(&frame))?;
    validate_result("bbox clip", &clipped)?;
    Ok(clipped)
}

/// Subtract one water polygon from a land shape
pub fn difference(
    land: &MultiPolygon<f64>,
    water: &Polygon<f64>,
) -> Result<MultiPolygon<f64>, GeometryError> {
    validate_polygon(water)?;

    let water = MultiPolygon::new(vec![water.clone()]);
    let carved = guarded("difference", || land.difference(&water))?;
    validate_result("difference", &carved)?;

    let before = multi_polygon_area_m2(land);
    let after = multi_polygon_area_m2(&carved);
    if after > before * (1.0 + AREA_GROWTH_TOLERANCE) + AREA_GROWTH_TOLERANCE {
        return Err(GeometryError::InvalidResult {
            op: "difference",
            reason: format!("area grew from {before:.1} to {after:.1} m2"),
        });
    }

    Ok(carved)
}

/// Merge overlapping polygons into one multipolygon
pub fn union_all(polygons: &[Polygon<f64>]) -> Result<MultiPolygon<f64>, GeometryError> {
    let mut merged = MultiPolygon::new(Vec::new());
    for polygon in polygons {
        validate_polygon(polygon)?;
        let next = MultiPolygon::new(vec![polygon.clone()]);
        merged = guarded("union", || merged.union(&next))?;
    }
    validate_result("union", &merged)?;
    Ok(merged)
}

/// Keep only the parts of the lines inside the bbox
pub fn clip_lines_to_bbox(
    lines: &MultiLineString<f64>,
    bbox: &BoundingBox,
) -> Result<MultiLineString<f64>, GeometryError> {
    let frame = bbox.to_polygon();
    let clipped = guarded("line clip", || frame.clip(lines, false))?;
    if !coords_finite(clipped.0.iter().flat_map(|line| line.0.iter())) {
        return Err(GeometryError::InvalidResult {
            op: "line clip",
            reason: "non-finite coordinates".to_string(),
        });
    }
    Ok(clipped)
}
