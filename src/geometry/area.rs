//! Approximate areas in square meters for small geographic polygons.

use geo::{BoundingRect, LineString, MultiPolygon, Polygon};

use super::projection::Projector;

/// Shoelace area of a ring in square meters, projected around the ring's own
/// bounding-box mid-latitude. Degenerate rings (fewer than 3 distinct
/// vertices, or collinear) come out as 0.
pub fn ring_area_m2(ring: &LineString<f64>) -> f64 {
    let coords = &ring.0;
    if coords.len() < 3 {
        return 0.0;
    }
    let Some(rect) = ring.bounding_rect() else {
        return 0.0;
    };
    let mid_lat = (rect.min().y + rect.max().y) / 2.0;
    let projector = Projector::new((rect.min().x, rect.min().y), mid_lat);

    let projected: Vec<(f64, f64)> = coords.iter().map(|c| projector.project(c.x, c.y)).collect();
    shoelace(&projected).abs() / 2.0
}

/// Outer ring area minus hole areas, floored at zero
pub fn polygon_area_m2(polygon: &Polygon<f64>) -> f64 {
    let holes: f64 = polygon.interiors().iter().map(ring_area_m2).sum();
    (ring_area_m2(polygon.exterior()) - holes).max(0.0)
}

pub fn multi_polygon_area_m2(polygons: &MultiPolygon<f64>) -> f64 {
    polygons.0.iter().map(polygon_area_m2).sum()
}

/// Keep polygons whose area is at least `min_area_m2`; returns (kept, dropped count)
pub fn filter_by_area(polygons: Vec<Polygon<f64>>, min_area_m2: f64) -> (Vec<Polygon<f64>>, usize) {
    let before = polygons.len();
    let kept: Vec<Polygon<f64>> = polygons
        .into_iter()
        .filter(|p| passes_min_area(polygon_area_m2(p), min_area_m2))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// Zero-area shapes never pass, whatever the threshold
pub fn passes_min_area(area_m2: f64, min_area_m2: f64) -> bool {
    area_m2 > 0.0 && area_m2 >= min_area_m2
}

fn shoelace(points: &[(f64, f64)]) -> f64 {
    let n = points.len();
    let mut sum = 0.0;
    for i in 0..n {
        let (x1, y1) = points[i];
        let (x2, y2) = points[(i + 1) % n];
        sum += x1 * y2 - x2 * y1;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn test_ring_area_small_square() {
        // 0.01 x 0.01 degrees around 40.7N
        let square = polygon![
            (x: -74.0, y: 40.70),
            (x: -73.99, y: 40.70),
            (x: -73.99, y: 40.71),
            (x: -74.0, y: 40.71),
            (x: -74.0, y: 40.70),
        ];
        let area = polygon_area_m2(&square);
        let expected =
            (0.01 * 111_320.0 * 40.705f64.to_radians().cos()) * (0.01 * 110_540.0);
        assert!((area - expected).abs() < 1.0);
    }

    #[test]
    fn test_orientation_does_not_matter() {
        let ccw = LineString::from(vec![(0.0, 0.0), (0.01, 0.0), (0.01, 0.01), (0.0, 0.0)]);
        let cw = LineString::from(vec![(0.0, 0.0), (0.01, 0.01), (0.01, 0.0), (0.0, 0.0)]);
        assert!((ring_area_m2(&ccw) - ring_area_m2(&cw)).abs() < 1e-9);
        assert!(ring_area_m2(&ccw) > 0.0);
    }

    #[test]
    fn test_degenerate_rings_have_zero_area() {
        let collinear = LineString::from(vec![(0.0, 0.0), (0.5, 0.5), (1.0, 1.0), (0.0, 0.0)]);
        assert_eq!(ring_area_m2(&collinear), 0.0);

        let two_points = LineString::from(vec![(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        assert_eq!(ring_area_m2(&two_points), 0.0);

        let polygon = Polygon::new(collinear, vec![]);
        let (kept, dropped) = filter_by_area(vec![polygon], 1.0);
        assert!(kept.is_empty());
        assert_eq!(dropped, 1);
    }

    #[test]
    fn test_holes_subtract_and_floor() {
        let outer = LineString::from(vec![
            (0.0, 0.0),
            (0.02, 0.0),
            (0.02, 0.02),
            (0.0, 0.02),
            (0.0, 0.0),
        ]);
        let hole = LineString::from(vec![
            (0.005, 0.005),
            (0.015, 0.005),
            (0.015, 0.015),
            (0.005, 0.015),
            (0.005, 0.005),
        ]);
        let with_hole = Polygon::new(outer.clone(), vec![hole]);
        let plain = Polygon::new(outer.clone(), vec![]);
        assert!(polygon_area_m2(&with_hole) < polygon_area_m2(&plain));

        let oversized_hole = Polygon::new(outer.clone(), vec![outer.clone(), outer]);
        assert_eq!(polygon_area_m2(&oversized_hole), 0.0);
    }

    #[test]
    fn test_filter_threshold() {
        let small = polygon![
            (x: 0.0, y: 0.0),
            (x: 0.0001, y: 0.0),
            (x: 0.0001, y: 0.0001),
            (x: 0.0, y: 0.0),
        ];
        let (kept, _) = filter_by_area(vec![small.clone()], 8000.0);
        assert!(kept.is_empty());
        let (kept, _) = filter_by_area(vec![small], 0.0);
        assert_eq!(kept.len(), 1);
    }
}
