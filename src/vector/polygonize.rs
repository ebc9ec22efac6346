//! Build land polygons directly from the coastline network.
//!
//! Parts are clipped to the bbox and chained. Chains that cross the viewport
//! are closed along the bbox frame, splitting the box into faces; closed
//! chains are islands or lakes. Every face and ring is then classified by
//! the seed points it contains.

use geo::{Contains, Coord, LineString, MultiLineString, Polygon};

use super::chain::{chain_parts, is_closed_chain};
use crate::domain::{SeedKind, SeedPoint};
use crate::error::GeometryError;
use crate::geometry::area::{filter_by_area, ring_area_m2};
use crate::geometry::{BoundingBox, ops};

/// Chain ends within this distance (degrees) of the bbox edge are snapped onto it
pub const FRAME_TOLERANCE: f64 = 1e-7;

/// Result of one polygonizer run
#[derive(Debug, Clone, Default)]
pub struct PolygonizeOutcome {
    pub polygons: Vec<Polygon<f64>>,
    /// Faces plus closed rings considered for classification
    pub rings_built: usize,
    /// Chains with at least one end neither closed nor on the frame
    pub unclosed_chains: usize,
    /// Rings rejected as degenerate
    pub degenerate_rings: usize,
    /// Land polygons under the minimum area
    pub dropped_small: usize,
}

/// Polygonize `parts` inside `bbox` and keep the rings that hold land.
///
/// A ring is land when it contains at least one land seed and no water
/// seed, with seeds inside its holes not counted. Zero input parts produce
/// zero polygons.
pub fn polygonize(
    parts: &[LineString<f64>],
    bbox: &BoundingBox,
    seeds: &[SeedPoint],
    min_area_m2: f64,
) -> Result<PolygonizeOutcome, GeometryError> {
    let mut outcome = PolygonizeOutcome::default();
    if parts.is_empty() {
        return Ok(outcome);
    }

    let clipped = ops::clip_lines_to_bbox(&MultiLineString::new(parts.to_vec()), bbox)?;
    let pieces: Vec<Vec<Coord<f64>>> = clipped
        .0
        .into_iter()
        .map(|line| line.0.into_iter().map(|c| snap_to_frame(c, bbox)).collect())
        .collect();

    let mut closed = Vec::new();
    let mut open = Vec::new();
    for chain in chain_parts(pieces) {
        if is_closed_chain(&chain) {
            closed.push(LineString::new(chain));
        } else if on_frame(&chain[0], bbox) && on_frame(&chain[chain.len() - 1], bbox) {
            open.push(chain);
        } else {
            outcome.unclosed_chains += 1;
        }
    }

    if closed.is_empty() && open.is_empty() {
        log::debug!(
            "Polygonizer: no usable chains ({} unclosed)",
            outcome.unclosed_chains
        );
        return Ok(outcome);
    }

    let mut rings = frame_faces(&open, bbox);
    rings.extend(closed);

    let rings: Vec<LineString<f64>> = rings
        .into_iter()
        .filter(|ring| {
            let valid = ring.0.len() >= 4 && ring_area_m2(ring) > 0.0;
            if !valid {
                outcome.degenerate_rings += 1;
            }
            valid
        })
        .collect();
    outcome.rings_built = rings.len();

    let land: Vec<Polygon<f64>> = nest_rings(&rings)
        .into_iter()
        .filter(|polygon| is_land(polygon, seeds))
        .collect();
    let (kept, dropped) = filter_by_area(land, min_area_m2);
    outcome.polygons = kept;
    outcome.dropped_small = dropped;

    log::debug!(
        "Polygonizer: {} rings, {} land polygons, {} unclosed chains, {} degenerate, {} too small",
        outcome.rings_built,
        outcome.polygons.len(),
        outcome.unclosed_chains,
        outcome.degenerate_rings,
        outcome.dropped_small
    );

    Ok(outcome)
}

fn is_land(polygon: &Polygon<f64>, seeds: &[SeedPoint]) -> bool {
    let mut has_land = false;
    for seed in seeds {
        if polygon.contains(&seed.point()) {
            match seed.kind {
                SeedKind::Water => return false,
                SeedKind::Land => has_land = true,
            }
        }
    }
    has_land
}

fn on_frame(c: &Coord<f64>, bbox: &BoundingBox) -> bool {
    (c.x - bbox.west).abs() <= FRAME_TOLERANCE
        || (c.x - bbox.east).abs() <= FRAME_TOLERANCE
        || (c.y - bbox.south).abs() <= FRAME_TOLERANCE
        || (c.y - bbox.north).abs() <= FRAME_TOLERANCE
}

fn snap_to_frame(mut c: Coord<f64>, bbox: &BoundingBox) -> Coord<f64> {
    for edge in [bbox.west, bbox.east] {
        if (c.x - edge).abs() <= FRAME_TOLERANCE {
            c.x = edge;
        }
    }
    for edge in [bbox.south, bbox.north] {
        if (c.y - edge).abs() <= FRAME_TOLERANCE {
            c.y = edge;
        }
    }
    c
}

/// Position along the frame perimeter in [0, 4), counter-clockwise from the
/// south-west corner. Each unit is one side.
fn frame_param(c: &Coord<f64>, bbox: &BoundingBox) -> f64 {
    if c.y == bbox.south {
        (c.x - bbox.west) / bbox.width()
    } else if c.x == bbox.east {
        1.0 + (c.y - bbox.south) / bbox.height()
    } else if c.y == bbox.north {
        2.0 + (bbox.east - c.x) / bbox.width()
    } else {
        3.0 + (bbox.north - c.y) / bbox.height()
    }
}

/// Frame corners strictly between two perimeter positions, walking
/// counter-clockwise
fn corners_between(from: f64, to: f64, bbox: &BoundingBox) -> Vec<Coord<f64>> {
    let span = (to - from).rem_euclid(4.0);
    let corners = bbox.corners();
    let mut passed: Vec<(f64, Coord<f64>)> = (0..4)
        .map(|k| ((k as f64 - from).rem_euclid(4.0), corners[k]))
        .filter(|&(d, _)| d > 0.0 && d < span)
        .collect();
    passed.sort_by(|a, b| a.0.total_cmp(&b.0));
    passed.into_iter().map(|(_, c)| c).collect()
}

/// Split the frame into faces along open chains that end on it.
///
/// Each chain is walked once in each direction; after arriving on the frame
/// the walk follows the frame counter-clockwise to the next chain end and
/// continues along that chain. Every directed walk belongs to exactly one
/// face, so with `n` non-crossing chains this yields `n + 1` faces. With no
/// open chains the frame itself is the only face.
fn frame_faces(open: &[Vec<Coord<f64>>], bbox: &BoundingBox) -> Vec<LineString<f64>> {
    if open.is_empty() {
        return vec![bbox.to_polygon().exterior().clone()];
    }

    // Chain ends sorted around the frame: (param, chain, is_start)
    let mut stops: Vec<(f64, usize, bool)> = Vec::with_capacity(open.len() * 2);
    for (i, chain) in open.iter().enumerate() {
        stops.push((frame_param(&chain[0], bbox), i, true));
        stops.push((frame_param(&chain[chain.len() - 1], bbox), i, false));
    }
    stops.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)).then(b.2.cmp(&a.2)));
    let position = |chain: usize, is_start: bool| {
        stops
            .iter()
            .position(|&(_, c, s)| c == chain && s == is_start)
            .unwrap_or(0)
    };

    // visited[chain][0] = walked forward, visited[chain][1] = walked backward
    let mut visited = vec![[false; 2]; open.len()];
    let mut faces = Vec::new();

    for first in 0..open.len() {
        for first_forward in [true, false] {
            let dir = usize::from(!first_forward);
            if visited[first][dir] {
                continue;
            }

            let mut ring: Vec<Coord<f64>> = Vec::new();
            let (mut chain, mut forward) = (first, first_forward);
            while !visited[chain][usize::from(!forward)] {
                visited[chain][usize::from(!forward)] = true;

                if forward {
                    ring.extend(open[chain].iter().copied());
                } else {
                    ring.extend(open[chain].iter().rev().copied());
                }

                // Arrived at the end when walking forward, at the start otherwise
                let here = position(chain, !forward);
                let next = (here + 1) % stops.len();
                let (to_param, next_chain, next_is_start) = stops[next];
                ring.extend(corners_between(stops[here].0, to_param, bbox));

                chain = next_chain;
                forward = next_is_start;
            }

            if let Some(&start) = ring.first() {
                ring.push(start);
            }
            faces.push(LineString::new(ring));
        }
    }

    faces
}

/// Attach each ring as a hole of the smallest ring that encloses it
fn nest_rings(rings: &[LineString<f64>]) -> Vec<Polygon<f64>> {
    let areas: Vec<f64> = rings.iter().map(ring_area_m2).collect();
    let shells: Vec<Polygon<f64>> = rings
        .iter()
        .map(|r| Polygon::new(r.clone(), vec![]))
        .collect();

    let mut holes: Vec<Vec<LineString<f64>>> = vec![Vec::new(); rings.len()];
    for (i, ring) in rings.iter().enumerate() {
        let probe = geo::Point::from(ring.0[0]);
        let parent = (0..rings.len())
            .filter(|&j| j != i && areas[j] > areas[i] && shells[j].contains(&probe))
            .min_by(|&a, &b| areas[a].total_cmp(&areas[b]));
        if let Some(j) = parent {
            holes[j].push(ring.clone());
        }
    }

    rings
        .iter()
        .zip(holes)
        .map(|(ring, holes)| Polygon::new(ring.clone(), holes))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::area::polygon_area_m2;

    fn bbox() -> BoundingBox {
        BoundingBox::new(0.0, 0.0, 0.1, 0.1).unwrap()
    }

    fn line(points: &[(f64, f64)]) -> LineString<f64> {
        LineString::from(points.to_vec())
    }

    #[test]
    fn test_no_parts_no_polygons() {
        let outcome = polygonize(&[], &bbox(), &[SeedPoint::land(0.05, 0.05)], 0.0).unwrap();
        assert!(outcome.polygons.is_empty());
    }

    #[test]
    fn test_crossing_coastline_splits_box() {
        // Coast runs west to east through the middle, land to the north
        let coast = line(&[(-0.01, 0.05), (0.05, 0.052), (0.11, 0.05)]);
        let seeds = [SeedPoint::land(0.05, 0.08), SeedPoint::water(0.05, 0.02)];
        let outcome = polygonize(&[coast], &bbox(), &seeds, 0.0).unwrap();

        assert_eq!(outcome.rings_built, 2);
        assert_eq!(outcome.polygons.len(), 1);
        let land = &outcome.polygons[0];
        assert!(land.contains(&geo::Point::new(0.05, 0.09)));
        assert!(!land.contains(&geo::Point::new(0.05, 0.01)));

        let full = polygon_area_m2(&bbox().to_polygon());
        let area = polygon_area_m2(land);
        assert!(area > full * 0.4 && area < full * 0.6);
    }

    #[test]
    fn test_two_coastlines_make_three_faces() {
        let west_coast = line(&[(0.03, -0.01), (0.03, 0.11)]);
        let east_coast = line(&[(0.07, 0.11), (0.07, -0.01)]);
        let seeds = [
            SeedPoint::land(0.01, 0.05),
            SeedPoint::water(0.05, 0.05),
            SeedPoint::land(0.09, 0.05),
        ];
        let outcome = polygonize(&[west_coast, east_coast], &bbox(), &seeds, 0.0).unwrap();
        assert_eq!(outcome.rings_built, 3);
        assert_eq!(outcome.polygons.len(), 2);
    }

    #[test]
    fn test_island_inside_frame() {
        let island = line(&[
            (0.04, 0.04),
            (0.06, 0.04),
            (0.06, 0.06),
            (0.04, 0.06),
            (0.04, 0.04),
        ]);
        let seeds = [SeedPoint::land(0.05, 0.05), SeedPoint::water(0.01, 0.01)];
        let outcome = polygonize(&[island], &bbox(), &seeds, 0.0).unwrap();
        assert_eq!(outcome.rings_built, 2);
        assert_eq!(outcome.polygons.len(), 1);
        assert!(outcome.polygons[0].interiors().is_empty());
    }

    #[test]
    fn test_lake_becomes_hole() {
        let coast = line(&[(-0.01, 0.03), (0.11, 0.03)]);
        let lake = line(&[
            (0.04, 0.06),
            (0.06, 0.06),
            (0.06, 0.08),
            (0.04, 0.08),
            (0.04, 0.06),
        ]);
        let seeds = [
            SeedPoint::land(0.02, 0.09),
            SeedPoint::water(0.05, 0.07),
            SeedPoint::water(0.05, 0.01),
        ];
        let outcome = polygonize(&[coast, lake], &bbox(), &seeds, 0.0).unwrap();
        assert_eq!(outcome.polygons.len(), 1);
        assert_eq!(outcome.polygons[0].interiors().len(), 1);
    }

    #[test]
    fn test_dangling_chain_counted() {
        let dangling = line(&[(0.02, 0.02), (0.05, 0.05)]);
        let outcome = polygonize(&[dangling], &bbox(), &[SeedPoint::land(0.05, 0.05)], 0.0).unwrap();
        assert_eq!(outcome.unclosed_chains, 1);
        assert!(outcome.polygons.is_empty());
    }

    #[test]
    fn test_small_land_dropped() {
        let islet = line(&[
            (0.05, 0.05),
            (0.0501, 0.05),
            (0.0501, 0.0501),
            (0.05, 0.0501),
            (0.05, 0.05),
        ]);
        let seeds = [SeedPoint::land(0.05005, 0.05005)];
        let outcome = polygonize(&[islet.clone()], &bbox(), &seeds, 8000.0).unwrap();
        assert!(outcome.polygons.is_empty());
        assert_eq!(outcome.dropped_small, 1);

        let outcome = polygonize(&[islet], &bbox(), &seeds, 0.0).unwrap();
        assert_eq!(outcome.polygons.len(), 1);
    }

    #[test]
    fn test_corners_between() {
        let b = bbox();
        // From the middle of the south side to the middle of the north side, CCW
        let corners = corners_between(0.5, 2.5, &b);
        assert_eq!(corners, vec![b.corners()[1], b.corners()[2]]);
        // Wrapping past the south-west corner
        let corners = corners_between(3.5, 0.5, &b);
        assert_eq!(corners, vec![b.corners()[0]]);
    }
}
