//! Clip, carve and tag candidate land polygons.

use geo::{BoundingRect, MultiPolygon, Polygon, Rect};

use crate::domain::{OutputFeature, Provenance};
use crate::geometry::area::passes_min_area;
use crate::geometry::{BoundingBox, multi_polygon_area_m2, ops, polygon_area_m2};

/// Water-mask polygons with their bounding boxes precomputed
pub struct WaterMask<'a> {
    polygons: &'a [Polygon<f64>],
    rects: Vec<Option<Rect<f64>>>,
}

impl<'a> WaterMask<'a> {
    pub fn new(polygons: &'a [Polygon<f64>]) -> Self {
        Self {
            polygons,
            rects: polygons.iter().map(|p| p.bounding_rect()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Water polygons whose bbox overlaps `rect`
    fn relevant(&self, rect: Rect<f64>) -> impl Iterator<Item = &'a Polygon<f64>> + '_ {
        self.polygons
            .iter()
            .zip(&self.rects)
            .filter(move |(_, water_rect)| water_rect.is_some_and(|w| rects_overlap(&w, &rect)))
            .map(|(p, _)| p)
    }
}

fn rects_overlap(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.min().x <= b.max().x && a.max().x >= b.min().x && a.min().y <= b.max().y && a.max().y >= b.min().y
}

/// Result of carving one land shape
#[derive(Debug, Clone)]
pub struct CarveOutcome {
    pub shape: MultiPolygon<f64>,
    /// Water polygons that passed the bbox pre-filter
    pub relevant: usize,
    /// Differences that failed and were skipped
    pub failures: usize,
}

/// Subtract every relevant water polygon from `land`, one at a time.
///
/// A failed difference skips that water polygon and carving continues with
/// the rest; the land shape is never dropped because of a failure.
pub fn carve(land: MultiPolygon<f64>, water: &WaterMask<'_>) -> CarveOutcome {
    let mut outcome = CarveOutcome {
        shape: land,
        relevant: 0,
        failures: 0,
    };
    let Some(land_rect) = outcome.shape.bounding_rect() else {
        return outcome;
    };

    for water_polygon in water.relevant(land_rect) {
        outcome.relevant += 1;
        match ops::difference(&outcome.shape, water_polygon) {
            Ok(carved) => outcome.shape = carved,
            Err(e) => {
                log::debug!("Skipping water polygon during carve: {e}");
                outcome.failures += 1;
            }
        }
        if outcome.shape.0.is_empty() {
            break;
        }
    }

    outcome
}

/// Counters gathered while assembling
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    pub clip_failures: usize,
    pub carve_failures: usize,
    pub carved_away: usize,
    pub dropped_small: usize,
}

/// Options for one assembly pass
#[derive(Debug, Clone)]
pub struct AssemblyOptions {
    pub source: Provenance,
    /// Union the candidates before clipping
    pub merge: bool,
    /// Minimum area re-applied to carved parts; `None` only drops empty parts
    pub min_area_m2: Option<f64>,
}

/// Turn candidate land polygons into tagged output features.
///
/// Candidates are optionally unioned, clipped to the bbox, carved against the
/// water mask and tagged. A candidate whose every relevant carve failed is
/// tagged [`Provenance::BboxOnly`].
pub fn assemble(
    candidates: Vec<Polygon<f64>>,
    bbox: &BoundingBox,
    water: Option<&WaterMask<'_>>,
    options: &AssemblyOptions,
    stats: &mut AssemblyStats,
) -> Vec<OutputFeature> {
    let candidates = if options.merge && candidates.len() > 1 {
        match ops::union_all(&candidates) {
            Ok(merged) => merged.0,
            Err(e) => {
                log::warn!("Union of {} land polygons failed, keeping them separate: {e}", candidates.len());
                candidates
            }
        }
    } else {
        candidates
    };

    let mut features = Vec::with_capacity(candidates.len());

    for candidate in &candidates {
        let clipped = match ops::clip_polygon_to_bbox(candidate, bbox) {
            Ok(clipped) => clipped,
            Err(e) => {
                log::debug!("Dropping land polygon that failed to clip: {e}");
                stats.clip_failures += 1;
                continue;
            }
        };
        if clipped.0.is_empty() {
            continue;
        }

        let (shape, source) = match water {
            Some(mask) if !mask.is_empty() => {
                let outcome = carve(clipped, mask);
                stats.carve_failures += outcome.failures;
                let all_failed = outcome.relevant > 0 && outcome.failures == outcome.relevant;
                let source = if all_failed {
                    Provenance::BboxOnly
                } else {
                    options.source
                };
                (outcome.shape, source)
            }
            _ => (clipped, options.source),
        };

        let before = shape.0.len();
        let parts: Vec<Polygon<f64>> = shape
            .0
            .into_iter()
            .filter(|part| {
                let area = polygon_area_m2(part);
                match options.min_area_m2 {
                    Some(min) => passes_min_area(area, min),
                    None => area > 0.0,
                }
            })
            .collect();
        stats.dropped_small += before - parts.len();

        if parts.is_empty() {
            stats.carved_away += 1;
            continue;
        }

        let geometry = MultiPolygon::new(parts);
        let area_m2 = multi_polygon_area_m2(&geometry);
        features.push(OutputFeature {
            geometry,
            source,
            area_m2,
        });
    }

    features
}
