use std::fmt;

use crate::config::Strategy;
use crate::domain::Provenance;

/// Counts and decisions from one pipeline run, for diagnosing degraded output
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub strategy: Strategy,
    /// Provenance of the land that was actually produced
    pub produced_by: Option<Provenance>,
    /// The vector polygonizer yielded nothing usable and the raster path ran
    pub vector_fallback: bool,
    /// The candidate land mask replaced the seed-confirmed mask
    pub seed_fallback: bool,
    pub seed_hits: usize,
    pub land_seeds: usize,
    pub lines_accepted: usize,
    pub lines_rejected: usize,
    pub parts_rasterized: usize,
    pub blocked_cells: usize,
    pub water_cells: usize,
    pub land_cells: usize,
    pub rectangles: usize,
    pub candidate_polygons: usize,
    pub dropped_by_area: usize,
    pub geometry_errors: usize,
    pub carve_failures: usize,
    /// Features whose every relevant water carve failed
    pub bbox_only_features: usize,
    pub output_features: usize,
}

impl RunReport {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            produced_by: None,
            vector_fallback: false,
            seed_fallback: false,
            seed_hits: 0,
            land_seeds: 0,
            lines_accepted: 0,
            lines_rejected: 0,
            parts_rasterized: 0,
            blocked_cells: 0,
            water_cells: 0,
            land_cells: 0,
            rectangles: 0,
            candidate_polygons: 0,
            dropped_by_area: 0,
            geometry_errors: 0,
            carve_failures: 0,
            bbox_only_features: 0,
            output_features: 0,
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let produced = self.produced_by.map(|p| p.as_str()).unwrap_or("none");
        writeln!(f, "Strategy: {} (produced by {})", self.strategy.as_str(), produced)?;
        if self.vector_fallback {
            writeln!(f, "  Vector polygonizer fell back to raster path")?;
        }
        if self.seed_fallback {
            writeln!(
                f,
                "  Seed fallback used: {}/{} land seeds confirmed",
                self.seed_hits, self.land_seeds
            )?;
        }
        writeln!(
            f,
            "  Lines: {} accepted, {} rejected",
            self.lines_accepted, self.lines_rejected
        )?;
        if self.parts_rasterized > 0 {
            writeln!(
                f,
                "  Grid: {} blocked, {} water, {} land cells, {} rectangles",
                self.blocked_cells, self.water_cells, self.land_cells, self.rectangles
            )?;
        }
        writeln!(
            f,
            "  Polygons: {} candidates, {} dropped by area",
            self.candidate_polygons, self.dropped_by_area
        )?;
        writeln!(
            f,
            "  Errors: {} geometry, {} carve failures",
            self.geometry_errors, self.carve_failures
        )?;
        if self.bbox_only_features > 0 {
            writeln!(
                f,
                "  Uncarved: {} features kept at bbox clip only",
                self.bbox_only_features
            )?;
        }
        write!(f, "  Output: {} features", self.output_features)
    }
}
