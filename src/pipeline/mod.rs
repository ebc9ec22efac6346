//! Orchestrates one run: classify, simplify, pick a strategy, assemble.

pub mod raster_path;
pub mod report;

pub use raster_path::{RasterOutcome, run_raster};
pub use report::RunReport;

use geo::{LineString, Polygon};
use geojson::FeatureCollection;

use crate::config::{EngineConfig, Strategy};
use crate::domain::{LineFeature, OutputFeature, Provenance};
use crate::error::ConfigError;
use crate::geometry::{GridMapper, simplify_part};
use crate::output::{AssemblyOptions, AssemblyStats, WaterMask, assemble, to_feature_collection};
use crate::vector::polygonize;

/// Land features plus the report describing how they were made
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub features: Vec<OutputFeature>,
    pub report: RunReport,
}

impl PipelineOutput {
    pub fn to_feature_collection(&self) -> FeatureCollection {
        to_feature_collection(&self.features)
    }
}

/// A validated configuration ready to process inputs.
///
/// Runs share nothing: every call to [`Engine::run`] allocates its own grid,
/// so one engine may serve independent inputs one after another.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    mapper: GridMapper,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mapper = GridMapper::new(
            config.bbox,
            config.grid_cols,
            config.grid_rows,
            config.min_grid_cells,
        )?;
        Ok(Self { config, mapper })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn mapper(&self) -> &GridMapper {
        &self.mapper
    }

    /// Produce land polygons from coastline lines and an optional water mask.
    ///
    /// Never fails: geometry problems are counted in the report and the run
    /// degrades to a coarser strategy or to fewer features.
    pub fn run(&self, lines: &[LineFeature], water_mask: &[Polygon<f64>]) -> PipelineOutput {
        let config = &self.config;
        let mut report = RunReport::new(config.strategy);
        report.land_seeds = config.land_seed_count();

        let (accepted, rejected) = config.classifier.partition(lines);
        report.lines_accepted = accepted.len();
        report.lines_rejected = rejected;
        log::info!(
            "Classified {} line features: {} coastline, {} excluded",
            lines.len(),
            accepted.len(),
            rejected
        );

        let parts: Vec<LineString<f64>> = accepted
            .into_iter()
            .flat_map(|feature| feature.geometry.parts())
            .map(|part| simplify_part(part, config.simplify_tolerance))
            .collect();
        log::debug!("{} line parts after simplification", parts.len());

        let (candidates, source) = match config.strategy {
            Strategy::RasterOnly => (self.raster_candidates(&parts, &mut report), Provenance::Raster),
            Strategy::VectorFirst => match self.vector_candidates(&parts, &mut report) {
                Some(polygons) => (polygons, Provenance::Vector),
                None => {
                    report.vector_fallback = true;
                    (
                        self.raster_candidates(&parts, &mut report),
                        Provenance::RasterFallback,
                    )
                }
            },
        };
        report.candidate_polygons = candidates.len();

        let water = WaterMask::new(water_mask);
        let is_vector = source == Provenance::Vector;
        let options = AssemblyOptions {
            source,
            merge: is_vector,
            min_area_m2: is_vector.then_some(config.min_area_m2),
        };
        let mut stats = AssemblyStats::default();
        let features = assemble(
            candidates,
            &config.bbox,
            (!water.is_empty()).then_some(&water),
            &options,
            &mut stats,
        );

        report.geometry_errors += stats.clip_failures;
        report.carve_failures = stats.carve_failures;
        report.dropped_by_area += stats.dropped_small;
        report.output_features = features.len();
        report.bbox_only_features = features
            .iter()
            .filter(|f| f.source == Provenance::BboxOnly)
            .count();
        report.produced_by = match report.bbox_only_features {
            _ if features.is_empty() => None,
            n if n == features.len() => Some(Provenance::BboxOnly),
            _ => Some(source),
        };

        if features.is_empty() {
            log::warn!("No land polygons produced");
        } else {
            log::info!("Produced {} land features ({})", features.len(), source);
        }

        PipelineOutput { features, report }
    }

    /// `None` when the vector path produced nothing usable
    fn vector_candidates(
        &self,
        parts: &[LineString<f64>],
        report: &mut RunReport,
    ) -> Option<Vec<Polygon<f64>>> {
        let config = &self.config;
        match polygonize(parts, &config.bbox, &config.seeds, config.min_area_m2) {
            Ok(outcome) => {
                report.geometry_errors += outcome.degenerate_rings;
                report.dropped_by_area += outcome.dropped_small;
                if outcome.polygons.is_empty() {
                    log::warn!(
                        "Vector polygonizer found no land in {} rings ({} unclosed chains), falling back to raster",
                        outcome.rings_built,
                        outcome.unclosed_chains
                    );
                    None
                } else {
                    log::info!(
                        "Vector polygonizer: {} land polygons from {} rings",
                        outcome.polygons.len(),
                        outcome.rings_built
                    );
                    Some(outcome.polygons)
                }
            }
            Err(e) => {
                report.geometry_errors += 1;
                log::warn!("Vector polygonizer failed: {e}, falling back to raster");
                None
            }
        }
    }

    fn raster_candidates(
        &self,
        parts: &[LineString<f64>],
        report: &mut RunReport,
    ) -> Vec<Polygon<f64>> {
        let outcome = run_raster(parts, &self.mapper, &self.config);
        report.parts_rasterized = outcome.parts_rasterized;
        report.geometry_errors += outcome.part_errors;
        report.blocked_cells = outcome.blocked_cells;
        report.water_cells = outcome.water_cells;
        report.land_cells = outcome.land_cells;
        report.rectangles = outcome.rectangles;
        report.dropped_by_area += outcome.dropped_components;
        report.seed_hits = outcome.decision.seed_hits;
        report.seed_fallback = outcome.decision.used_fallback;
        outcome.polygons
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;

    fn engine(strategy: Strategy) -> Engine {
        let config = EngineConfig {
            bbox: BoundingBox::new(0.0, 0.0, 0.2, 0.2).unwrap(),
            grid_cols: 20,
            grid_rows: 20,
            min_area_m2: 0.0,
            coast_margin_cells: 0,
            strategy,
            seeds: vec![
                crate::domain::SeedPoint::land(0.1, 0.1),
                crate::domain::SeedPoint::water(0.01, 0.01),
            ],
            ..EngineConfig::default()
        };
        Engine::new(config).unwrap()
    }

    fn island() -> LineFeature {
        LineFeature::from_coords(vec![
            (0.055, 0.055),
            (0.145, 0.055),
            (0.145, 0.145),
            (0.055, 0.145),
            (0.055, 0.055),
        ])
        .with_property("tidal", "yes")
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            grid_cols: 3,
            ..EngineConfig::default()
        };
        assert!(matches!(Engine::new(config), Err(ConfigError::GridTooSmall { .. })));
    }

    #[test]
    fn test_no_lines_no_features() {
        let output = engine(Strategy::VectorFirst).run(&[], &[]);
        assert!(output.features.is_empty());
        assert!(output.report.vector_fallback);
        assert_eq!(output.report.produced_by, None);
        assert_eq!(output.report.output_features, 0);
    }

    #[test]
    fn test_vector_island() {
        let output = engine(Strategy::VectorFirst).run(&[island()], &[]);
        assert_eq!(output.features.len(), 1);
        assert_eq!(output.features[0].source, Provenance::Vector);
        assert!(!output.report.vector_fallback);
        assert_eq!(output.report.lines_accepted, 1);
    }

    #[test]
    fn test_raster_only_island() {
        let output = engine(Strategy::RasterOnly).run(&[island()], &[]);
        assert!(!output.features.is_empty());
        assert!(output.features.iter().all(|f| f.source == Provenance::Raster));
        assert_eq!(output.report.land_cells, 36);
        assert!(!output.report.seed_fallback);
    }

    #[test]
    fn test_excluded_lines_are_ignored() {
        let canal = island().with_property("ftype", "Canal/Ditch");
        let output = engine(Strategy::VectorFirst).run(&[canal], &[]);
        assert_eq!(output.report.lines_rejected, 1);
        assert!(output.features.is_empty());
    }

    #[test]
    fn test_runs_are_independent() {
        let engine = engine(Strategy::RasterOnly);
        let first = engine.run(&[island()], &[]);
        let _ = engine.run(&[], &[]);
        let again = engine.run(&[island()], &[]);
        assert_eq!(first.features, again.features);
    }
}
