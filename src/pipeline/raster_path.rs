//! Raster strategy: rasterize, flood fill, pick a mask, decompose into chips.

use geo::{LineString, Polygon};

use crate::config::EngineConfig;
use crate::geometry::area::passes_min_area;
use crate::geometry::{GridMapper, polygon_area_m2};
use crate::raster::{
    CellClass, ClassificationGrid, FallbackDecision, choose_land_mask, decompose_chips,
    dilate_blocked, grow_into_blocked, label_components, rasterize_part, segment,
};

/// Everything the raster path produced
#[derive(Debug, Clone)]
pub struct RasterOutcome {
    pub polygons: Vec<Polygon<f64>>,
    pub decision: FallbackDecision,
    pub parts_rasterized: usize,
    pub part_errors: usize,
    pub blocked_cells: usize,
    pub water_cells: usize,
    pub land_cells: usize,
    pub rectangles: usize,
    /// Land components under the minimum area
    pub dropped_components: usize,
}

/// Run the raster path over already classified and simplified line parts.
///
/// Chips are grouped by the 4-connected land component they belong to and a
/// component is kept only when its total area reaches `min_area_m2`.
pub fn run_raster(
    parts: &[LineString<f64>],
    mapper: &GridMapper,
    config: &EngineConfig,
) -> RasterOutcome {
    let mut grid = ClassificationGrid::new(mapper.cols(), mapper.rows());

    let mut parts_rasterized = 0;
    let mut part_errors = 0;
    for part in parts {
        match rasterize_part(&mut grid, mapper, part) {
            Ok(_) => parts_rasterized += 1,
            Err(e) => {
                log::debug!("Skipping line part: {e}");
                part_errors += 1;
            }
        }
    }
    if parts_rasterized > 0 {
        dilate_blocked(&mut grid);
    }
    let blocked_cells = grid.count(CellClass::Blocked);

    let segmentation = segment(&mut grid, mapper, &config.seeds, &config.open_water_edges);
    let (mut land, decision) = choose_land_mask(
        &segmentation,
        mapper,
        &config.seeds,
        config.seed_hit_threshold,
    );
    grow_into_blocked(&mut land, &grid, config.coast_margin_cells);

    let chips = decompose_chips(&land, config.chip_cols, config.chip_rows);
    let (labels, component_count) = label_components(&land);

    let mut component_areas = vec![0.0; component_count];
    let mut labelled = Vec::with_capacity(chips.len());
    for chip in &chips {
        let Some(label) = labels[mapper.index(chip.x0, chip.y0)] else {
            continue;
        };
        let polygon = mapper
            .cells_rect(chip.x0, chip.x1, chip.y0, chip.y1)
            .to_polygon();
        component_areas[label] += polygon_area_m2(&polygon);
        labelled.push((label, polygon));
    }

    let keep: Vec<bool> = component_areas
        .iter()
        .map(|&area| passes_min_area(area, config.min_area_m2))
        .collect();
    let dropped_components = keep.iter().filter(|&&k| !k).count();
    let polygons: Vec<Polygon<f64>> = labelled
        .into_iter()
        .filter(|(label, _)| keep[*label])
        .map(|(_, polygon)| polygon)
        .collect();

    log::info!(
        "Raster path: {} parts drawn, {} blocked cells, {} land cells, {} chips, {} components dropped by area",
        parts_rasterized,
        blocked_cells,
        land.count(),
        chips.len(),
        dropped_components
    );

    RasterOutcome {
        polygons,
        decision,
        parts_rasterized,
        part_errors,
        blocked_cells,
        water_cells: segmentation.water.count(),
        land_cells: land.count(),
        rectangles: chips.len(),
        dropped_components,
    }
}
