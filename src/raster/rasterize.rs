//! Draw coastline parts onto the classification grid as blocked cells.

use geo::LineString;

use super::grid::{CellClass, ClassificationGrid};
use crate::error::GeometryError;
use crate::geometry::GridMapper;

/// Mark the cells under one line part as blocked.
///
/// Each segment is sampled `ceil(max(|dx|, |dy|, 1) * 2)` times in grid
/// units and the cell under every sample is blocked. Samples more than half
/// a cell outside the bbox are skipped so out-of-range vertices do not smear
/// along the grid edge.
///
/// # Returns
/// * number of samples that landed on the grid
pub fn rasterize_part(
    grid: &mut ClassificationGrid,
    mapper: &GridMapper,
    part: &LineString<f64>,
) -> Result<usize, GeometryError> {
    if part.0.len() < 2 {
        return Err(GeometryError::DegenerateRing(part.0.len()));
    }
    if part.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return Err(GeometryError::NonFinite);
    }

    let bbox = *mapper.bbox();
    let margin = mapper.cell_width().max(mapper.cell_height()) / 2.0;
    let mut marked = 0;

    for segment in part.lines() {
        let (a, b) = (segment.start, segment.end);
        let dx = mapper.grid_fx(b.x) - mapper.grid_fx(a.x);
        let dy = mapper.grid_fy(b.y) - mapper.grid_fy(a.y);
        let steps = (dx.abs().max(dy.abs()).max(1.0) * 2.0).ceil() as usize;

        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let lon = a.x + (b.x - a.x) * t;
            let lat = a.y + (b.y - a.y) * t;
            if !bbox.contains_with_margin(lon, lat, margin) {
                continue;
            }
            let (x, y) = mapper.cell_of(lon, lat);
            grid.set(x, y, CellClass::Blocked);
            marked += 1;
        }
    }

    Ok(marked)
}

/// One pass of 8-neighbour dilation of the blocked cells.
///
/// Closes one-cell gaps in the drawn coastline. Returns the number of newly
/// blocked cells.
pub fn dilate_blocked(grid: &mut ClassificationGrid) -> usize {
    let cols = grid.cols();
    let rows = grid.rows();
    let original: Vec<bool> = (0..grid.len()).map(|i| grid.is_blocked(i)).collect();
    let mut added = 0;

    for y in 0..rows {
        for x in 0..cols {
            if original[y * cols + x] {
                continue;
            }
            let touches_blocked = (y.saturating_sub(1)..=(y + 1).min(rows - 1)).any(|ny| {
                (x.saturating_sub(1)..=(x + 1).min(cols - 1)).any(|nx| original[ny * cols + nx])
            });
            if touches_blocked {
                grid.set(x, y, CellClass::Blocked);
                added += 1;
            }
        }
    }

    added
}
