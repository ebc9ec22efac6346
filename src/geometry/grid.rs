use geo::{Rect, coord};

use super::BoundingBox;
use crate::error::ConfigError;

/// Maps geographic coordinates onto a fixed `cols x rows` cell lattice.
///
/// Row 0 is the southernmost row, column 0 the westernmost column. Mapping
/// never fails: coordinates outside the box clamp to the nearest edge cell.
#[derive(Debug, Clone)]
pub struct GridMapper {
    bbox: BoundingBox,
    cols: usize,
    rows: usize,
    cell_width: f64,
    cell_height: f64,
}

impl GridMapper {
    /// Create a mapper, enforcing at least `min_cells` cells per axis
    pub fn new(
        bbox: BoundingBox,
        cols: usize,
        rows: usize,
        min_cells: usize,
    ) -> Result<Self, ConfigError> {
        if cols < min_cells.max(1) || rows < min_cells.max(1) {
            return Err(ConfigError::GridTooSmall {
                cols,
                rows,
                min: min_cells,
            });
        }
        Ok(Self {
            bbox,
            cols,
            rows,
            cell_width: bbox.width() / cols as f64,
            cell_height: bbox.height() / rows as f64,
        })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_count(&self) -> usize {
        self.cols * self.rows
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn cell_width(&self) -> f64 {
        self.cell_width
    }

    pub fn cell_height(&self) -> f64 {
        self.cell_height
    }

    /// Continuous (unclamped) column coordinate in cell units
    pub fn grid_fx(&self, lon: f64) -> f64 {
        (lon - self.bbox.west) / self.cell_width
    }

    /// Continuous (unclamped) row coordinate in cell units
    pub fn grid_fy(&self, lat: f64) -> f64 {
        (lat - self.bbox.south) / self.cell_height
    }

    pub fn to_grid_x(&self, lon: f64) -> usize {
        clamp_index(self.grid_fx(lon), self.cols)
    }

    pub fn to_grid_y(&self, lat: f64) -> usize {
        clamp_index(self.grid_fy(lat), self.rows)
    }

    /// Cell containing a (lon, lat) point, clamped into the grid
    pub fn cell_of(&self, lon: f64, lat: f64) -> (usize, usize) {
        (self.to_grid_x(lon), self.to_grid_y(lat))
    }

    /// Flat row-major index of a cell
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.cols + x
    }

    /// Geographic centroid of a cell as (lon, lat)
    pub fn cell_center(&self, x: usize, y: usize) -> (f64, f64) {
        (
            self.bbox.west + (x as f64 + 0.5) * self.cell_width,
            self.bbox.south + (y as f64 + 0.5) * self.cell_height,
        )
    }

    /// Geographic extent of an inclusive block of cells
    pub fn cells_rect(&self, x0: usize, x1: usize, y0: usize, y1: usize) -> Rect<f64> {
        let west = self.bbox.west + x0 as f64 * self.cell_width;
        let south = self.bbox.south + y0 as f64 * self.cell_height;
        // The last column/row closes exactly on the box edge.
        let east = if x1 + 1 >= self.cols {
            self.bbox.east
        } else {
            self.bbox.west + (x1 + 1) as f64 * self.cell_width
        };
        let north = if y1 + 1 >= self.rows {
            self.bbox.north
        } else {
            self.bbox.south + (y1 + 1) as f64 * self.cell_height
        };
        Rect::new(coord! { x: west, y: south }, coord! { x: east, y: north })
    }
}

fn clamp_index(value: f64, len: usize) -> usize {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    (value.floor() as usize).min(len - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn harbor_grid() -> GridMapper {
        let bbox = BoundingBox::new(-74.26, 40.48, -73.75, 40.92).unwrap();
        GridMapper::new(bbox, 220, 190, 10).unwrap()
    }

    #[test]
    fn test_grid_rejects_small() {
        let bbox = BoundingBox::new(0.0, 0.0, 1.0, 1.0).unwrap();
        assert!(matches!(
            GridMapper::new(bbox, 4, 40, 10),
            Err(ConfigError::GridTooSmall { cols: 4, .. })
        ));
    }

    #[test]
    fn test_interior_points_in_range() {
        let grid = harbor_grid();
        for i in 1..100 {
            let t = i as f64 / 100.0;
            let lon = -74.26 + t * 0.51;
            let lat = 40.48 + t * 0.44;
            assert!(grid.to_grid_x(lon) < grid.cols());
            assert!(grid.to_grid_y(lat) < grid.rows());
        }
    }

    #[test]
    fn test_edges_map_to_last_index() {
        let grid = harbor_grid();
        assert_eq!(grid.to_grid_x(-73.75), 219);
        assert_eq!(grid.to_grid_y(40.92), 189);
        assert_eq!(grid.to_grid_x(-74.26), 0);
        assert_eq!(grid.to_grid_y(40.48), 0);
    }

    #[test]
    fn test_outside_points_clamp() {
        let grid = harbor_grid();
        assert_eq!(grid.cell_of(-80.0, 30.0), (0, 0));
        assert_eq!(grid.cell_of(-70.0, 50.0), (219, 189));
        assert_eq!(grid.to_grid_x(f64::NAN), 0);
    }

    #[test]
    fn test_cell_center_round_trips() {
        let bbox = BoundingBox::new(-74.26, 40.48, -73.75, 40.92).unwrap();
        let grid = GridMapper::new(bbox, 23, 17, 10).unwrap();
        for y in 0..grid.rows() {
            for x in 0..grid.cols() {
                let (lon, lat) = grid.cell_center(x, y);
                assert!(bbox.contains(lon, lat));
                assert_eq!(grid.cell_of(lon, lat), (x, y));
            }
        }
        let (lon, lat) = grid.cell_center(22, 16);
        assert!((lon - (-73.75 - grid.cell_width() / 2.0)).abs() < 1e-12);
        assert!((lat - (40.92 - grid.cell_height() / 2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_cells_rect_closes_on_edge() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0).unwrap();
        let grid = GridMapper::new(bbox, 10, 10, 10).unwrap();
        let rect = grid.cells_rect(8, 9, 0, 0);
        assert!((rect.min().x - 8.0).abs() < 1e-12);
        assert_eq!(rect.max().x, 10.0);
        assert!((rect.max().y - 1.0).abs() < 1e-12);
    }
}
