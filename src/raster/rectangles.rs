//! Scanline decomposition of a cell mask into grid-aligned rectangles.

use std::collections::BTreeMap;

use super::grid::CellMask;

/// Inclusive block of cells `x0..=x1` by `y0..=y1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CellRect {
    pub x0: usize,
    pub x1: usize,
    pub y0: usize,
    pub y1: usize,
}

impl CellRect {
    pub fn width(&self) -> usize {
        self.x1 - self.x0 + 1
    }

    pub fn height(&self) -> usize {
        self.y1 - self.y0 + 1
    }

    pub fn cell_count(&self) -> usize {
        self.width() * self.height()
    }
}

/// Maximal runs of set cells in row `y` as inclusive (x0, x1) pairs
pub fn row_runs(mask: &CellMask, y: usize) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;

    for x in 0..mask.cols() {
        match (mask.get(x, y), start) {
            (true, None) => start = Some(x),
            (false, Some(x0)) => {
                runs.push((x0, x - 1));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(x0) = start {
        runs.push((x0, mask.cols() - 1));
    }

    runs
}

/// Merge identical runs across consecutive rows into rectangles.
///
/// Single pass over the rows. A rectangle stays open while the next row has
/// a run with exactly the same (x0, x1) and is emitted when that run ends.
/// Every set cell ends up in exactly one rectangle.
pub fn decompose(mask: &CellMask) -> Vec<CellRect> {
    let mut rects = Vec::new();
    let mut active: BTreeMap<(usize, usize), usize> = BTreeMap::new();

    for y in 0..mask.rows() {
        let mut next_active = BTreeMap::new();
        for run in row_runs(mask, y) {
            let y0 = active.remove(&run).unwrap_or(y);
            next_active.insert(run, y0);
        }

        for ((x0, x1), y0) in active {
            rects.push(CellRect {
                x0,
                x1,
                y0,
                y1: y - 1,
            });
        }
        active = next_active;
    }

    let last_row = mask.rows().saturating_sub(1);
    for ((x0, x1), y0) in active {
        rects.push(CellRect {
            x0,
            x1,
            y0,
            y1: last_row,
        });
    }

    rects.sort_by_key(|r| (r.y0, r.x0));
    rects
}

/// Split a rectangle into chips of at most `chip_cols x chip_rows` cells
pub fn tile(rect: &CellRect, chip_cols: usize, chip_rows: usize) -> Vec<CellRect> {
    let chip_cols = chip_cols.max(1);
    let chip_rows = chip_rows.max(1);
    if rect.width() <= chip_cols && rect.height() <= chip_rows {
        return vec![*rect];
    }

    let mut chips = Vec::new();
    let mut y0 = rect.y0;
    while y0 <= rect.y1 {
        let y1 = (y0 + chip_rows - 1).min(rect.y1);
        let mut x0 = rect.x0;
        while x0 <= rect.x1 {
            let x1 = (x0 + chip_cols - 1).min(rect.x1);
            chips.push(CellRect { x0, x1, y0, y1 });
            x0 = x1 + 1;
        }
        y0 = y1 + 1;
    }
    chips
}

/// Decompose then tile every oversized rectangle
pub fn decompose_chips(mask: &CellMask, chip_cols: usize, chip_rows: usize) -> Vec<CellRect> {
    decompose(mask)
        .iter()
        .flat_map(|rect| tile(rect, chip_cols, chip_rows))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coverage(rects: &[CellRect], cols: usize, rows: usize) -> Vec<u32> {
        let mut hits = vec![0u32; cols * rows];
        for r in rects {
            for y in r.y0..=r.y1 {
                for x in r.x0..=r.x1 {
                    hits[y * cols + x] += 1;
                }
            }
        }
        hits
    }

    fn assert_exact_cover(mask: &CellMask, rects: &[CellRect]) {
        let hits = coverage(rects, mask.cols(), mask.rows());
        for (idx, &set) in mask.cells().iter().enumerate() {
            assert_eq!(hits[idx], u32::from(set), "cell {idx}");
        }
    }

    #[test]
    fn test_row_runs() {
        let mask = CellMask::from_fn(10, 1, |x| matches!(x, 0 | 1 | 4 | 7 | 8 | 9));
        assert_eq!(row_runs(&mask, 0), vec![(0, 1), (4, 4), (7, 9)]);
    }

    #[test]
    fn test_full_mask_is_one_rect() {
        let mask = CellMask::from_fn(10, 10, |_| true);
        let rects = decompose(&mask);
        assert_eq!(
            rects,
            vec![CellRect {
                x0: 0,
                x1: 9,
                y0: 0,
                y1: 9
            }]
        );
    }

    #[test]
    fn test_empty_mask() {
        let mask = CellMask::empty(10, 10);
        assert!(decompose(&mask).is_empty());
    }

    #[test]
    fn test_changing_runs_split_rects() {
        // L shape: rows 0..3 span x 0..=5, rows 3..6 span x 0..=1
        let mask = CellMask::from_fn(10, 6, |i| {
            let (x, y) = (i % 10, i / 10);
            if y < 3 { x <= 5 } else { x <= 1 }
        });
        let rects = decompose(&mask);
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[0], CellRect { x0: 0, x1: 5, y0: 0, y1: 2 });
        assert_eq!(rects[1], CellRect { x0: 0, x1: 1, y0: 3, y1: 5 });
        assert_exact_cover(&mask, &rects);
    }

    #[test]
    fn test_irregular_mask_exact_cover() {
        let mask = CellMask::from_fn(23, 17, |i| {
            let (x, y) = (i % 23, i / 23);
            (x * 7 + y * 3) % 5 != 0 && (x + y) % 11 != 4
        });
        let rects = decompose(&mask);
        assert_exact_cover(&mask, &rects);

        let chips = decompose_chips(&mask, 3, 2);
        assert_exact_cover(&mask, &chips);
        assert!(chips.iter().all(|c| c.width() <= 3 && c.height() <= 2));
    }

    #[test]
    fn test_tile_bounds_chip_size() {
        let rect = CellRect { x0: 0, x1: 39, y0: 0, y1: 29 };
        let chips = tile(&rect, 18, 14);
        // ceil(40/18) * ceil(30/14) = 3 * 3
        assert_eq!(chips.len(), 9);
        assert!(chips.iter().all(|c| c.width() <= 18 && c.height() <= 14));
        assert_eq!(chips.iter().map(CellRect::cell_count).sum::<usize>(), 1200);
    }

    #[test]
    fn test_small_rect_not_tiled() {
        let rect = CellRect { x0: 2, x1: 5, y0: 3, y1: 4 };
        assert_eq!(tile(&rect, 18, 14), vec![rect]);
    }
}
