//! Breadth-first region growing over the classification grid.

use std::collections::VecDeque;

use super::grid::{CellClass, CellMask, ClassificationGrid, Edge, border_indices, neighbors4};
use crate::domain::{SeedKind, SeedPoint};
use crate::geometry::GridMapper;

/// Grow a region from `seeds` through 4-connected cells accepted by `passable`.
///
/// Cells are marked before they are queued, so each cell is expanded at most
/// once and the result depends only on the seed set, not its order.
/// Impassable seeds are ignored.
pub fn flood_fill(
    cols: usize,
    rows: usize,
    seeds: impl IntoIterator<Item = usize>,
    passable: impl Fn(usize) -> bool,
) -> CellMask {
    let mut visited = CellMask::empty(cols, rows);
    let mut queue = VecDeque::new();

    for seed in seeds {
        if seed < cols * rows && !visited.at(seed) && passable(seed) {
            visited.set_at(seed, true);
            queue.push_back(seed);
        }
    }

    while let Some(idx) = queue.pop_front() {
        for next in neighbors4(cols, rows, idx) {
            if !visited.at(next) && passable(next) {
                visited.set_at(next, true);
                queue.push_back(next);
            }
        }
    }

    visited
}

/// Masks produced by the water and land passes
#[derive(Debug, Clone)]
pub struct Segmentation {
    pub water: CellMask,
    /// Unblocked and not reached by water
    pub candidate_land: CellMask,
    /// Reached from a land seed inside the candidate land
    pub confirmed_land: CellMask,
}

/// Run the water pass then the land pass, painting the grid as it goes.
///
/// # Arguments
/// * `open_edges` - grid edges whose cells seed the water pass
pub fn segment(
    grid: &mut ClassificationGrid,
    mapper: &GridMapper,
    seeds: &[SeedPoint],
    open_edges: &[Edge],
) -> Segmentation {
    let cols = grid.cols();
    let rows = grid.rows();

    let water_seeds = border_indices(cols, rows, open_edges)
        .into_iter()
        .chain(seed_cells(mapper, seeds, SeedKind::Water));
    let water = flood_fill(cols, rows, water_seeds, |i| !grid.is_blocked(i));
    grid.paint(&water, CellClass::Water);

    let candidate_land = CellMask::from_fn(cols, rows, |i| !grid.is_blocked(i) && !water.at(i));

    let land_seeds = seed_cells(mapper, seeds, SeedKind::Land);
    let confirmed_land = flood_fill(cols, rows, land_seeds, |i| candidate_land.at(i));
    grid.paint(&confirmed_land, CellClass::Land);

    log::debug!(
        "Flood fill: {} water, {} candidate land, {} confirmed land cells",
        water.count(),
        candidate_land.count(),
        confirmed_land.count()
    );

    Segmentation {
        water,
        candidate_land,
        confirmed_land,
    }
}

/// Grid indices of the seeds of one kind
pub fn seed_cells<'a>(
    mapper: &'a GridMapper,
    seeds: &'a [SeedPoint],
    kind: SeedKind,
) -> impl Iterator<Item = usize> + 'a {
    seeds.iter().filter(move |s| s.kind == kind).map(move |s| {
        let (x, y) = mapper.cell_of(s.lon, s.lat);
        mapper.index(x, y)
    })
}

/// Extend `land` into blocked cells up to `steps` 4-connected moves away.
///
/// Water cells are never claimed. Returns the number of cells added.
pub fn grow_into_blocked(land: &mut CellMask, grid: &ClassificationGrid, steps: u32) -> usize {
    let cols = land.cols();
    let rows = land.rows();
    let mut frontier: Vec<usize> = (0..cols * rows).filter(|&i| land.at(i)).collect();
    let mut added = 0;

    for _ in 0..steps {
        let mut next = Vec::new();
        for &idx in &frontier {
            for n in neighbors4(cols, rows, idx) {
                if !land.at(n) && grid.is_blocked(n) {
                    land.set_at(n, true);
                    next.push(n);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        added += next.len();
        frontier = next;
    }

    added
}

/// Label 4-connected components of `mask`; unset cells get `None`
pub fn label_components(mask: &CellMask) -> (Vec<Option<usize>>, usize) {
    let cols = mask.cols();
    let rows = mask.rows();
    let mut labels = vec![None; cols * rows];
    let mut queue = VecDeque::new();
    let mut count = 0;

    for start in 0..cols * rows {
        if !mask.at(start) || labels[start].is_some() {
            continue;
        }
        labels[start] = Some(count);
        queue.push_back(start);

        while let Some(idx) = queue.pop_front() {
            for next in neighbors4(cols, rows, idx) {
                if mask.at(next) && labels[next].is_none() {
                    labels[next] = Some(count);
                    queue.push_back(next);
                }
            }
        }
        count += 1;
    }

    (labels, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BoundingBox;

    fn ten_by_ten() -> (ClassificationGrid, GridMapper) {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0).unwrap();
        let mapper = GridMapper::new(bbox, 10, 10, 10).unwrap();
        (ClassificationGrid::new(10, 10), mapper)
    }

    fn block_row(grid: &mut ClassificationGrid, y: usize) {
        for x in 0..grid.cols() {
            grid.set(x, y, CellClass::Blocked);
        }
    }

    #[test]
    fn test_blocked_row_separates_water() {
        let (mut grid, mapper) = ten_by_ten();
        block_row(&mut grid, 5);

        // Open sea along the southern edge only
        let seg = segment(&mut grid, &mapper, &[], &[Edge::South]);

        for y in 0..10 {
            for x in 0..10 {
                let idx = y * 10 + x;
                if y < 5 {
                    assert!(seg.water.at(idx));
                } else {
                    assert!(!seg.water.at(idx));
                }
                if y > 5 {
                    assert!(seg.candidate_land.at(idx));
                }
            }
        }
        assert!(seg.confirmed_land.is_empty());
        assert_eq!(grid.count(CellClass::Water), 50);
    }

    #[test]
    fn test_all_edges_reach_both_halves() {
        let (mut grid, mapper) = ten_by_ten();
        block_row(&mut grid, 5);
        let seg = segment(&mut grid, &mapper, &[], &Edge::ALL);
        assert_eq!(seg.water.count(), 90);
        assert!(seg.candidate_land.is_empty());
    }

    #[test]
    fn test_no_lines_floods_everything() {
        let (mut grid, mapper) = ten_by_ten();
        let seeds = [SeedPoint::land(5.5, 5.5)];
        let seg = segment(&mut grid, &mapper, &seeds, &Edge::ALL);
        assert_eq!(seg.water.count(), 100);
        assert!(seg.candidate_land.is_empty());
        assert!(seg.confirmed_land.is_empty());
    }

    #[test]
    fn test_land_seed_confirms_enclosed_region() {
        let (mut grid, mapper) = ten_by_ten();
        // Ring of blocked cells enclosing 3..=6 x 3..=6
        for i in 2..=7 {
            grid.set(i, 2, CellClass::Blocked);
            grid.set(i, 7, CellClass::Blocked);
            grid.set(2, i, CellClass::Blocked);
            grid.set(7, i, CellClass::Blocked);
        }
        let seeds = [SeedPoint::land(4.5, 4.5)];
        let seg = segment(&mut grid, &mapper, &seeds, &Edge::ALL);
        assert_eq!(seg.confirmed_land.count(), 16);
        assert_eq!(seg.candidate_land.count(), 16);
        assert_eq!(grid.get(4, 4), CellClass::Land);
    }

    #[test]
    fn test_water_seed_inside_enclosure() {
        let (mut grid, mapper) = ten_by_ten();
        for i in 2..=7 {
            grid.set(i, 2, CellClass::Blocked);
            grid.set(i, 7, CellClass::Blocked);
            grid.set(2, i, CellClass::Blocked);
            grid.set(7, i, CellClass::Blocked);
        }
        let seeds = [SeedPoint::water(4.5, 4.5), SeedPoint::land(5.5, 5.5)];
        let seg = segment(&mut grid, &mapper, &seeds, &Edge::ALL);
        assert!(seg.candidate_land.is_empty());
        assert!(seg.confirmed_land.is_empty());
    }

    #[test]
    fn test_flood_fill_order_independent() {
        let passable = |i: usize| i % 7 != 3 && i % 11 != 5;
        let seeds = vec![0, 17, 42, 99, 63];
        let forward = flood_fill(10, 10, seeds.clone(), passable);
        let reversed = flood_fill(10, 10, seeds.into_iter().rev(), passable);
        let shuffled = flood_fill(10, 10, vec![63, 0, 99, 42, 17, 42], passable);
        assert_eq!(forward, reversed);
        assert_eq!(forward, shuffled);
    }

    #[test]
    fn test_grow_into_blocked_stops_at_water() {
        let (mut grid, _) = ten_by_ten();
        block_row(&mut grid, 5);
        let mut land = CellMask::from_fn(10, 10, |i| i / 10 > 5);
        let water = CellMask::from_fn(10, 10, |i| i / 10 < 5);
        grid.paint(&water, CellClass::Water);

        let added = grow_into_blocked(&mut land, &grid, 3);
        assert_eq!(added, 10);
        assert!(land.get(0, 5));
        assert!(!land.get(0, 4));
    }

    #[test]
    fn test_label_components() {
        let mask = CellMask::from_fn(10, 10, |i| {
            let (x, y) = (i % 10, i / 10);
            (x < 2 && y < 2) || (x > 7 && y > 7)
        });
        let (labels, count) = label_components(&mask);
        assert_eq!(count, 2);
        assert_eq!(labels[0], Some(0));
        assert_eq!(labels[99], Some(1));
        assert_eq!(labels[50], None);
    }
}
