/// Classification of one grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum CellClass {
    #[default]
    Unclassified = 0,
    Blocked = 1,
    Water = 2,
    Land = 3,
}

/// Row-major byte grid mutated in place by rasterization and flood fill
#[derive(Debug, Clone)]
pub struct ClassificationGrid {
    cols: usize,
    rows: usize,
    cells: Vec<CellClass>,
}

impl ClassificationGrid {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![CellClass::Unclassified; cols * rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.cols + x
    }

    pub fn get(&self, x: usize, y: usize) -> CellClass {
        self.cells[self.index(x, y)]
    }

    pub fn at(&self, idx: usize) -> CellClass {
        self.cells[idx]
    }

    pub fn set(&mut self, x: usize, y: usize, class: CellClass) {
        let idx = self.index(x, y);
        self.cells[idx] = class;
    }

    pub fn set_at(&mut self, idx: usize, class: CellClass) {
        self.cells[idx] = class;
    }

    pub fn is_blocked(&self, idx: usize) -> bool {
        self.cells[idx] == CellClass::Blocked
    }

    pub fn count(&self, class: CellClass) -> usize {
        self.cells.iter().filter(|&&c| c == class).count()
    }

    /// Mark every cell set in `mask` with `class`
    pub fn paint(&mut self, mask: &CellMask, class: CellClass) {
        for (cell, &set) in self.cells.iter_mut().zip(mask.cells()) {
            if set {
                *cell = class;
            }
        }
    }
}

/// One side of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    South,
    North,
    West,
    East,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::South, Edge::North, Edge::West, Edge::East];
}

/// Indices of the cells along the given edges; corners appear once
pub fn border_indices(cols: usize, rows: usize, edges: &[Edge]) -> Vec<usize> {
    let mut indices = Vec::with_capacity(2 * (cols + rows));
    for edge in edges {
        match edge {
            Edge::South => indices.extend(0..cols),
            Edge::North => indices.extend((0..cols).map(|x| (rows - 1) * cols + x)),
            Edge::West => indices.extend((0..rows).map(|y| y * cols)),
            Edge::East => indices.extend((0..rows).map(|y| y * cols + cols - 1)),
        }
    }
    indices.sort_unstable();
    indices.dedup();
    indices
}

/// Indices of the 4-connected neighbours of `idx`
pub fn neighbors4(cols: usize, rows: usize, idx: usize) -> impl Iterator<Item = usize> {
    let x = idx % cols;
    let y = idx / cols;
    let left = (x > 0).then(|| idx - 1);
    let right = (x + 1 < cols).then(|| idx + 1);
    let down = (y > 0).then(|| idx - cols);
    let up = (y + 1 < rows).then(|| idx + cols);
    [left, right, down, up].into_iter().flatten()
}

/// Boolean cell mask sharing the grid's dimensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellMask {
    cols: usize,
    rows: usize,
    cells: Vec<bool>,
}

impl CellMask {
    pub fn empty(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![false; cols * rows],
        }
    }

    pub fn from_fn(cols: usize, rows: usize, f: impl Fn(usize) -> bool) -> Self {
        Self {
            cols,
            rows,
            cells: (0..cols * rows).map(f).collect(),
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.cols + x]
    }

    pub fn at(&self, idx: usize) -> bool {
        self.cells[idx]
    }

    pub fn set_at(&mut self, idx: usize, value: bool) {
        self.cells[idx] = value;
    }

    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.cells.iter().any(|&c| c)
    }
}
