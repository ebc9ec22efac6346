//! Raster segmentation path: rasterize lines, flood fill, choose a land mask,
//! decompose it into rectangles.

pub mod fallback;
pub mod flood;
pub mod grid;
pub mod rasterize;
pub mod rectangles;

pub use fallback::{FallbackDecision, choose_land_mask};
pub use flood::{Segmentation, flood_fill, grow_into_blocked, label_components, segment};
pub use grid::{CellClass, CellMask, ClassificationGrid, Edge};
pub use rasterize::{dilate_blocked, rasterize_part};
pub use rectangles::{CellRect, decompose, decompose_chips, tile};
