pub mod area;
pub mod bbox;
pub mod grid;
pub mod ops;
pub mod projection;
pub mod simplify;

pub use area::{filter_by_area, multi_polygon_area_m2, polygon_area_m2, ring_area_m2};
pub use bbox::BoundingBox;
pub use grid::GridMapper;
pub use projection::Projector;
pub use simplify::simplify_part;
