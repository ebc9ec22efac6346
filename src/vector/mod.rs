//! Vector strategy: polygons straight from the coastline network.

pub mod chain;
pub mod polygonize;

pub use polygonize::{PolygonizeOutcome, polygonize};
