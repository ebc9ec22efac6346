//! harborland - Derive clean land polygons from noisy coastline and water-mask vector data

pub mod classify;
pub mod config;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod input;
pub mod output;
pub mod pipeline;
pub mod raster;
pub mod vector;

pub use config::{EngineConfig, FileConfig, Strategy};
pub use domain::{LineFeature, OutputFeature, Provenance, SeedPoint};
pub use error::{ConfigError, GeometryError, InputFormatError};
pub use pipeline::{Engine, PipelineOutput, RunReport};
