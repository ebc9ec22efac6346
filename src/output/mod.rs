pub mod assemble;
pub mod collection;

pub use assemble::{AssemblyOptions, AssemblyStats, WaterMask, assemble, carve};
pub use collection::{to_feature_collection, to_geojson_string};
