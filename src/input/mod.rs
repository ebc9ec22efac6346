pub mod parser;

pub use parser::{
    LoadedSources, line_features, load_line_sources, load_water_sources,
    parse_feature_collection, water_polygons,
};
