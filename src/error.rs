use thiserror::Error;

/// Invalid engine configuration. Fatal: the run never starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("bbox must satisfy west < east and south < north, got [{west}, {south}, {east}, {north}]")]
    BboxOrdering {
        west: f64,
        south: f64,
        east: f64,
        north: f64,
    },

    #[error("bbox coordinates must be finite")]
    BboxNotFinite,

    #[error("grid {cols}x{rows} is below the minimum of {min} cells per axis")]
    GridTooSmall { cols: usize, rows: usize, min: usize },

    #[error("{name} must be >= 0, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("coast_margin_cells must be within 0..=50, got {0}")]
    CoastMargin(u32),

    #[error("chip size must be at least 1x1, got {cols}x{rows}")]
    ChipSize { cols: usize, rows: usize },

    #[error("cannot read config file {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("cannot parse config file {path}: {reason}")]
    Malformed { path: String, reason: String },
}

/// A loaded text blob is not a usable feature collection.
#[derive(Error, Debug)]
pub enum InputFormatError {
    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("expected a FeatureCollection, got a {0}")]
    NotFeatureCollection(&'static str),
}

/// A single geometry could not be processed. Always recovered by the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("degenerate ring with {0} coordinates")]
    DegenerateRing(usize),

    #[error("geometry contains non-finite coordinates")]
    NonFinite,

    #[error("{0} failed inside the geometry library")]
    OperationPanicked(&'static str),

    #[error("{op} produced an invalid result: {reason}")]
    InvalidResult { op: &'static str, reason: String },
}
