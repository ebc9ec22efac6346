use geo::MultiPolygon;
use std::fmt;

/// Which stage produced an output polygon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provenance {
    /// Built from closed coastline rings
    Vector,
    /// Raster path chosen up front
    Raster,
    /// Raster path after the vector polygonizer produced nothing usable
    RasterFallback,
    /// Clipped to the bbox only; every relevant water carve failed
    BboxOnly,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Vector => "vector",
            Provenance::Raster => "raster",
            Provenance::RasterFallback => "raster-fallback",
            Provenance::BboxOnly => "bbox-only",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One emitted land shape and where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFeature {
    pub geometry: MultiPolygon<f64>,
    pub source: Provenance,
    pub area_m2: f64,
}
