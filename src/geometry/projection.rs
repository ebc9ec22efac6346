/// Meters per degree of latitude
pub const METERS_PER_DEG_LAT: f64 = 110_540.0;
/// Meters per degree of longitude at the equator
pub const METERS_PER_DEG_LON: f64 = 111_320.0;

/// Local equirectangular projection from WGS84 to meters
///
/// - x = (lon - origin_lon) * cos(ref_lat) * 111320
/// - y = (lat - origin_lat) * 110540
///
/// Only valid over a few tenths of a degree. Do not use it for
/// continental-scale areas.
#[derive(Debug, Clone)]
pub struct Projector {
    origin_lon: f64,
    origin_lat: f64,
    meters_per_deg_lon: f64,
}

impl Projector {
    /// Create a projector with its scale taken at `ref_lat`
    ///
    /// # Arguments
    /// * `origin` - (lon, lat) mapped to (0, 0)
    /// * `ref_lat` - latitude whose cosine scales longitude
    pub fn new(origin: (f64, f64), ref_lat: f64) -> Self {
        let (lon, lat) = origin;
        Self {
            origin_lon: lon,
            origin_lat: lat,
            meters_per_deg_lon: METERS_PER_DEG_LON * ref_lat.to_radians().cos(),
        }
    }

    /// Project a lon/lat point to local meters
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let x = (lon - self.origin_lon) * self.meters_per_deg_lon;
        let y = (lat - self.origin_lat) * METERS_PER_DEG_LAT;
        (x, y)
    }
}
