use geo::{LineString, Simplify};

/// Ramer-Douglas-Peucker simplification of one line part.
///
/// `tolerance` is in degrees; 0 or less returns the part unchanged. Closed
/// parts never collapse below a valid ring (4 coordinates).
pub fn simplify_part(part: &LineString<f64>, tolerance: f64) -> LineString<f64> {
    if tolerance <= 0.0 || part.0.len() < 3 {
        return part.clone();
    }

    let simplified = part.simplify(&tolerance);

    if part.is_closed() && simplified.0.len() < 4 {
        return part.clone();
    }
    if simplified.0.len() < 2 {
        return part.clone();
    }

    simplified
}
