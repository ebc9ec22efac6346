pub mod feature;
pub mod output;

pub use feature::{LineFeature, LineGeometry, SeedKind, SeedPoint};
pub use output::{OutputFeature, Provenance};
