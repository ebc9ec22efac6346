use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::classify::FeatureClassifier;
use crate::domain::SeedPoint;
use crate::error::ConfigError;
use crate::geometry::{BoundingBox, GridMapper};
use crate::raster::Edge;

/// Upper bound for `coast_margin_cells`
pub const MAX_COAST_MARGIN_CELLS: u32 = 50;

/// Default extents and seeds describe the New York harbor.
///
/// Bounding box: south 40.48, north 40.92, west -74.26, east -73.75.
pub mod defaults {
    pub const BBOX: [f64; 4] = [-74.26, 40.48, -73.75, 40.92];
    pub const GRID_COLS: usize = 220;
    pub const GRID_ROWS: usize = 190;
    pub const MIN_GRID_CELLS: usize = 10;
    pub const MIN_AREA_M2: f64 = 8000.0;
    pub const SIMPLIFY_TOLERANCE: f64 = 0.0;
    pub const COAST_MARGIN_CELLS: u32 = 1;
    pub const SEED_HIT_THRESHOLD: usize = 3;
    pub const CHIP_COLS: usize = 18;
    pub const CHIP_ROWS: usize = 14;

    /// Manhattan, Brooklyn, Staten Island, Jersey City, Bayonne
    pub const LAND_SEEDS: [[f64; 2]; 5] = [
        [-73.968, 40.780],
        [-73.950, 40.650],
        [-74.150, 40.580],
        [-74.070, 40.720],
        [-74.115, 40.668],
    ];

    /// Upper Bay, Lower Bay, Hudson River, Jamaica Bay
    pub const WATER_SEEDS: [[f64; 2]; 4] = [
        [-74.045, 40.665],
        [-74.020, 40.530],
        [-74.013, 40.760],
        [-73.830, 40.610],
    ];
}

/// How land polygons are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Polygonize the coastline network, fall back to the raster path
    VectorFirst,
    /// Always use the raster path
    RasterOnly,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::VectorFirst => "vector-first",
            Strategy::RasterOnly => "raster-only",
        }
    }
}

/// Validated, immutable parameters for one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub bbox: BoundingBox,
    pub grid_cols: usize,
    pub grid_rows: usize,
    pub min_grid_cells: usize,
    pub min_area_m2: f64,
    /// Line simplification tolerance in degrees; 0 disables it
    pub simplify_tolerance: f64,
    pub coast_margin_cells: u32,
    pub strategy: Strategy,
    pub seed_hit_threshold: usize,
    pub chip_cols: usize,
    pub chip_rows: usize,
    pub seeds: Vec<SeedPoint>,
    /// Grid edges that open onto water and seed the water flood fill
    pub open_water_edges: Vec<Edge>,
    pub classifier: FeatureClassifier,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let bbox = BoundingBox {
            west: defaults::BBOX[0],
            south: defaults::BBOX[1],
            east: defaults::BBOX[2],
            north: defaults::BBOX[3],
        };
        Self {
            bbox,
            grid_cols: defaults::GRID_COLS,
            grid_rows: defaults::GRID_ROWS,
            min_grid_cells: defaults::MIN_GRID_CELLS,
            min_area_m2: defaults::MIN_AREA_M2,
            simplify_tolerance: defaults::SIMPLIFY_TOLERANCE,
            coast_margin_cells: defaults::COAST_MARGIN_CELLS,
            strategy: Strategy::VectorFirst,
            seed_hit_threshold: defaults::SEED_HIT_THRESHOLD,
            chip_cols: defaults::CHIP_COLS,
            chip_rows: defaults::CHIP_ROWS,
            seeds: seeds_from(&defaults::LAND_SEEDS, &defaults::WATER_SEEDS),
            open_water_edges: Edge::ALL.to_vec(),
            classifier: FeatureClassifier::default(),
        }
    }
}

impl EngineConfig {
    /// Check every threshold; the first problem found is returned
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bbox = BoundingBox::new(
            self.bbox.west,
            self.bbox.south,
            self.bbox.east,
            self.bbox.north,
        )?;
        GridMapper::new(bbox, self.grid_cols, self.grid_rows, self.min_grid_cells)?;

        for (name, value) in [
            ("min_area_m2", self.min_area_m2),
            ("simplify_tolerance", self.simplify_tolerance),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(ConfigError::Negative { name, value });
            }
        }
        if self.coast_margin_cells > MAX_COAST_MARGIN_CELLS {
            return Err(ConfigError::CoastMargin(self.coast_margin_cells));
        }
        if self.chip_cols == 0 || self.chip_rows == 0 {
            return Err(ConfigError::ChipSize {
                cols: self.chip_cols,
                rows: self.chip_rows,
            });
        }
        Ok(())
    }

    pub fn land_seed_count(&self) -> usize {
        self.seeds
            .iter()
            .filter(|s| s.kind == crate::domain::SeedKind::Land)
            .count()
    }
}

fn seeds_from(land: &[[f64; 2]], water: &[[f64; 2]]) -> Vec<SeedPoint> {
    land.iter()
        .map(|&[lon, lat]| SeedPoint::land(lon, lat))
        .chain(water.iter().map(|&[lon, lat]| SeedPoint::water(lon, lat)))
        .collect()
}

fn default_bbox() -> [f64; 4] {
    defaults::BBOX
}
fn default_grid_cols() -> usize {
    defaults::GRID_COLS
}
fn default_grid_rows() -> usize {
    defaults::GRID_ROWS
}
fn default_min_grid_cells() -> usize {
    defaults::MIN_GRID_CELLS
}
fn default_min_area_m2() -> f64 {
    defaults::MIN_AREA_M2
}
fn default_simplify_tolerance() -> f64 {
    defaults::SIMPLIFY_TOLERANCE
}
fn default_coast_margin_cells() -> u32 {
    defaults::COAST_MARGIN_CELLS
}
fn default_strategy() -> Strategy {
    Strategy::VectorFirst
}
fn default_seed_hit_threshold() -> usize {
    defaults::SEED_HIT_THRESHOLD
}
fn default_chip_cols() -> usize {
    defaults::CHIP_COLS
}
fn default_chip_rows() -> usize {
    defaults::CHIP_ROWS
}
fn default_land_seeds() -> Vec<[f64; 2]> {
    defaults::LAND_SEEDS.to_vec()
}
fn default_water_seeds() -> Vec<[f64; 2]> {
    defaults::WATER_SEEDS.to_vec()
}
fn default_open_water_edges() -> Vec<Edge> {
    Edge::ALL.to_vec()
}

/// Settings as written in a TOML config file
#[derive(Debug, Deserialize)]
pub struct FileConfig {
    #[serde(default = "default_bbox")]
    pub bbox: [f64; 4],
    #[serde(default = "default_grid_cols")]
    pub grid_cols: usize,
    #[serde(default = "default_grid_rows")]
    pub grid_rows: usize,
    #[serde(default = "default_min_grid_cells")]
    pub min_grid_cells: usize,
    #[serde(default = "default_min_area_m2")]
    pub min_area_m2: f64,
    #[serde(default = "default_simplify_tolerance")]
    pub simplify_tolerance: f64,
    #[serde(default = "default_coast_margin_cells")]
    pub coast_margin_cells: u32,
    #[serde(default = "default_strategy")]
    pub strategy: Strategy,
    #[serde(default = "default_seed_hit_threshold")]
    pub seed_hit_threshold: usize,
    #[serde(default = "default_chip_cols")]
    pub chip_cols: usize,
    #[serde(default = "default_chip_rows")]
    pub chip_rows: usize,
    /// `[lon, lat]` pairs
    #[serde(default = "default_land_seeds")]
    pub land_seeds: Vec<[f64; 2]>,
    #[serde(default = "default_water_seeds")]
    pub water_seeds: Vec<[f64; 2]>,
    #[serde(default = "default_open_water_edges")]
    pub open_water_edges: Vec<Edge>,
    /// Replaces the built-in exclusion table when present
    #[serde(default)]
    pub classifier: Option<FeatureClassifier>,
    #[serde(default)]
    pub lines: Vec<PathBuf>,
    #[serde(default)]
    pub water_masks: Vec<PathBuf>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub verbose: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            bbox: default_bbox(),
            grid_cols: default_grid_cols(),
            grid_rows: default_grid_rows(),
            min_grid_cells: default_min_grid_cells(),
            min_area_m2: default_min_area_m2(),
            simplify_tolerance: default_simplify_tolerance(),
            coast_margin_cells: default_coast_margin_cells(),
            strategy: default_strategy(),
            seed_hit_threshold: default_seed_hit_threshold(),
            chip_cols: default_chip_cols(),
            chip_rows: default_chip_rows(),
            land_seeds: default_land_seeds(),
            water_seeds: default_water_seeds(),
            open_water_edges: default_open_water_edges(),
            classifier: None,
            lines: Vec::new(),
            water_masks: Vec::new(),
            output: None,
            verbose: false,
        }
    }
}

impl FileConfig {
    /// Read and parse one TOML config file
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        toml::from_str(&contents).map_err(|e| ConfigError::Malformed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Load the first config file found in the standard locations
    pub fn load() -> Option<Self> {
        let config_paths = get_config_paths();

        for path in config_paths {
            if path.exists() {
                match Self::from_path(&path) {
                    Ok(config) => {
                        log::debug!("Loaded config from {:?}", path);
                        return Some(config);
                    }
                    Err(e) => {
                        log::warn!("{e}");
                    }
                }
            }
        }
        None
    }

    /// Build and validate the engine configuration
    pub fn to_engine_config(&self) -> Result<EngineConfig, ConfigError> {
        let config = EngineConfig {
            bbox: BoundingBox::from_array(self.bbox)?,
            grid_cols: self.grid_cols,
            grid_rows: self.grid_rows,
            min_grid_cells: self.min_grid_cells,
            min_area_m2: self.min_area_m2,
            simplify_tolerance: self.simplify_tolerance,
            coast_margin_cells: self.coast_margin_cells,
            strategy: self.strategy,
            seed_hit_threshold: self.seed_hit_threshold,
            chip_cols: self.chip_cols,
            chip_rows: self.chip_rows,
            seeds: seeds_from(&self.land_seeds, &self.water_seeds),
            open_water_edges: self.open_water_edges.clone(),
            classifier: self.classifier.clone().unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("harborland.toml"));
    paths.push(PathBuf::from(".harborland.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("harborland").join("config.toml"));
        paths.push(config_dir.join("harborland.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".harborland.toml"));
        paths.push(home.join(".config").join("harborland").join("config.toml"));
    }

    paths
}
