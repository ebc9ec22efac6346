use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;

use harborland::config::{FileConfig, Strategy};
use harborland::input::{load_line_sources, load_water_sources};
use harborland::output::to_geojson_string;
use harborland::{Engine, OutputFeature};

/// Derive land polygons from coastline line data
///
/// Examples:
///   # New York harbor with the built-in seeds and exclusion table
///   harborland -i coastline.geojson -i counties.geojson -o land.geojson
///
///   # Carve the result against a water mask
///   harborland -i coastline.geojson --water-mask water.geojson
///
///   # Another region, raster path only
///   harborland -i coast.geojson --bbox=-71.2,42.2,-70.9,42.45 --strategy raster-only
///
///   # Use a config file
///   harborland --config my-harbor.toml
#[derive(Parser, Debug)]
#[command(name = "harborland")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches harborland.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// GeoJSON file with coastline lines (repeatable)
    #[arg(short = 'i', long = "lines")]
    lines: Vec<PathBuf>,

    /// GeoJSON file with water polygons to carve out of the land (repeatable)
    #[arg(long = "water-mask")]
    water_masks: Vec<PathBuf>,

    /// Output GeoJSON file path (defaults to land.geojson)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Bounding box as west,south,east,north
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    bbox: Option<Vec<f64>>,

    /// Grid columns
    #[arg(long)]
    grid_cols: Option<usize>,

    /// Grid rows
    #[arg(long)]
    grid_rows: Option<usize>,

    /// Minimum land polygon area in square meters
    #[arg(long)]
    min_area: Option<f64>,

    /// Line simplification tolerance in degrees (0 = off)
    #[arg(long)]
    simplify: Option<f64>,

    /// Cells the land mask may grow into the drawn coastline (0-50)
    #[arg(long)]
    coast_margin: Option<u32>,

    /// How land polygons are produced
    #[arg(long, value_enum)]
    strategy: Option<Strategy>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let total_start = Instant::now();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    let mut file_config = if let Some(ref config_path) = args.config {
        if !config_path.exists() {
            bail!("Config file not found: {:?}", config_path);
        }
        FileConfig::from_path(config_path).context("Failed to load config file")?
    } else {
        FileConfig::load().unwrap_or_default()
    };

    let verbose = args.verbose || file_config.verbose;

    apply_overrides(&mut file_config, &args)?;
    let engine_config = file_config
        .to_engine_config()
        .context("Invalid configuration")?;

    let line_paths = if args.lines.is_empty() {
        file_config.lines.clone()
    } else {
        args.lines.clone()
    };
    let mask_paths = if args.water_masks.is_empty() {
        file_config.water_masks.clone()
    } else {
        args.water_masks.clone()
    };
    if line_paths.is_empty() {
        bail!("No coastline input given, use --lines/-i or set `lines` in the config file");
    }

    let output_path = args
        .output
        .clone()
        .or_else(|| file_config.output.clone())
        .unwrap_or_else(|| PathBuf::from("land.geojson"));

    println!("harborland - Coastline to Land Polygons");
    println!("=======================================");
    println!();

    if verbose {
        let bbox = engine_config.bbox;
        println!("Configuration:");
        println!(
            "  Bbox: [{}, {}, {}, {}]",
            bbox.west, bbox.south, bbox.east, bbox.north
        );
        println!(
            "  Grid: {}x{} cells",
            engine_config.grid_cols, engine_config.grid_rows
        );
        println!("  Min area: {} m2", engine_config.min_area_m2);
        println!("  Strategy: {}", engine_config.strategy.as_str());
        println!("  Coast margin: {} cells", engine_config.coast_margin_cells);
        println!("  Seeds: {}", engine_config.seeds.len());
        println!("  Output: {}", output_path.display());
        println!();
    }

    let engine = Engine::new(engine_config).context("Invalid configuration")?;

    let spinner = create_spinner("Reading coastline inputs...");
    let start = Instant::now();
    let line_texts = read_inputs(&line_paths)?;
    let lines = load_line_sources(&as_sources(&line_texts));
    if lines.items.is_empty() && !lines.invalid.is_empty() {
        bail!("None of the {} coastline inputs could be parsed", line_paths.len());
    }
    spinner.finish_with_message(format!(
        "Loaded {} line features from {} files, {} invalid [{:.1}s]",
        lines.items.len(),
        line_paths.len(),
        lines.invalid.len(),
        start.elapsed().as_secs_f32()
    ));

    let water = if mask_paths.is_empty() {
        Vec::new()
    } else {
        let spinner = create_spinner("Reading water masks...");
        let start = Instant::now();
        let mask_texts = read_inputs(&mask_paths)?;
        let masks = load_water_sources(&as_sources(&mask_texts));
        spinner.finish_with_message(format!(
            "Loaded {} water polygons, {} invalid files [{:.1}s]",
            masks.items.len(),
            masks.invalid.len(),
            start.elapsed().as_secs_f32()
        ));
        masks.items
    };

    let spinner = create_spinner("Deriving land polygons...");
    let start = Instant::now();
    let output = engine.run(&lines.items, &water);
    spinner.finish_with_message(format!(
        "Derived {} land features [{:.1}s]",
        output.features.len(),
        start.elapsed().as_secs_f32()
    ));

    let spinner = create_spinner("Writing GeoJSON...");
    let start = Instant::now();
    write_output(&output_path, &output.features)?;
    spinner.finish_with_message(format!(
        "Wrote {} [{:.1}s]",
        output_path.display(),
        start.elapsed().as_secs_f32()
    ));

    println!();
    println!("{}", output.report);
    println!();
    println!(
        "Done! Total time: {:.1}s",
        total_start.elapsed().as_secs_f32()
    );

    Ok(())
}

fn apply_overrides(file_config: &mut FileConfig, args: &Args) -> Result<()> {
    if let Some(ref bbox) = args.bbox {
        let &[west, south, east, north] = bbox.as_slice() else {
            bail!("--bbox takes exactly four values: west,south,east,north");
        };
        file_config.bbox = [west, south, east, north];
    }
    if let Some(cols) = args.grid_cols {
        file_config.grid_cols = cols;
    }
    if let Some(rows) = args.grid_rows {
        file_config.grid_rows = rows;
    }
    if let Some(min_area) = args.min_area {
        file_config.min_area_m2 = min_area;
    }
    if let Some(tolerance) = args.simplify {
        file_config.simplify_tolerance = tolerance;
    }
    if let Some(margin) = args.coast_margin {
        file_config.coast_margin_cells = margin;
    }
    if let Some(strategy) = args.strategy {
        file_config.strategy = strategy;
    }
    Ok(())
}

fn read_inputs(paths: &[PathBuf]) -> Result<Vec<(String, String)>> {
    paths
        .iter()
        .map(|path| {
            let text = std::fs::read_to_string(path)
                .context(format!("Failed to read input file: {:?}", path))?;
            Ok((path.display().to_string(), text))
        })
        .collect()
}

fn as_sources(texts: &[(String, String)]) -> Vec<(&str, &str)> {
    texts
        .iter()
        .map(|(name, text)| (name.as_str(), text.as_str()))
        .collect()
}

fn write_output(path: &Path, features: &[OutputFeature]) -> Result<()> {
    let json = to_geojson_string(features).context("Failed to serialize land features")?;
    std::fs::write(path, json).context(format!("Failed to write output file: {:?}", path))?;
    Ok(())
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
