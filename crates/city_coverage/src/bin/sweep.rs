use anyhow::{Result, bail};
use city_coverage::{
    Config, ConfigOverrides, CoverageMap, CoveragePlanner, constants::DEFAULT_CONFIG_PATH, grid,
};
use clap::Parser;
use itertools::Itertools;
use log::{info, warn};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Compare tower counts over a range of radii on one grid", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Smallest radius to plan with
    #[arg(long, default_value_t = 0)]
    min_radius: i64,

    /// Largest radius to plan with
    #[arg(long, default_value_t = 6)]
    max_radius: i64,

    /// RNG seed for grid generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Text map to plan on instead of a generated grid
    #[arg(short, long)]
    map: Option<PathBuf>,
}

fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
    let args = Args::parse();

    if args.min_radius > args.max_radius {
        bail!(
            "min-radius ({}) must not exceed max-radius ({})",
            args.min_radius,
            args.max_radius
        );
    }

    let mut config = Config::load_or_default(&args.config)?;
    config.apply_overrides(&ConfigOverrides {
        seed: args.seed,
        map_file: args.map.clone(),
        ..Default::default()
    });
    config.validate()?;

    let (city, seed) = grid::from_config(&config.grid)?;
    info!("=== Radius Sweep ===");
    info!(
        "Grid: {}x{} ({} free cells){}",
        city.rows(),
        city.cols(),
        city.free_count(),
        seed.map(|s| format!(", seed {s}")).unwrap_or_default()
    );

    let mut counts = Vec::new();
    for radius in args.min_radius..=args.max_radius {
        let towers = CoveragePlanner::new(radius)?.plan(&city);
        let summary = CoverageMap::compute(&city, &towers).summary(&city, &towers);
        info!(
            "radius {:>3}: {:>5} towers, {:>5} blocked cells under coverage",
            radius,
            towers.len(),
            summary.covered_blocked_cells
        );
        counts.push((radius, towers.len()));
    }

    // the greedy scan does not guarantee fewer towers for a larger radius
    for ((r0, n0), (r1, n1)) in counts.iter().tuple_windows() {
        if n1 > n0 {
            warn!(
                "radius {} needs more towers than radius {} ({} > {})",
                r1, r0, n1, n0
            );
        }
    }

    Ok(())
}
