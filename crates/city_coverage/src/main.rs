use anyhow::Result;
use clap::Parser;
use log::{debug, info};
use std::path::{Path, PathBuf};

use city_coverage::{
    Config, ConfigOverrides, CoverageMap, CoveragePlanner, ExportFormat, PlanReport,
    constants::DEFAULT_CONFIG_PATH, export_report_json, export_towers_csv, grid, render_ascii,
    save_plan_figure, verify_plan,
};

#[derive(Parser)]
#[command(author, version, about = "Place coverage towers over a synthetic city grid", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Number of grid rows
    #[arg(long)]
    rows: Option<usize>,

    /// Number of grid columns
    #[arg(long)]
    cols: Option<usize>,

    /// Share of blocked cells, within [0, 1]
    #[arg(long)]
    coverage: Option<f64>,

    /// Tower coverage radius in cells
    #[arg(short, long, allow_negative_numbers = true)]
    radius: Option<i64>,

    /// RNG seed for grid generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Text map to plan on instead of a generated grid ('#' blocked, '.' free)
    #[arg(short, long)]
    map: Option<PathBuf>,

    /// Output directory for figures and exports
    #[arg(short, long)]
    output_dir: Option<String>,

    /// Skip the PNG figure
    #[arg(long)]
    no_render: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            rows: self.rows,
            cols: self.cols,
            block_coverage: self.coverage,
            seed: self.seed,
            map_file: self.map.clone(),
            radius: self.radius,
            output_dir: self.output_dir.clone(),
            no_render: self.no_render,
        }
    }
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = Config::load_or_default(&args.config)?;
    config.apply_env()?;
    config.apply_overrides(&args.overrides());
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    // Initialize logger - defaults to RUST_LOG if set, otherwise INFO
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let args = Args::parse();
    let config = load_config(&args)?;
    debug!("{:#?}", config);

    let (city, seed) = grid::from_config(&config.grid)?;
    let planner = CoveragePlanner::new(config.planner.radius)?;
    let towers = planner.plan(&city);
    verify_plan(&city, &towers)?;

    let summary = CoverageMap::compute(&city, &towers).summary(&city, &towers);
    info!("=== Coverage Plan ===");
    info!("Grid: {}x{}", summary.rows, summary.cols);
    info!(
        "Free cells: {}, blocked cells: {}",
        summary.free_cells, summary.blocked_cells
    );
    info!("Radius: {}", planner.radius());
    info!("Towers: {}", towers.len());
    info!("Coverage: {:.1}%", summary.coverage_ratio() * 100.0);
    for (i, tower) in towers.iter().enumerate() {
        debug!("tower {:>3}: {}", i, tower);
    }
    info!("Map:\n{}", render_ascii(&city, &towers));

    if config.output.render {
        save_plan_figure(&city, &towers, planner.radius(), &config)?;
    }

    let output_dir = Path::new(&config.output.output_dir);
    for format in config.export_formats()? {
        let path = match format {
            ExportFormat::Csv => export_towers_csv(&towers, Some(output_dir))?,
            ExportFormat::Json => {
                let report = PlanReport {
                    generated_at: chrono::Local::now(),
                    rows: city.rows(),
                    cols: city.cols(),
                    block_coverage: config
                        .grid
                        .map_file
                        .is_none()
                        .then_some(config.grid.block_coverage),
                    seed,
                    radius: planner.radius(),
                    towers: towers.clone(),
                    summary: summary.clone(),
                };
                export_report_json(&report, Some(output_dir))?
            }
        };
        info!("{} export saved to: {}", format, path.display());
    }

    Ok(())
}
