pub mod config;
pub mod constants;
pub mod coverage;
pub mod error;
pub mod export;
pub mod grid;
pub mod planner;
pub mod tower;
pub mod visualization;

pub use config::{Config, ConfigOverrides, ExportFormat};
pub use coverage::{CoverageMap, CoverageSummary, verify_plan};
pub use error::{CoverageError, Result};
pub use export::{PlanReport, export_report_json, export_towers_csv};
pub use grid::{CellId, CellState, OccupancyGrid, generate, generate_with_blocks};
pub use planner::{CoveragePlanner, plan};
pub use tower::Tower;
pub use visualization::{RenderOptions, render_ascii, render_image, render_png, save_plan_figure};
