/// Example run parameters
pub const DEFAULT_ROWS: usize = 10;
pub const DEFAULT_COLS: usize = 10;
pub const DEFAULT_BLOCK_COVERAGE: f64 = 0.3;
pub const DEFAULT_RADIUS: i64 = 3;

/// Output settings
pub const DEFAULT_OUTPUT_DIR: &str = "figs";
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const ENV_OUTPUT_DIR: &str = "CITY_COVERAGE_OUTPUT_DIR";

/// Export formats
pub const FORMAT_CSV: &str = "csv";
pub const FORMAT_JSON: &str = "json";

/// CSV header of the tower table
pub const TOWER_CSV_HEADER: [&str; 3] = ["Row", "Col", "Radius"];

/// Figure metrics (px)
pub const DEFAULT_CELL_PX: u32 = 48;
pub const MIN_CELL_PX: u32 = 8;
pub const MAX_CELL_PX: u32 = 256;
pub const MAX_IMAGE_SIDE: u32 = 8192;
pub const MARGIN: u32 = 24;
pub const LEGEND_WIDTH: u32 = 180;
pub const FONT_SIZE: f32 = 12.0;

/// Text map symbols
pub const MAP_FREE: char = '.';
pub const MAP_BLOCKED: char = '#';
pub const MAP_COVERED: char = '+';
pub const MAP_TOWER: char = 'T';

/// Fonts tried in order when no font path is configured
pub const DEFAULT_FONT_PATHS: [&str; 4] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];
