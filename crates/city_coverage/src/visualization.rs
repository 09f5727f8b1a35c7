pub mod ascii;
pub mod colors;
mod legend;

pub use ascii::render_ascii;
pub use colors::Colors;

use crate::{
    config::Config,
    constants::{LEGEND_WIDTH, MARGIN, MAX_IMAGE_SIDE},
    coverage::CoverageMap,
    error::Result,
    export::ensure_dir,
    grid::{CellState, OccupancyGrid},
    tower::Tower,
};

use ab_glyph::{FontVec, PxScale};
use chrono::Local;
use image::{ImageBuffer, Rgb, RgbImage};
use imageproc::{
    drawing::{
        draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_polygon_mut,
        draw_text_mut,
    },
    point::Point,
    rect::Rect,
};
use log::{debug, info, warn};
use std::{
    f32::consts::TAU,
    path::{Path, PathBuf},
};

/// Upper bound on dashes per circle
const MAX_DASHES: usize = 4096;

/// Figure settings
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub cell_px: u32,
    pub font_paths: Vec<PathBuf>,
    pub legend: bool,
}

impl RenderOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            cell_px: config.output.cell_px,
            font_paths: config.output.font_paths.clone(),
            legend: true,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Drawing context: canvas plus an optional font for labels
pub struct Renderer {
    pub image: RgbImage,
    pub font: Option<FontVec>,
}

impl Renderer {
    pub fn new(width: u32, height: u32, font: Option<FontVec>) -> Self {
        Self {
            image: ImageBuffer::from_pixel(width, height, Colors::WHITE),
            font,
        }
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgb<u8>) {
        let rect = Rect::at(x, y).of_size(width.max(1), height.max(1));
        draw_filled_rect_mut(&mut self.image, rect, color);
    }

    pub fn outline_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgb<u8>) {
        let rect = Rect::at(x, y).of_size(width.max(1), height.max(1));
        draw_hollow_rect_mut(&mut self.image, rect, color);
    }

    /// Upward triangle centred on (`cx`, `cy`)
    pub fn draw_tower_marker(&mut self, cx: f32, cy: f32, size: f32) {
        if size < 2.0 {
            self.fill_rect(cx as i32, cy as i32, 1, 1, Colors::RED);
            return;
        }
        let points = [
            Point::new(cx.round() as i32, (cy - size).round() as i32),
            Point::new((cx + size).round() as i32, (cy + size * 0.8).round() as i32),
            Point::new((cx - size).round() as i32, (cy + size * 0.8).round() as i32),
        ];
        draw_polygon_mut(&mut self.image, &points, Colors::RED);
    }

    /// Dashed circle outline, clipped to the canvas. Returns the number of
    /// dashes drawn.
    pub fn draw_dotted_circle(&mut self, cx: f32, cy: f32, radius: f32) -> usize {
        if radius <= 0.0 || !self.circle_crosses_canvas(cx, cy, radius) {
            return 0;
        }
        let (max_x, max_y) = (
            self.image.width() as f32 - 1.0,
            self.image.height() as f32 - 1.0,
        );
        // ~5px per dash, every other dash drawn
        let steps = ((TAU * radius / 5.0).ceil() as usize).clamp(8, MAX_DASHES);
        let step = TAU / steps as f32;
        let mut drawn = 0;
        for i in (0..steps).step_by(2) {
            let a0 = i as f32 * step;
            let a1 = a0 + step;
            let start = (cx + radius * a0.cos(), cy + radius * a0.sin());
            let end = (cx + radius * a1.cos(), cy + radius * a1.sin());
            if start.0.max(end.0) < 0.0
                || start.0.min(end.0) > max_x
                || start.1.max(end.1) < 0.0
                || start.1.min(end.1) > max_y
            {
                continue;
            }
            draw_line_segment_mut(&mut self.image, start, end, Colors::RED);
            drawn += 1;
        }
        drawn
    }

    /// False when the outline lies wholly outside the canvas: either the
    /// circle encloses every corner or it misses the canvas rectangle.
    fn circle_crosses_canvas(&self, cx: f32, cy: f32, radius: f32) -> bool {
        let (w, h) = (self.image.width() as f64, self.image.height() as f64);
        let (cx, cy, r) = (cx as f64, cy as f64, radius as f64);

        let far_x = cx.abs().max((w - cx).abs());
        let far_y = cy.abs().max((h - cy).abs());
        if far_x * far_x + far_y * far_y <= r * r {
            return false;
        }
        let near_x = cx - cx.clamp(0.0, w);
        let near_y = cy - cy.clamp(0.0, h);
        near_x * near_x + near_y * near_y <= r * r
    }

    /// No-op without a font.
    pub fn draw_text(&mut self, x: f32, y: f32, text: &str, font_size: f32, color: Rgb<u8>) {
        if let Some(font) = &self.font {
            let scale = PxScale::from(font_size);
            draw_text_mut(
                &mut self.image,
                color,
                x as i32,
                y as i32,
                scale,
                font,
                text,
            );
        }
    }
}

/// Loads the first readable font in `paths`.
pub fn load_font(paths: &[PathBuf]) -> Option<FontVec> {
    for path in paths {
        if let Ok(bytes) = std::fs::read(path)
            && let Ok(font) = FontVec::try_from_vec(bytes)
        {
            debug!("Loaded font {}", path.display());
            return Some(font);
        }
    }
    None
}

/// Shrinks `requested` so the longer grid side fits in `MAX_IMAGE_SIDE` px.
pub fn fit_cell_px(rows: usize, cols: usize, requested: u32) -> u32 {
    let longest = rows.max(cols).max(1) as u64;
    let limit = (MAX_IMAGE_SIDE as u64 / longest).max(1) as u32;
    requested.min(limit).max(1)
}

/// Pixel layout of the grid area
#[derive(Debug, Clone, Copy)]
struct Layout {
    cell_px: u32,
}

impl Layout {
    fn cell_origin(&self, row: usize, col: usize) -> (i32, i32) {
        let x = MARGIN as i64 + col as i64 * self.cell_px as i64;
        let y = MARGIN as i64 + row as i64 * self.cell_px as i64;
        (x as i32, y as i32)
    }

    fn cell_center(&self, row: usize, col: usize) -> (f32, f32) {
        let (x, y) = self.cell_origin(row, col);
        let half = self.cell_px as f32 / 2.0;
        (x as f32 + half, y as f32 + half)
    }
}

/// Draws the plan: cells with coverage overlay, grid lines, radius circles,
/// tower markers, and the legend panel.
pub fn render_image(grid: &OccupancyGrid, towers: &[Tower], opt: &RenderOptions) -> RgbImage {
    let cell_px = fit_cell_px(grid.rows(), grid.cols(), opt.cell_px);
    if cell_px < opt.cell_px {
        warn!(
            "Cell size reduced from {}px to {}px to fit a {}x{} grid",
            opt.cell_px,
            cell_px,
            grid.rows(),
            grid.cols()
        );
    }
    let layout = Layout { cell_px };

    let grid_w = grid.cols() as u32 * cell_px;
    let grid_h = grid.rows() as u32 * cell_px;
    let (width, height) = if opt.legend {
        (
            grid_w + LEGEND_WIDTH + MARGIN * 3,
            (grid_h + MARGIN * 2).max(legend::legend_height() + MARGIN * 2),
        )
    } else {
        (grid_w + MARGIN * 2, grid_h + MARGIN * 2)
    };

    let font = if opt.legend {
        let font = load_font(&opt.font_paths);
        if font.is_none() {
            warn!("No usable font found; legend labels are skipped");
        }
        font
    } else {
        None
    };
    let mut renderer = Renderer::new(width, height, font);

    // 1. cells with coverage overlay
    let coverage = CoverageMap::compute(grid, towers);
    for (id, state) in grid.iter() {
        let (x, y) = layout.cell_origin(id.row, id.col);
        let color = colors::cell_color(
            state == CellState::Blocked,
            coverage.is_covered(id.row, id.col),
        );
        renderer.fill_rect(x, y, cell_px, cell_px, color);
        if cell_px >= 6 {
            renderer.outline_rect(x, y, cell_px, cell_px, Colors::LIGHT_GRAY);
        }
    }

    // 2. coverage circles, then markers on top
    for tower in towers {
        let (cx, cy) = layout.cell_center(tower.row(), tower.col());
        renderer.draw_dotted_circle(cx, cy, tower.radius() as f32 * cell_px as f32);
    }
    for tower in towers {
        let (cx, cy) = layout.cell_center(tower.row(), tower.col());
        renderer.draw_tower_marker(cx, cy, cell_px as f32 * 0.3);
    }

    // 3. legend
    if opt.legend {
        let radius = towers.first().map_or(0, Tower::radius);
        let legend_x = (grid_w + MARGIN * 2) as f32;
        legend::render_legend(&mut renderer, legend_x, MARGIN as f32, towers.len(), radius);
    }

    renderer.image
}

/// Renders the plan and writes it as PNG to `output_path`.
pub fn render_png<P: AsRef<Path>>(
    grid: &OccupancyGrid,
    towers: &[Tower],
    output_path: P,
    opt: &RenderOptions,
) -> Result<()> {
    let image = render_image(grid, towers, opt);
    image.save(output_path)?;
    Ok(())
}

/// Saves the figure into the configured output directory under a timestamped name.
pub fn save_plan_figure(
    grid: &OccupancyGrid,
    towers: &[Tower],
    radius: u32,
    config: &Config,
) -> Result<PathBuf> {
    let output_dir = Path::new(&config.output.output_dir);
    ensure_dir(output_dir)?;

    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let filename = format!(
        "coverage_{}x{}_r{}_{}.png",
        grid.rows(),
        grid.cols(),
        radius,
        timestamp
    );
    let output_path = output_dir.join(filename);

    render_png(grid, towers, &output_path, &RenderOptions::from_config(config))?;
    info!("Coverage figure saved to: {}", output_path.display());
    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::plan;
    use tempfile::TempDir;

    fn options(cell_px: u32) -> RenderOptions {
        RenderOptions {
            cell_px,
            font_paths: Vec::new(),
            legend: false,
        }
    }

    fn pixel(image: &RgbImage, x: i32, y: i32) -> Rgb<u8> {
        *image.get_pixel(x as u32, y as u32)
    }

    #[test]
    fn test_image_size() {
        let grid = OccupancyGrid::new_free(3, 5).unwrap();
        let image = render_image(&grid, &[], &options(20));
        assert_eq!(image.width(), 5 * 20 + MARGIN * 2);
        assert_eq!(image.height(), 3 * 20 + MARGIN * 2);

        let with_legend = RenderOptions {
            legend: true,
            ..options(20)
        };
        let image = render_image(&grid, &[], &with_legend);
        assert_eq!(image.width(), 5 * 20 + LEGEND_WIDTH + MARGIN * 3);
    }

    #[test]
    fn test_cells_are_colored_by_state_and_coverage() {
        let grid = OccupancyGrid::parse("..#..").unwrap();
        let towers = [Tower::new(0, 0, 1)];
        let layout = Layout { cell_px: 20 };
        let image = render_image(&grid, &towers, &options(20));

        // tower marker at the cell centre
        let (cx, cy) = layout.cell_center(0, 0);
        assert_eq!(pixel(&image, cx as i32, cy as i32), Colors::RED);

        // covered free cell, away from the circle and grid lines
        let (x, y) = layout.cell_origin(0, 1);
        assert_eq!(pixel(&image, x + 3, y + 3), colors::cell_color(false, true));

        // blocked, uncovered
        let (x, y) = layout.cell_origin(0, 2);
        assert_eq!(pixel(&image, x + 10, y + 3), Colors::BLACK);

        // free, uncovered
        let (x, y) = layout.cell_origin(0, 4);
        assert_eq!(pixel(&image, x + 10, y + 10), Colors::WHITE);
    }

    #[test]
    fn test_every_tower_gets_a_marker() {
        let grid = OccupancyGrid::parse("#....\n.....\n..#..\n.....").unwrap();
        let towers = plan(&grid, 1).unwrap();
        let layout = Layout { cell_px: 24 };
        let image = render_image(&grid, &towers, &options(24));
        for tower in &towers {
            let (cx, cy) = layout.cell_center(tower.row(), tower.col());
            assert_eq!(pixel(&image, cx as i32, cy as i32), Colors::RED);
        }
    }

    #[test]
    fn test_dotted_circle_skips_offscreen_outline() {
        let mut renderer = Renderer::new(100, 100, None);

        // fully inside: every dash is drawn
        assert_eq!(renderer.draw_dotted_circle(50.0, 50.0, 20.0), 13);
        // encloses the whole canvas
        assert_eq!(renderer.draw_dotted_circle(50.0, 50.0, 1.0e12), 0);
        assert_eq!(renderer.draw_dotted_circle(50.0, 50.0, 71.0), 0);
        // entirely beside the canvas
        assert_eq!(renderer.draw_dotted_circle(500.0, 50.0, 100.0), 0);
        // centred on a corner: only the quarter arc over the canvas
        let drawn = renderer.draw_dotted_circle(0.0, 0.0, 60.0);
        assert!((9..=12).contains(&drawn), "drew {drawn} dashes");
    }

    #[test]
    fn test_huge_radius_renders_without_circles() {
        let grid = OccupancyGrid::new_free(10, 10).unwrap();
        let towers = [Tower::new(0, 0, u32::MAX)];
        let layout = Layout { cell_px: 48 };
        let image = render_image(&grid, &towers, &options(48));

        let (cx, cy) = layout.cell_center(0, 0);
        assert_eq!(pixel(&image, cx as i32, cy as i32), Colors::RED);
        let (x, y) = layout.cell_origin(9, 9);
        assert_eq!(pixel(&image, x + 10, y + 10), colors::cell_color(false, true));
    }

    #[test]
    fn test_fit_cell_px() {
        assert_eq!(fit_cell_px(10, 10, 48), 48);
        assert_eq!(fit_cell_px(1, MAX_IMAGE_SIDE as usize, 48), 1);
        assert_eq!(fit_cell_px(400, 10, 48), MAX_IMAGE_SIDE / 400);
    }

    #[test]
    fn test_load_font_missing() {
        assert!(load_font(&[PathBuf::from("/nonexistent/font.ttf")]).is_none());
        assert!(load_font(&[]).is_none());
    }

    #[test]
    fn test_render_png_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plan.png");
        let grid = OccupancyGrid::new_free(4, 4).unwrap();
        let towers = plan(&grid, 2).unwrap();

        render_png(&grid, &towers, &path, &options(16)).unwrap();
        let loaded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(loaded.width(), 4 * 16 + MARGIN * 2);
    }

    #[test]
    fn test_save_plan_figure() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.output.output_dir = temp_dir.path().join("figs").to_string_lossy().to_string();
        config.output.font_paths = Vec::new();
        config.output.cell_px = 12;

        let grid = OccupancyGrid::new_free(3, 3).unwrap();
        let towers = plan(&grid, 1).unwrap();
        let path = save_plan_figure(&grid, &towers, 1, &config).unwrap();

        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("coverage_3x3_r1_"));
        assert!(name.ends_with(".png"));
        assert!(path.exists());
    }
}
