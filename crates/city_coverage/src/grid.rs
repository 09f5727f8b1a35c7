use crate::{
    config::GridConfig,
    constants::{MAP_BLOCKED, MAP_FREE},
    error::{CoverageError, Result},
};

use itertools::iproduct;
use log::info;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::index};
use std::{fmt, fs};

/// State of a single city cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellState {
    #[default]
    Free,
    Blocked,
}

/// Cell position (row, col)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId {
    pub row: usize,
    pub col: usize,
}

impl CellId {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Fixed-size occupancy grid, stored row-major.
///
/// The grid is immutable once built: every constructor validates the shape and
/// no method hands out mutable access to the cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    rows: usize,
    cols: usize,
    cells: Vec<CellState>, // cells[row * cols + col]
}

impl OccupancyGrid {
    /// All-free grid of the given size.
    pub fn new_free(rows: usize, cols: usize) -> Result<Self> {
        let len = checked_area(rows, cols)?;
        Ok(Self {
            rows,
            cols,
            cells: vec![CellState::Free; len],
        })
    }

    /// Builds a grid from nested rows, rejecting empty and ragged input.
    pub fn from_rows(rows: Vec<Vec<CellState>>) -> Result<Self> {
        let n = rows.len();
        let m = rows.first().map_or(0, Vec::len);
        let len = checked_area(n, m)?;

        let mut cells = Vec::with_capacity(len);
        for (row, cols) in rows.into_iter().enumerate() {
            if cols.len() != m {
                return Err(CoverageError::RaggedGrid {
                    row,
                    expected: m,
                    got: cols.len(),
                });
            }
            cells.extend(cols);
        }

        Ok(Self {
            rows: n,
            cols: m,
            cells,
        })
    }

    /// Parses a text map: `#` is blocked, `.` is free, blank lines are skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let mut rows = Vec::new();
        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let row = line
                .chars()
                .map(|ch| match ch {
                    MAP_FREE => Ok(CellState::Free),
                    MAP_BLOCKED => Ok(CellState::Blocked),
                    _ => Err(CoverageError::InvalidGridMap {
                        line: line_no + 1,
                        ch,
                    }),
                })
                .collect::<Result<Vec<_>>>()?;
            rows.push(row);
        }
        Self::from_rows(rows)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells (rows * cols)
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false: a grid has at least one cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Option<CellState> {
        if self.contains(row, col) {
            Some(self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    /// Out-of-range positions are not blocked.
    pub fn is_blocked(&self, row: usize, col: usize) -> bool {
        self.get(row, col) == Some(CellState::Blocked)
    }

    pub fn is_free(&self, row: usize, col: usize) -> bool {
        self.get(row, col) == Some(CellState::Free)
    }

    /// Iterates all cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellId, CellState)> + '_ {
        iproduct!(0..self.rows, 0..self.cols)
            .map(|(row, col)| (CellId::new(row, col), self.cells[row * self.cols + col]))
    }

    pub fn blocked_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|&&s| s == CellState::Blocked)
            .count()
    }

    pub fn free_count(&self) -> usize {
        self.len() - self.blocked_count()
    }

    /// First free cell in row-major order
    pub fn first_free(&self) -> Option<CellId> {
        self.iter()
            .find(|&(_, state)| state == CellState::Free)
            .map(|(id, _)| id)
    }
}

impl fmt::Display for OccupancyGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.rows {
            for col in 0..self.cols {
                let ch = match self.cells[row * self.cols + col] {
                    CellState::Free => MAP_FREE,
                    CellState::Blocked => MAP_BLOCKED,
                };
                write!(f, "{}", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn checked_area(rows: usize, cols: usize) -> Result<usize> {
    if rows == 0 || cols == 0 {
        return Err(CoverageError::InvalidDimensions { rows, cols });
    }
    rows.checked_mul(cols)
        .ok_or(CoverageError::InvalidDimensions { rows, cols })
}

/// Number of blocked cells for a coverage fraction: floor(rows * cols * fraction).
pub fn blocked_cell_count(rows: usize, cols: usize, block_coverage: f64) -> Result<usize> {
    let area = checked_area(rows, cols)?;
    if !(0.0..=1.0).contains(&block_coverage) {
        return Err(CoverageError::InvalidCoverage(block_coverage));
    }
    Ok((area as f64 * block_coverage).floor() as usize)
}

/// Generates a grid with `floor(rows * cols * block_coverage)` blocked cells
/// sampled uniformly without replacement.
pub fn generate<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    block_coverage: f64,
    rng: &mut R,
) -> Result<OccupancyGrid> {
    let count = blocked_cell_count(rows, cols, block_coverage)?;
    generate_with_blocks(rows, cols, count, rng)
}

/// Generates a grid with exactly `count` distinct blocked cells.
pub fn generate_with_blocks<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    count: usize,
    rng: &mut R,
) -> Result<OccupancyGrid> {
    let mut grid = OccupancyGrid::new_free(rows, cols)?;
    let available = grid.len();
    if count > available {
        return Err(CoverageError::BlockExhaustion {
            requested: count,
            available,
        });
    }

    // linear position p maps to (p / cols, p % cols)
    for position in index::sample(rng, available, count) {
        grid.cells[position] = CellState::Blocked;
    }

    info!(
        "Generated {}x{} grid with {} blocked cells",
        rows, cols, count
    );
    Ok(grid)
}

/// Builds the run grid: parsed from `map_file` when set, otherwise generated
/// from a seeded RNG. Returns the seed used, if any.
pub fn from_config(config: &GridConfig) -> Result<(OccupancyGrid, Option<u64>)> {
    if let Some(path) = &config.map_file {
        let text = fs::read_to_string(path)?;
        let grid = OccupancyGrid::parse(&text)?;
        info!(
            "Loaded {}x{} grid from {}",
            grid.rows(),
            grid.cols(),
            path.display()
        );
        return Ok((grid, None));
    }

    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    info!("Grid seed: {}", seed);
    let mut rng = StdRng::seed_from_u64(seed);
    let grid = generate(config.rows, config.cols, config.block_coverage, &mut rng)?;
    Ok((grid, Some(seed)))
}
