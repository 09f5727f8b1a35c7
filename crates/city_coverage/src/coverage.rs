use crate::{
    error::{CoverageError, Result},
    grid::{CellId, CellState, OccupancyGrid},
    tower::Tower,
};

use itertools::iproduct;
use serde::Serialize;

/// Number of towers covering each cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageMap {
    rows: usize,
    cols: usize,
    counts: Vec<u32>, // counts[row * cols + col]
}

impl CoverageMap {
    pub fn compute(grid: &OccupancyGrid, towers: &[Tower]) -> Self {
        let (rows, cols) = (grid.rows(), grid.cols());
        let mut counts = vec![0u32; rows * cols];

        for tower in towers {
            // only the clipped bounding box can be inside the disk
            let (tl, br) = tower.bounds(rows, cols);
            for (row, col) in iproduct!(tl.row..=br.row, tl.col..=br.col) {
                if tower.covers(row, col) {
                    counts[row * cols + col] += 1;
                }
            }
        }

        Self { rows, cols, counts }
    }

    pub fn count(&self, row: usize, col: usize) -> u32 {
        if row < self.rows && col < self.cols {
            self.counts[row * self.cols + col]
        } else {
            0
        }
    }

    pub fn is_covered(&self, row: usize, col: usize) -> bool {
        self.count(row, col) > 0
    }

    /// Free cells no tower reaches, in row-major order
    pub fn uncovered_free_cells(&self, grid: &OccupancyGrid) -> Vec<CellId> {
        grid.iter()
            .filter(|&(id, state)| state == CellState::Free && !self.is_covered(id.row, id.col))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn summary(&self, grid: &OccupancyGrid, towers: &[Tower]) -> CoverageSummary {
        let mut summary = CoverageSummary {
            rows: grid.rows(),
            cols: grid.cols(),
            towers: towers.len(),
            ..Default::default()
        };
        for (id, state) in grid.iter() {
            let covered = self.is_covered(id.row, id.col);
            match state {
                CellState::Free => {
                    summary.free_cells += 1;
                    if covered {
                        summary.covered_free_cells += 1;
                    }
                }
                CellState::Blocked => {
                    summary.blocked_cells += 1;
                    if covered {
                        summary.covered_blocked_cells += 1;
                    }
                }
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoverageSummary {
    pub rows: usize,
    pub cols: usize,
    pub free_cells: usize,
    pub blocked_cells: usize,
    pub towers: usize,
    pub covered_free_cells: usize,
    pub covered_blocked_cells: usize,
}

impl CoverageSummary {
    /// Covered share of free cells; 1.0 when there is nothing to cover.
    pub fn coverage_ratio(&self) -> f64 {
        if self.free_cells == 0 {
            1.0
        } else {
            self.covered_free_cells as f64 / self.free_cells as f64
        }
    }
}

/// Checks a tower set against `grid`: every free cell covered, no tower on a
/// blocked cell, no tower on a cell an earlier tower already covers.
pub fn verify_plan(grid: &OccupancyGrid, towers: &[Tower]) -> Result<()> {
    for (i, tower) in towers.iter().enumerate() {
        let (row, col) = (tower.row(), tower.col());
        match grid.get(row, col) {
            None => {
                return Err(CoverageError::InvariantViolation(format!(
                    "tower {} lies outside the {}x{} grid",
                    tower,
                    grid.rows(),
                    grid.cols()
                )));
            }
            Some(CellState::Blocked) => {
                return Err(CoverageError::InvariantViolation(format!(
                    "tower {} is placed on a blocked cell",
                    tower
                )));
            }
            Some(CellState::Free) => {}
        }
        if let Some(earlier) = towers[..i].iter().find(|t| t.covers(row, col)) {
            return Err(CoverageError::InvariantViolation(format!(
                "tower {} is placed on a cell already covered by {}",
                tower, earlier
            )));
        }
    }

    let map = CoverageMap::compute(grid, towers);
    if let Some(cell) = map.uncovered_free_cells(grid).first() {
        return Err(CoverageError::InvariantViolation(format!(
            "free cell ({}, {}) is not covered",
            cell.row, cell.col
        )));
    }
    Ok(())
}
