use crate::{
    error::{CoverageError, Result},
    grid::{CellState, OccupancyGrid},
    tower::Tower,
};

use log::{debug, info};

/// Greedy raster-scan tower placement with a fixed radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoveragePlanner {
    radius: u32,
}

impl CoveragePlanner {
    /// Rejects negative radii. Radius 0 is allowed and yields one tower per free cell.
    pub fn new(radius: i64) -> Result<Self> {
        let radius = u32::try_from(radius).map_err(|_| CoverageError::InvalidRadius(radius))?;
        Ok(Self { radius })
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Scans cells row by row, left to right, and places a tower on every free
    /// cell not yet covered by a tower placed earlier in the scan.
    ///
    /// Towers are appended as soon as they are placed, so each one takes part
    /// in the coverage test of every later cell. Placed towers are never
    /// removed.
    pub fn plan(&self, grid: &OccupancyGrid) -> Vec<Tower> {
        let mut towers: Vec<Tower> = Vec::new();

        for (cell, state) in grid.iter() {
            if state == CellState::Blocked {
                continue;
            }
            if towers.iter().any(|t| t.covers(cell.row, cell.col)) {
                continue;
            }
            let tower = Tower::new(cell.row, cell.col, self.radius);
            debug!("Placed tower #{} at {}", towers.len(), tower);
            towers.push(tower);
        }

        info!(
            "Planned {} towers (radius {}) over {}x{} grid",
            towers.len(),
            self.radius,
            grid.rows(),
            grid.cols()
        );
        towers
    }
}

/// Computes the tower set for `grid` with the given `radius`.
pub fn plan(grid: &OccupancyGrid, radius: i64) -> Result<Vec<Tower>> {
    Ok(CoveragePlanner::new(radius)?.plan(grid))
}
