use serde::{Deserialize, Serialize};
use std::fmt;

use crate::grid::CellId;

/// A placed tower: grid position and coverage radius (cell units).
///
/// Fields are private so a tower cannot be moved or resized after placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tower {
    row: usize,
    col: usize,
    radius: u32,
}

impl Tower {
    pub fn new(row: usize, col: usize, radius: u32) -> Self {
        Self { row, col, radius }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn position(&self) -> CellId {
        CellId::new(self.row, self.col)
    }

    /// `(row - tr)^2 + (col - tc)^2 <= r^2`, evaluated in exact integer arithmetic.
    #[inline]
    pub fn covers(&self, row: usize, col: usize) -> bool {
        let dr = row.abs_diff(self.row) as u128;
        let dc = col.abs_diff(self.col) as u128;
        let r = self.radius as u128;
        dr * dr + dc * dc <= r * r
    }

    /// Inclusive bounding box of the coverage disk clipped to `rows x cols`.
    pub fn bounds(&self, rows: usize, cols: usize) -> (CellId, CellId) {
        let r = self.radius as usize;
        let top_left = CellId::new(self.row.saturating_sub(r), self.col.saturating_sub(r));
        let bottom_right = CellId::new(
            self.row.saturating_add(r).min(rows.saturating_sub(1)),
            self.col.saturating_add(r).min(cols.saturating_sub(1)),
        );
        (top_left, bottom_right)
    }
}

impl fmt::Display for Tower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, r={})", self.row, self.col, self.radius)
    }
}
