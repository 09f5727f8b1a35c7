use crate::{
    constants::{MAP_BLOCKED, MAP_COVERED, MAP_FREE, MAP_TOWER},
    coverage::CoverageMap,
    grid::{CellState, OccupancyGrid},
    tower::Tower,
};

/// Text map of a plan: `T` tower, `#` blocked, `+` covered free, `.` uncovered free.
pub fn render_ascii(grid: &OccupancyGrid, towers: &[Tower]) -> String {
    let map = CoverageMap::compute(grid, towers);
    let mut chars: Vec<char> = grid
        .iter()
        .map(|(id, state)| match state {
            CellState::Blocked => MAP_BLOCKED,
            CellState::Free if map.is_covered(id.row, id.col) => MAP_COVERED,
            CellState::Free => MAP_FREE,
        })
        .collect();

    for tower in towers {
        if grid.contains(tower.row(), tower.col()) {
            chars[tower.row() * grid.cols() + tower.col()] = MAP_TOWER;
        }
    }

    let mut out = String::with_capacity(grid.len() + grid.rows());
    for row in chars.chunks(grid.cols()) {
        out.extend(row);
        out.push('\n');
    }
    out
}
