//! Occupancy values and shell membership.
//!
//! Every drawn cell carries a scalar `val`: 1.0 on the model shell,
//! decaying toward zero for interior cells. The voxelizer seeds these
//! values; edits that add or remove cells refresh them locally.

use crate::grid::coord::CellCoord;
use crate::grid::store::BrickGrid;

/// How much the occupancy value decays per step away from the shell.
const VALUE_DECAY: f32 = 0.01;

/// Recompute the occupancy value of one cell from its six neighbors.
///
/// A cell with any absent or empty neighbor sits on the shell (val 1.0);
/// otherwise it inherits the best neighbor value minus one decay step.
pub fn update_value(grid: &mut BrickGrid, coord: CellCoord) {
    let mut max_neighbor = 0.0f32;
    let mut on_shell = false;
    for n in coord.neighbors() {
        match grid.get(n) {
            None => on_shell = true,
            Some(cell) if !cell.draw && cell.val == 0.0 => on_shell = true,
            Some(cell) => max_neighbor = max_neighbor.max(cell.val),
        }
    }
    let val = if on_shell {
        1.0
    } else {
        (max_neighbor - VALUE_DECAY).max(VALUE_DECAY)
    };
    if let Some(cell) = grid.get_mut(coord) {
        cell.val = val;
    }
}

/// Check whether any cell of the footprint anchored at `key` lies within
/// `shell_depth` layers of the model shell.
pub fn is_on_shell(grid: &BrickGrid, key: CellCoord, shell_depth: u32) -> bool {
    let Ok(size) = grid.anchor_size(key) else {
        return false;
    };
    let threshold = 1.0 - (shell_depth.saturating_sub(1)) as f32 / 100.0;
    grid.keys_in_footprint(key, size)
        .iter()
        .filter_map(|k| grid.get(*k))
        .any(|cell| cell.val >= threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brick::cell::BrickCell;
    use crate::brick::types::BrickType;
    use crate::grid::store::BrickLayout;

    fn plate(val: f32) -> BrickCell {
        let mut cell = BrickCell::elemental(1, BrickType::Plate, None);
        cell.val = val;
        cell
    }

    #[test]
    fn test_exposed_cell_is_shell() {
        let mut grid = BrickGrid::new(BrickLayout::BricksAndPlates);
        let coord = CellCoord::new(0, 0, 0);
        grid.set(coord, plate(0.0));
        update_value(&mut grid, coord);
        assert_eq!(grid.get(coord).unwrap().val, 1.0);
    }

    #[test]
    fn test_enclosed_cell_decays() {
        let mut grid = BrickGrid::new(BrickLayout::BricksAndPlates);
        let center = CellCoord::new(0, 0, 0);
        grid.set(center, plate(0.0));
        for n in center.neighbors() {
            grid.set(n, plate(1.0));
        }
        update_value(&mut grid, center);
        let val = grid.get(center).unwrap().val;
        assert!(val < 1.0 && val > 0.9);
    }

    #[test]
    fn test_is_on_shell() {
        let mut grid = BrickGrid::new(BrickLayout::BricksAndPlates);
        let coord = CellCoord::new(0, 0, 0);
        grid.set(coord, plate(1.0));
        assert!(is_on_shell(&grid, coord, 1));

        grid.get_mut(coord).unwrap().val = 0.5;
        assert!(!is_on_shell(&grid, coord, 1));
        // Deeper shells admit lower values
        assert!(is_on_shell(&grid, coord, 51));
    }
}
