//! Face exposure recomputation.
//!
//! A footprint face is exposed when at least one of its columns has no
//! drawn cell directly across the adjacent Z-step. Exposure is purely
//! local: callers re-run it for the changed cell and its immediate
//! vertical neighbors after any create/remove/split/merge.

use serde::{Deserialize, Serialize};

use crate::core::types::Result;
use crate::grid::coord::CellCoord;
use crate::grid::store::BrickGrid;

/// Which face of a brick an exposure override targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExposureSide {
    Top,
    Bottom,
    Both,
}

/// Compute (top, bottom) exposure for the footprint anchored at `anchor`.
///
/// Fails only when `anchor` is not a footprint anchor.
pub fn brick_exposure(grid: &BrickGrid, anchor: CellCoord) -> Result<(bool, bool)> {
    let size = grid.anchor_size(anchor)?;
    let z_above = anchor.z + size.z;
    let z_below = anchor.z - grid.z_step();

    let mut top_exposed = false;
    let mut bot_exposed = false;
    for dy in 0..size.y {
        for dx in 0..size.x {
            let column = anchor.offset(dx, dy, 0);
            if !occludes(grid, CellCoord::new(column.x, column.y, z_above)) {
                top_exposed = true;
            }
            if !occludes(grid, CellCoord::new(column.x, column.y, z_below)) {
                bot_exposed = true;
            }
        }
    }
    Ok((top_exposed, bot_exposed))
}

/// Compute and store exposure on the anchor cell.
pub fn set_brick_exposure(grid: &mut BrickGrid, anchor: CellCoord) -> Result<(bool, bool)> {
    let (top, bot) = brick_exposure(grid, anchor)?;
    if let Some(cell) = grid.get_mut(anchor) {
        cell.top_exposed = Some(top);
        cell.bot_exposed = Some(bot);
    }
    Ok((top, bot))
}

/// Recompute exposure for the footprints at `loc` and its immediate
/// vertical neighbors. Returns the anchors that were updated.
pub fn verify_exposure_above_and_below(grid: &mut BrickGrid, loc: CellCoord) -> Vec<CellCoord> {
    let mut updated = Vec::new();

    // The brick at loc itself, the one below, and the one stacked on top
    // of loc's own extent.
    let own_extent = grid
        .parent_anchor(loc)
        .and_then(|a| grid.anchor_size(a).ok())
        .map(|s| s.z)
        .unwrap_or_else(|| grid.z_step());
    let candidates = [
        loc,
        loc.offset(0, 0, -grid.z_step()),
        loc.offset(0, 0, own_extent),
    ];

    for candidate in candidates {
        let Some(anchor) = grid.parent_anchor(candidate) else {
            continue;
        };
        if updated.contains(&anchor) {
            continue;
        }
        if set_brick_exposure(grid, anchor).is_ok() {
            updated.push(anchor);
        }
    }
    updated
}

/// Toggle the stored exposure flags on an anchor (user override).
pub fn toggle_exposure(grid: &mut BrickGrid, anchor: CellCoord, side: ExposureSide) -> Result<()> {
    grid.anchor(anchor)?;
    if let Some(cell) = grid.get_mut(anchor) {
        if matches!(side, ExposureSide::Top | ExposureSide::Both) {
            cell.top_exposed = Some(!cell.top_exposed.unwrap_or(false));
        }
        if matches!(side, ExposureSide::Bottom | ExposureSide::Both) {
            cell.bot_exposed = Some(!cell.bot_exposed.unwrap_or(false));
        }
    }
    Ok(())
}

fn occludes(grid: &BrickGrid, coord: CellCoord) -> bool {
    grid.get(coord).is_some_and(|cell| cell.draw)
}
