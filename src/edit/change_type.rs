//! Change the shape of an existing footprint in place.

use crate::core::error::EditError;
use crate::core::types::Result;
use crate::brick::sizes;
use crate::brick::types::BrickType;
use crate::edit::exposure::verify_exposure_above_and_below;
use crate::grid::coord::CellCoord;
use crate::grid::store::BrickGrid;

/// Swap the shape of the footprint anchored at `anchor` to `new_type`,
/// keeping the footprint itself.
///
/// The swap is legal only when the current size appears in the new shape's
/// size table at the footprint's height class (so a flat 1x1 can become a
/// stud, a tall 1x2 a slope, any plate a tile of matching size, and so on);
/// anything else fails with [`EditError::InvalidFootprint`] and leaves the
/// grid untouched. Orientation flags apply to asymmetric shapes like
/// slopes. A call that changes neither shape nor flags is a no-op.
///
/// Returns the cells whose drawn shape changed plus any neighbor anchors
/// whose exposure was recomputed.
pub fn change_brick_type(
    grid: &mut BrickGrid,
    anchor: CellCoord,
    new_type: BrickType,
    flipped: bool,
    rotated: bool,
) -> Result<Vec<CellCoord>> {
    let cell = grid.anchor(anchor)?;
    let size = grid.anchor_size(anchor)?;

    if cell.brick_type == new_type && cell.flipped == flipped && cell.rotated == rotated {
        return Ok(Vec::new());
    }
    if !sizes::is_legal(size, new_type) {
        return Err(EditError::InvalidFootprint {
            size,
            brick_type: new_type,
        });
    }

    let mut changed = Vec::new();
    for coord in grid.keys_in_footprint(anchor, size) {
        let Some(cell) = grid.get_mut(coord) else {
            continue;
        };
        cell.brick_type = new_type;
        if coord == anchor {
            cell.flipped = flipped;
            cell.rotated = rotated;
        }
        changed.push(coord);
    }

    // Tiles, studs and slopes present different faces than the shape they
    // replaced; the bricks stacked against each column need fresh exposure.
    for dy in 0..size.y {
        for dx in 0..size.x {
            for neighbor in verify_exposure_above_and_below(grid, anchor.offset(dx, dy, 0)) {
                if !changed.contains(&neighbor) {
                    changed.push(neighbor);
                }
            }
        }
    }

    log::debug!("changed {anchor} to {new_type:?} (flipped={flipped}, rotated={rotated})");
    Ok(changed)
}
