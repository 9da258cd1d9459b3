//! Split engine: decompose a footprint back into elemental cells.

use glam::IVec3;

use crate::brick::cell::Parent;
use crate::brick::types::{BrickType, HeightClass};
use crate::core::types::Result;
use crate::edit::exposure::set_brick_exposure;
use crate::grid::coord::CellCoord;
use crate::grid::store::BrickGrid;

/// Split the footprint anchored at `anchor` along the requested axes.
///
/// `horizontal` decomposes the X/Y footprint into 1x1 columns keeping the
/// original height; `vertical` decomposes the Z-height into height-class
/// steps keeping the X/Y footprint; both give full elemental cells.
/// Neither flag, or a footprint already at the requested decomposition, is
/// a no-op returning an empty changed-set.
///
/// Every resulting anchor keeps the original material and gets the default
/// shape for its height class.
pub fn split_brick(
    grid: &mut BrickGrid,
    anchor: CellCoord,
    vertical: bool,
    horizontal: bool,
) -> Result<Vec<CellCoord>> {
    let cell = grid.anchor(anchor)?;
    let size = grid.anchor_size(anchor)?;
    let material = cell.material.clone();
    let z_step = grid.z_step();

    if !vertical && !horizontal {
        return Ok(Vec::new());
    }

    // Resulting sub-brick dimensions per axis group.
    let sub_size = IVec3::new(
        if horizontal { 1 } else { size.x },
        if horizontal { 1 } else { size.y },
        if vertical { z_step } else { size.z },
    );
    if sub_size == size {
        // Already at the requested decomposition (e.g. elemental)
        return Ok(Vec::new());
    }
    let sub_class = HeightClass::from_units(sub_size.z).unwrap_or(HeightClass::Flat);
    let sub_type = BrickType::default_for(sub_class);

    let mut changed = Vec::new();
    for sz in (0..size.z).step_by(sub_size.z as usize) {
        for sy in (0..size.y).step_by(sub_size.y as usize) {
            for sx in (0..size.x).step_by(sub_size.x as usize) {
                let sub_anchor = anchor.offset(sx, sy, sz);
                for coord in grid.keys_in_footprint(sub_anchor, sub_size) {
                    let Some(cell) = grid.get_mut(coord) else {
                        continue;
                    };
                    cell.draw = true;
                    cell.material = material.clone();
                    cell.brick_type = sub_type;
                    if coord == sub_anchor {
                        cell.size = Some(sub_size);
                        cell.parent = Parent::Anchor;
                    } else {
                        cell.size = None;
                        cell.parent = Parent::Cell(sub_anchor);
                    }
                    changed.push(coord);
                }
                // New anchors need fresh exposure
                let _ = set_brick_exposure(grid, sub_anchor);
            }
        }
    }

    log::debug!(
        "split {anchor} ({}x{}x{}) into {} cells (v={vertical}, h={horizontal})",
        size.x,
        size.y,
        size.z,
        changed.len()
    );
    Ok(changed)
}
