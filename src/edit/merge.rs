//! Merge engine: greedily coalesce elemental cells into larger bricks.
//!
//! Candidates are processed in a locality order (low coordinate product
//! first). Each candidate tries every legal footprint it could grow into,
//! largest first when `prefer_largest` is set, with seed-derived random
//! tie-breaking so equally good shapes do not produce visible repeating
//! patterns. A cell that merges with nothing simply stays elemental; that
//! is its terminal state, not an error.

use std::cmp::Reverse;
use std::collections::HashSet;

use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::brick::cell::Parent;
use crate::brick::sizes;
use crate::brick::types::{BrickType, HeightClass};
use crate::edit::exposure::set_brick_exposure;
use crate::grid::coord::CellCoord;
use crate::grid::store::{BrickGrid, BrickLayout};
use crate::math::rng::SeededRng;

/// Tunables for a merge pass.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Take the largest legal footprint instead of the first random fit
    pub prefer_largest: bool,
    /// Try full-height growth before horizontal growth
    pub merge_vertical: bool,
    /// Seed for tie-breaking between equally good footprints
    pub merge_seed: u64,
    /// Cap on the shorter footprint side
    pub max_width: i32,
    /// Cap on the longer footprint side
    pub max_depth: i32,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            prefer_largest: true,
            merge_vertical: true,
            merge_seed: 0,
            max_width: 8,
            max_depth: 8,
        }
    }
}

/// Sort merge candidates by ascending coordinate product.
///
/// A cheap locality heuristic: low-coordinate cells merge first, which
/// keeps anchors in predictable corners. The secondary coordinate order
/// makes the pass deterministic.
pub fn sorted_for_merge(keys: &[CellCoord]) -> Vec<CellCoord> {
    let mut sorted = keys.to_vec();
    sorted.sort_by_key(|k| (k.merge_weight(), *k));
    sorted
}

/// Merge a set of elemental cells into the largest legal footprints.
///
/// Returns the anchors that survived the pass (merged or still elemental),
/// with exposure recomputed, for redraw. Cells absorbed into another
/// footprint are not returned.
pub fn merge_bricks(
    grid: &mut BrickGrid,
    keys: &[CellCoord],
    options: &MergeOptions,
) -> Vec<CellCoord> {
    let mut rng = SeededRng::new(options.merge_seed);
    let key_set: HashSet<CellCoord> = keys.iter().copied().collect();
    let mut updated = Vec::new();

    for key in sorted_for_merge(keys) {
        let Some(cell) = grid.get(key) else {
            continue;
        };
        // Cells already absorbed by an earlier candidate are done
        if !cell.draw || !cell.is_anchor() {
            continue;
        }
        let size = attempt_merge(grid, key, &key_set, options, &mut rng);
        log::debug!("merge candidate {key} -> {}x{}x{}", size.x, size.y, size.z);
        let _ = set_brick_exposure(grid, key);
        updated.push(key);
    }
    updated
}

/// Grow the footprint anchored at `anchor` to the best legal size whose
/// cells are all available within `keys`. Returns the resulting size
/// (unchanged when nothing could merge).
pub fn attempt_merge(
    grid: &mut BrickGrid,
    anchor: CellCoord,
    keys: &HashSet<CellCoord>,
    options: &MergeOptions,
    rng: &mut SeededRng,
) -> IVec3 {
    let Some(cell) = grid.get(anchor) else {
        return IVec3::ONE;
    };
    let current = cell.size.unwrap_or(IVec3::new(1, 1, grid.z_step()));
    let anchor_type = cell.brick_type;
    let material = cell.material.clone();
    if !anchor_type.is_mergeable(false) && !anchor_type.is_mergeable(true) {
        return current;
    }

    let mut candidates = candidate_sizes(grid.layout(), anchor_type, current, options);
    rng.shuffle(&mut candidates);
    if options.prefer_largest {
        // Stable sort keeps the shuffle as the tie-break within equal keys
        candidates.sort_by_key(|s| {
            let vertical = if options.merge_vertical { s.z } else { 0 };
            Reverse((s.x * s.y * s.z, vertical))
        });
    }

    for size in candidates {
        if size == current {
            continue;
        }
        if footprint_available(grid, anchor, size, current, keys, material.as_deref()) {
            apply_merge(grid, anchor, size);
            return size;
        }
    }
    current
}

/// Enumerate every legal footprint the anchor could grow into, both
/// orientations, within the configured caps.
fn candidate_sizes(
    layout: BrickLayout,
    anchor_type: BrickType,
    current: IVec3,
    options: &MergeOptions,
) -> Vec<IVec3> {
    let mut heights = vec![current.z];
    // Plates can consolidate into full bricks when growing vertically
    if options.merge_vertical
        && layout == BrickLayout::BricksAndPlates
        && current.z == HeightClass::Flat.units()
    {
        heights.push(HeightClass::Tall.units());
    }

    let mut out = Vec::new();
    for height in heights {
        let Some(class) = HeightClass::from_units(height) else {
            continue;
        };
        let target = target_type(anchor_type, class);
        for &[x, y] in sizes::sizes_for(class, target) {
            if x.min(y) > options.max_width || x.max(y) > options.max_depth {
                continue;
            }
            let a = IVec3::new(x, y, height);
            let b = IVec3::new(y, x, height);
            if !out.contains(&a) {
                out.push(a);
            }
            if !out.contains(&b) {
                out.push(b);
            }
        }
    }
    out
}

/// Shape the merged brick will take at a height class: keep the anchor's
/// shape when it exists there, otherwise the class default.
fn target_type(anchor_type: BrickType, class: HeightClass) -> BrickType {
    if !sizes::sizes_for(class, anchor_type).is_empty() && anchor_type.is_mergeable(true) {
        anchor_type
    } else {
        BrickType::default_for(class)
    }
}

/// Check that every unit cell of the grown footprint is present, drawn,
/// material-compatible, of a mergeable shape, and belongs (directly or via
/// its anchor) to the candidate key set with an elemental footprint inside
/// the grown volume.
fn footprint_available(
    grid: &BrickGrid,
    anchor: CellCoord,
    size: IVec3,
    current: IVec3,
    keys: &HashSet<CellCoord>,
    material: Option<&str>,
) -> bool {
    let up = size.z > current.z;
    for coord in grid.keys_in_footprint(anchor, size) {
        let Some(resolved) = grid.parent_anchor(coord) else {
            return false;
        };
        if resolved == anchor {
            continue;
        }
        let Some(cell) = grid.get(coord) else {
            return false;
        };
        if !cell.draw
            || cell.material.as_deref() != material
            || !cell.brick_type.is_mergeable(up)
        {
            return false;
        }
        if !keys.contains(&resolved) {
            // Existing anchor outside the candidate set; leave it alone
            return false;
        }
        let Some(owner) = grid.get(resolved) else {
            return false;
        };
        let Some(owner_size) = owner.size else {
            return false;
        };
        // Absorbed footprints must be elemental columns fully inside the
        // grown volume
        if owner_size.x != 1
            || owner_size.y != 1
            || resolved.z < anchor.z
            || resolved.z + owner_size.z > anchor.z + size.z
        {
            return false;
        }
    }
    true
}

/// Commit a successful merge: the anchor takes the new size and shape, all
/// covered cells point back at it.
fn apply_merge(grid: &mut BrickGrid, anchor: CellCoord, size: IVec3) {
    let class = HeightClass::from_units(size.z).unwrap_or(HeightClass::Flat);
    let new_type = grid
        .get(anchor)
        .map(|c| target_type(c.brick_type, class))
        .unwrap_or(BrickType::default_for(class));

    for coord in grid.keys_in_footprint(anchor, size) {
        let Some(cell) = grid.get_mut(coord) else {
            continue;
        };
        cell.draw = true;
        cell.brick_type = new_type;
        if coord == anchor {
            cell.size = Some(size);
            cell.parent = Parent::Anchor;
        } else {
            cell.size = None;
            cell.parent = Parent::Cell(anchor);
        }
    }
}
