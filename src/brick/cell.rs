//! Per-lattice-cell metadata.

use glam::IVec3;
use serde::{Deserialize, Serialize};

use super::types::BrickType;
use crate::grid::coord::CellCoord;

/// Merge relationship of a cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parent {
    /// Empty or unassigned cell
    #[default]
    Unassigned,
    /// This cell is the anchor of its footprint
    Anchor,
    /// Dependent cell belonging to the footprint anchored at the coordinate
    Cell(CellCoord),
}

/// One entry per tracked lattice coordinate.
///
/// Only the anchor cell of a footprint carries the authoritative `size`;
/// dependent cells point back at the anchor through `parent`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BrickCell {
    /// Whether this cell currently materializes a visible brick
    pub draw: bool,
    /// Occupancy confidence from voxelization (1.0 on the shell)
    pub val: f32,
    /// Footprint of the brick, authoritative on anchors only
    pub size: Option<IVec3>,
    /// Brick shape
    pub brick_type: BrickType,
    /// Named material, owned externally
    pub material: Option<String>,
    /// Merge relationship
    pub parent: Parent,
    /// Top face visible from outside the model (None = not yet computed)
    pub top_exposed: Option<bool>,
    /// Bottom face visible from outside the model
    pub bot_exposed: Option<bool>,
    /// Orientation flags for asymmetric shapes
    pub flipped: bool,
    pub rotated: bool,
}

impl Default for BrickCell {
    fn default() -> Self {
        Self {
            draw: false,
            val: 0.0,
            size: None,
            brick_type: BrickType::default(),
            material: None,
            parent: Parent::Unassigned,
            top_exposed: None,
            bot_exposed: None,
            flipped: false,
            rotated: false,
        }
    }
}

impl BrickCell {
    /// A drawn elemental anchor of the given height, inheriting a material.
    pub fn elemental(height: i32, brick_type: BrickType, material: Option<String>) -> Self {
        Self {
            draw: true,
            val: 1.0,
            size: Some(IVec3::new(1, 1, height)),
            brick_type,
            material,
            parent: Parent::Anchor,
            ..Self::default()
        }
    }

    /// Reset the cell to its empty state (brick removed).
    pub fn clear(&mut self) {
        self.draw = false;
        self.val = 0.0;
        self.size = None;
        self.parent = Parent::Unassigned;
        self.top_exposed = None;
        self.bot_exposed = None;
    }

    /// Whether the cell is an anchor.
    pub fn is_anchor(&self) -> bool {
        self.parent == Parent::Anchor
    }

    /// Whether this anchor's footprint is already at the minimal size
    /// (1 x 1 x height-step).
    pub fn is_elemental(&self) -> bool {
        match self.size {
            Some(size) => {
                size.x == 1
                    && size.y == 1
                    && size.z == self.brick_type.height_class().units()
            }
            None => false,
        }
    }
}
