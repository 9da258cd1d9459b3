//! Error types for the brickgrid engine

use glam::IVec3;
use thiserror::Error;

use crate::brick::types::BrickType;
use crate::grid::coord::CellCoord;

/// Main error type for edit operations.
///
/// `InvalidFootprint` and `OccupiedConflict` are local failures: callers
/// skip the offending cell or direction and carry on. `MissingAnchor` is a
/// caller-contract violation and aborts the whole batch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("size {size} is not a legal footprint for {brick_type:?}")]
    InvalidFootprint { size: IVec3, brick_type: BrickType },

    #[error("location {coord} is already occupied by an incompatible brick")]
    OccupiedConflict { coord: CellCoord },

    #[error("no anchor cell at {coord}")]
    MissingAnchor { coord: CellCoord },
}
