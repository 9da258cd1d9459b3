//! Brickgrid - a sparse-lattice editing engine for brick-built voxel models

pub mod core;
pub mod math;
pub mod brick;
pub mod grid;
pub mod edit;

pub use crate::core::error::EditError;
pub use crate::core::types::Result;
pub use crate::grid::coord::CellCoord;
pub use crate::grid::store::{BrickGrid, BrickLayout};
