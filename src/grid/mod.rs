//! Sparse lattice grid: coordinates, the cell store, and shell values.

pub mod coord;
pub mod store;
pub mod shell;

pub use coord::CellCoord;
pub use store::{BrickGrid, BrickLayout};
