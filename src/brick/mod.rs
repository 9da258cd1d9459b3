//! Brick domain types: shapes, cells, and the legal-size table.

pub mod types;
pub mod cell;
pub mod sizes;

pub use types::{BrickType, HeightClass};
pub use cell::{BrickCell, Parent};
