//! Static legal-size table.
//!
//! Maps height class x brick type to the permitted (x, y) footprints.
//! Entries are canonical with x <= y; queries are orientation-insensitive.
//! The engine only ever reads this table.

use glam::IVec3;

use super::types::{BrickType, HeightClass};

const PLATE_SIZES: &[[i32; 2]] = &[
    [1, 1], [1, 2], [1, 3], [1, 4], [1, 6], [1, 8],
    [2, 2], [2, 3], [2, 4], [2, 6], [2, 8],
    [4, 4], [4, 6], [4, 8],
    [6, 6], [6, 8],
];

const TILE_SIZES: &[[i32; 2]] = &[
    [1, 1], [1, 2], [1, 3], [1, 4], [1, 6], [1, 8],
    [2, 2], [2, 4],
];

const BRICK_SIZES: &[[i32; 2]] = &[
    [1, 1], [1, 2], [1, 3], [1, 4], [1, 6], [1, 8],
    [2, 2], [2, 3], [2, 4], [2, 6], [2, 8],
];

const SLOPE_TALL_SIZES: &[[i32; 2]] = &[
    [1, 2], [1, 3], [1, 4], [1, 6],
    [2, 2], [2, 3], [2, 4],
    [3, 4],
];

const SLOPE_FLAT_SIZES: &[[i32; 2]] = &[[1, 1], [1, 2]];

const SLOPE_INVERTED_SIZES: &[[i32; 2]] = &[[1, 2], [1, 3]];

const UNIT_SIZE: &[[i32; 2]] = &[[1, 1]];

/// Permitted (x, y) footprints for a shape at a height class.
///
/// Empty when the shape does not exist at that class.
pub fn sizes_for(class: HeightClass, brick_type: BrickType) -> &'static [[i32; 2]] {
    match (class, brick_type) {
        (HeightClass::Flat, BrickType::Plate) => PLATE_SIZES,
        (HeightClass::Flat, BrickType::Tile) => TILE_SIZES,
        (HeightClass::Flat, BrickType::Slope) => SLOPE_FLAT_SIZES,
        (HeightClass::Flat, BrickType::Stud | BrickType::StudHollow) => UNIT_SIZE,
        (HeightClass::Tall, BrickType::Brick) => BRICK_SIZES,
        (HeightClass::Tall, BrickType::Slope) => SLOPE_TALL_SIZES,
        (HeightClass::Tall, BrickType::SlopeInverted) => SLOPE_INVERTED_SIZES,
        (HeightClass::Tall, BrickType::Cylinder | BrickType::Cone) => UNIT_SIZE,
        _ => &[],
    }
}

/// Whether a full (x, y, z) size is legal for the shape.
pub fn is_legal(size: IVec3, brick_type: BrickType) -> bool {
    let Some(class) = HeightClass::from_units(size.z) else {
        return false;
    };
    let (lo, hi) = if size.x <= size.y {
        (size.x, size.y)
    } else {
        (size.y, size.x)
    };
    sizes_for(class, brick_type).contains(&[lo, hi])
}

/// Longest side any legal footprint of the shape reaches at a class.
pub fn max_side(class: HeightClass, brick_type: BrickType) -> i32 {
    sizes_for(class, brick_type)
        .iter()
        .map(|&[_, y]| y)
        .max()
        .unwrap_or(0)
}
