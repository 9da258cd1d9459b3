//! Brick shape enumeration and height classes.

use serde::{Deserialize, Serialize};

/// Vertical class of a brick shape.
///
/// Flat shapes are one lattice unit tall, tall shapes are three.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeightClass {
    Flat,
    Tall,
}

impl HeightClass {
    /// Height in lattice units (the "height-step" of the class).
    pub fn units(self) -> i32 {
        match self {
            HeightClass::Flat => 1,
            HeightClass::Tall => 3,
        }
    }

    /// Class for a given Z extent, if it is a valid extent.
    pub fn from_units(units: i32) -> Option<HeightClass> {
        match units {
            1 => Some(HeightClass::Flat),
            3 => Some(HeightClass::Tall),
            _ => None,
        }
    }
}

/// Brick shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrickType {
    #[default]
    Plate,
    Brick,
    Slope,
    SlopeInverted,
    Tile,
    Stud,
    StudHollow,
    Cylinder,
    Cone,
}

impl BrickType {
    /// Height class this shape belongs to.
    ///
    /// Slopes exist in both classes; they default to tall and are validated
    /// against the size table for whichever class the footprint has.
    pub fn height_class(self) -> HeightClass {
        match self {
            BrickType::Plate
            | BrickType::Tile
            | BrickType::Stud
            | BrickType::StudHollow => HeightClass::Flat,
            BrickType::Brick
            | BrickType::Slope
            | BrickType::SlopeInverted
            | BrickType::Cylinder
            | BrickType::Cone => HeightClass::Tall,
        }
    }

    /// Whether this shape participates in merges.
    ///
    /// Cylinders only merge when growing upward (stacking).
    pub fn is_mergeable(self, up: bool) -> bool {
        matches!(self, BrickType::Plate | BrickType::Brick | BrickType::Slope)
            || (up && self == BrickType::Cylinder)
    }

    /// Default shape for a height class.
    pub fn default_for(class: HeightClass) -> BrickType {
        match class {
            HeightClass::Flat => BrickType::Plate,
            HeightClass::Tall => BrickType::Brick,
        }
    }
}
