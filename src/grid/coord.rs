//! Integer lattice coordinate type.
//!
//! Cells are keyed by an integer triple with structural equality and a
//! total order. The canonical `"x,y,z"` string form is kept for snapshot
//! serialization only; lookups never go through strings.

use std::fmt;
use std::str::FromStr;

use glam::IVec3;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Coordinate of one unit cell in the brick lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl CellCoord {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Coordinate shifted by the given deltas.
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// The six lattice neighbors.
    pub fn neighbors(self) -> [CellCoord; 6] {
        [
            self.offset(1, 0, 0),
            self.offset(-1, 0, 0),
            self.offset(0, 1, 0),
            self.offset(0, -1, 0),
            self.offset(0, 0, 1),
            self.offset(0, 0, -1),
        ]
    }

    /// Locality weight used to order merge candidates (low coordinates
    /// first): the raw coordinate product.
    pub fn merge_weight(self) -> i64 {
        self.x as i64 * self.y as i64 * self.z as i64
    }

    pub fn as_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }
}

impl From<IVec3> for CellCoord {
    fn from(v: IVec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

/// Failure to parse the canonical `"x,y,z"` form.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid cell coordinate: {0:?}")]
pub struct ParseCoordError(pub String);

impl FromStr for CellCoord {
    type Err = ParseCoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',').map(|p| p.trim().parse::<i32>());
        let mut next = || {
            parts
                .next()
                .and_then(|p| p.ok())
                .ok_or_else(|| ParseCoordError(s.to_string()))
        };
        let coord = CellCoord::new(next()?, next()?, next()?);
        if s.split(',').count() != 3 {
            return Err(ParseCoordError(s.to_string()));
        }
        Ok(coord)
    }
}

// Serialized as the canonical string so grids snapshot to flat JSON maps.
impl Serialize for CellCoord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellCoord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
