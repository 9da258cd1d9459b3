//! Sparse cell store with journaled edits.
//!
//! The grid is an explicit handle passed to every engine call; there is no
//! ambient per-model lookup. Batch edits run inside [`BrickGrid::transaction`],
//! which journals per-cell prior values and restores them when the batch
//! fails, instead of deep-copying the whole grid per operation.

use std::collections::HashMap;

use glam::IVec3;
use serde::{Deserialize, Serialize};

use crate::brick::cell::{BrickCell, Parent};
use crate::brick::types::HeightClass;
use crate::core::error::EditError;
use crate::core::types::Result;
use crate::grid::coord::CellCoord;

/// Which brick height classes a model is built from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrickLayout {
    /// Flat plates only, lattice step 1
    Plates,
    /// Full-height bricks only, lattice step 3
    Bricks,
    /// Mixed, lattice step 1
    #[default]
    BricksAndPlates,
}

impl BrickLayout {
    /// Vertical lattice step between stacked cells.
    pub fn z_step(self) -> i32 {
        match self {
            BrickLayout::Plates | BrickLayout::BricksAndPlates => 1,
            BrickLayout::Bricks => 3,
        }
    }

    /// Whether bricks of the given class can exist in this layout.
    pub fn supports(self, class: HeightClass) -> bool {
        match self {
            BrickLayout::Plates => class == HeightClass::Flat,
            BrickLayout::Bricks => class == HeightClass::Tall,
            BrickLayout::BricksAndPlates => true,
        }
    }
}

/// Journal entry: coordinate plus its value before the current transaction
/// first touched it (`None` = did not exist).
type JournalEntry = (CellCoord, Option<BrickCell>);

/// Sparse mapping from lattice coordinate to cell metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BrickGrid {
    layout: BrickLayout,
    cells: HashMap<CellCoord, BrickCell>,
    #[serde(skip)]
    journal: Option<Vec<JournalEntry>>,
}

impl BrickGrid {
    /// Create an empty grid for a layout.
    pub fn new(layout: BrickLayout) -> Self {
        Self {
            layout,
            cells: HashMap::new(),
            journal: None,
        }
    }

    pub fn layout(&self) -> BrickLayout {
        self.layout
    }

    /// Vertical lattice step of this grid's layout.
    pub fn z_step(&self) -> i32 {
        self.layout.z_step()
    }

    /// Number of tracked cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, coord: CellCoord) -> bool {
        self.cells.contains_key(&coord)
    }

    pub fn get(&self, coord: CellCoord) -> Option<&BrickCell> {
        self.cells.get(&coord)
    }

    /// Mutable cell access. Journals the prior value when a transaction is
    /// active, so callers can mutate freely.
    pub fn get_mut(&mut self, coord: CellCoord) -> Option<&mut BrickCell> {
        if self.cells.contains_key(&coord) {
            self.record(coord);
        }
        self.cells.get_mut(&coord)
    }

    /// Insert or replace a cell.
    pub fn set(&mut self, coord: CellCoord, cell: BrickCell) {
        self.record(coord);
        self.cells.insert(coord, cell);
    }

    /// Remove a cell entirely (rare; cleared cells usually stay tracked).
    pub fn remove(&mut self, coord: CellCoord) -> Option<BrickCell> {
        self.record(coord);
        self.cells.remove(&coord)
    }

    /// Mutable access, inserting a default cell when absent.
    pub fn get_or_insert(&mut self, coord: CellCoord) -> &mut BrickCell {
        self.record(coord);
        self.cells.entry(coord).or_default()
    }

    /// Iterate over all tracked coordinates.
    pub fn coords(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.keys().copied()
    }

    /// Iterate over all (coordinate, cell) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &BrickCell)> + '_ {
        self.cells.iter().map(|(c, cell)| (*c, cell))
    }

    /// Ordered coordinates spanning the rectangular volume at `anchor`,
    /// stepping by 1 in X/Y and by the layout's height-step in Z.
    ///
    /// Enumeration never fails; callers must check existence per coordinate.
    pub fn keys_in_footprint(&self, anchor: CellCoord, size: IVec3) -> Vec<CellCoord> {
        let step = self.z_step() as usize;
        let mut keys = Vec::with_capacity(
            (size.x * size.y) as usize * (size.z as usize).div_ceil(step.max(1)),
        );
        for z in (0..size.z).step_by(step.max(1)) {
            for y in 0..size.y {
                for x in 0..size.x {
                    keys.push(anchor.offset(x, y, z));
                }
            }
        }
        keys
    }

    /// Resolve the anchor coordinate of the footprint containing `coord`.
    ///
    /// `None` when the cell is absent or unassigned.
    pub fn parent_anchor(&self, coord: CellCoord) -> Option<CellCoord> {
        match self.get(coord)?.parent {
            Parent::Anchor => Some(coord),
            Parent::Cell(anchor) => Some(anchor),
            Parent::Unassigned => None,
        }
    }

    /// The cell at `coord`, which must be a footprint anchor.
    pub fn anchor(&self, coord: CellCoord) -> Result<&BrickCell> {
        match self.get(coord) {
            Some(cell) if cell.is_anchor() && cell.size.is_some() => Ok(cell),
            _ => Err(EditError::MissingAnchor { coord }),
        }
    }

    /// Authoritative size of the footprint anchored at `coord`.
    pub fn anchor_size(&self, coord: CellCoord) -> Result<IVec3> {
        self.anchor(coord)?
            .size
            .ok_or(EditError::MissingAnchor { coord })
    }

    /// Deep copy with a clean journal, for undo snapshotting.
    pub fn snapshot(&self) -> BrickGrid {
        BrickGrid {
            layout: self.layout,
            cells: self.cells.clone(),
            journal: None,
        }
    }

    // ---- transaction log ----

    /// Start journaling cell mutations. No-op if already journaling.
    pub fn begin_edit(&mut self) {
        if self.journal.is_none() {
            self.journal = Some(Vec::new());
        }
    }

    /// Keep all journaled mutations and stop journaling.
    pub fn commit_edit(&mut self) {
        self.journal = None;
    }

    /// Undo every mutation since `begin_edit`, newest first.
    pub fn rollback_edit(&mut self) {
        if let Some(journal) = self.journal.take() {
            for (coord, prior) in journal.into_iter().rev() {
                match prior {
                    Some(cell) => {
                        self.cells.insert(coord, cell);
                    }
                    None => {
                        self.cells.remove(&coord);
                    }
                }
            }
        }
    }

    /// Run a batch edit atomically: on `Err` the grid is restored to its
    /// pre-edit state. Nested calls join the outermost transaction.
    pub fn transaction<T>(
        &mut self,
        f: impl FnOnce(&mut BrickGrid) -> Result<T>,
    ) -> Result<T> {
        if self.journal.is_some() {
            return f(self);
        }
        self.begin_edit();
        match f(self) {
            Ok(value) => {
                self.commit_edit();
                Ok(value)
            }
            Err(e) => {
                log::debug!("batch edit failed, rolling back: {e}");
                self.rollback_edit();
                Err(e)
            }
        }
    }

    fn record(&mut self, coord: CellCoord) {
        if let Some(journal) = self.journal.as_mut() {
            journal.push((coord, self.cells.get(&coord).cloned()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brick::types::BrickType;

    fn plate_at(grid: &mut BrickGrid, coord: CellCoord) {
        grid.set(coord, BrickCell::elemental(1, BrickType::Plate, None));
    }

    #[test]
    fn test_get_set() {
        let mut grid = BrickGrid::new(BrickLayout::BricksAndPlates);
        let coord = CellCoord::new(1, 2, 3);
        assert!(grid.get(coord).is_none());
        plate_at(&mut grid, coord);
        assert!(grid.get(coord).unwrap().draw);
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn test_keys_in_footprint_flat_step() {
        let grid = BrickGrid::new(BrickLayout::BricksAndPlates);
        let keys = grid.keys_in_footprint(CellCoord::new(0, 0, 0), IVec3::new(2, 1, 3));
        // step 1 in Z: 2 columns x 3 layers
        assert_eq!(keys.len(), 6);
        assert_eq!(keys[0], CellCoord::new(0, 0, 0));
        assert!(keys.contains(&CellCoord::new(1, 0, 2)));
    }

    #[test]
    fn test_keys_in_footprint_tall_step() {
        let grid = BrickGrid::new(BrickLayout::Bricks);
        let keys = grid.keys_in_footprint(CellCoord::new(0, 0, 0), IVec3::new(2, 2, 3));
        // step 3 in Z: one layer of slots
        assert_eq!(keys.len(), 4);
    }

    #[test]
    fn test_parent_anchor_resolution() {
        let mut grid = BrickGrid::new(BrickLayout::BricksAndPlates);
        let anchor = CellCoord::new(0, 0, 0);
        let child = CellCoord::new(1, 0, 0);
        plate_at(&mut grid, anchor);
        let mut dep = BrickCell::elemental(1, BrickType::Plate, None);
        dep.parent = Parent::Cell(anchor);
        dep.size = None;
        grid.set(child, dep);

        assert_eq!(grid.parent_anchor(anchor), Some(anchor));
        assert_eq!(grid.parent_anchor(child), Some(anchor));
        assert_eq!(grid.parent_anchor(CellCoord::new(9, 9, 9)), None);
    }

    #[test]
    fn test_anchor_contract() {
        let mut grid = BrickGrid::new(BrickLayout::BricksAndPlates);
        let coord = CellCoord::new(0, 0, 0);
        assert_eq!(
            grid.anchor(coord).unwrap_err(),
            EditError::MissingAnchor { coord }
        );
        plate_at(&mut grid, coord);
        assert_eq!(grid.anchor_size(coord).unwrap(), IVec3::new(1, 1, 1));
    }

    #[test]
    fn test_transaction_rollback() {
        let mut grid = BrickGrid::new(BrickLayout::BricksAndPlates);
        let existing = CellCoord::new(0, 0, 0);
        plate_at(&mut grid, existing);
        let before = grid.snapshot();

        let result: Result<()> = grid.transaction(|g| {
            plate_at(g, CellCoord::new(5, 5, 5));
            g.get_mut(existing).unwrap().draw = false;
            g.remove(existing);
            Err(EditError::MissingAnchor { coord: existing })
        });

        assert!(result.is_err());
        assert_eq!(grid.len(), before.len());
        assert!(grid.get(existing).unwrap().draw);
        assert!(!grid.contains(CellCoord::new(5, 5, 5)));
    }

    #[test]
    fn test_transaction_commit() {
        let mut grid = BrickGrid::new(BrickLayout::BricksAndPlates);
        let coord = CellCoord::new(2, 0, 0);
        grid.transaction(|g| {
            plate_at(g, coord);
            Ok(())
        })
        .unwrap();
        assert!(grid.contains(coord));
    }

    #[test]
    fn test_snapshot_roundtrip_json() {
        let mut grid = BrickGrid::new(BrickLayout::BricksAndPlates);
        plate_at(&mut grid, CellCoord::new(0, 0, 0));
        plate_at(&mut grid, CellCoord::new(-1, 4, 2));

        let json = serde_json::to_string(&grid).unwrap();
        // Canonical string keys in the snapshot
        assert!(json.contains("\"-1,4,2\""));
        let back: BrickGrid = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 2);
        assert!(back.get(CellCoord::new(-1, 4, 2)).unwrap().draw);
    }
}
