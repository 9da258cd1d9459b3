//! Adjacency editor: draw or clear bricks on the six faces of a brick.
//!
//! The interactive flow is a popup session: direction flags toggle on and
//! off while the popup is open, and every change re-runs the full toggle
//! pass against the grid as it was when the session started, so nothing is
//! ever double-applied. Confirming runs one merge pass over everything the
//! session created; cancelling discards the working copy.

use crate::brick::cell::{BrickCell, Parent};
use crate::brick::types::{BrickType, HeightClass};
use crate::core::error::EditError;
use crate::core::types::Result;
use crate::edit::exposure::verify_exposure_above_and_below;
use crate::edit::merge::{merge_bricks, MergeOptions};
use crate::grid::coord::CellCoord;
use crate::grid::shell::update_value;
use crate::grid::store::{BrickGrid, BrickLayout};

/// One of the six lattice-neighbor directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    XPos,
    XNeg,
    YPos,
    YNeg,
    ZPos,
    ZNeg,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::XPos,
        Direction::XNeg,
        Direction::YPos,
        Direction::YNeg,
        Direction::ZPos,
        Direction::ZNeg,
    ];

    fn index(self) -> usize {
        match self {
            Direction::XPos => 0,
            Direction::XNeg => 1,
            Direction::YPos => 2,
            Direction::YNeg => 3,
            Direction::ZPos => 4,
            Direction::ZNeg => 5,
        }
    }
}

/// Height class of the bricks a toggle creates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdjKind {
    Plate,
    Brick,
}

impl AdjKind {
    fn height_units(self) -> i32 {
        match self {
            AdjKind::Plate => HeightClass::Flat.units(),
            AdjKind::Brick => HeightClass::Tall.units(),
        }
    }

    fn brick_type(self) -> BrickType {
        match self {
            AdjKind::Plate => BrickType::Plate,
            AdjKind::Brick => BrickType::Brick,
        }
    }

    fn class(self) -> HeightClass {
        match self {
            AdjKind::Plate => HeightClass::Flat,
            AdjKind::Brick => HeightClass::Tall,
        }
    }
}

/// Unit positions along the face of `source` shared with `dir`.
///
/// For `-Z` the anchor row sits a full new-brick height below the source
/// so the created brick's top touches the source's bottom.
fn face_locs(
    grid: &BrickGrid,
    source: CellCoord,
    dir: Direction,
    kind: AdjKind,
) -> Result<Vec<CellCoord>> {
    let size = grid.anchor_size(source)?;
    let step = grid.z_step() as usize;
    let zs = || (0..size.z).step_by(step);

    let mut locs = Vec::new();
    match dir {
        Direction::XPos => {
            for y in 0..size.y {
                for z in zs() {
                    locs.push(source.offset(size.x, y, z));
                }
            }
        }
        Direction::XNeg => {
            for y in 0..size.y {
                for z in zs() {
                    locs.push(source.offset(-1, y, z));
                }
            }
        }
        Direction::YPos => {
            for x in 0..size.x {
                for z in zs() {
                    locs.push(source.offset(x, size.y, z));
                }
            }
        }
        Direction::YNeg => {
            for x in 0..size.x {
                for z in zs() {
                    locs.push(source.offset(x, -1, z));
                }
            }
        }
        Direction::ZPos => {
            for x in 0..size.x {
                for y in 0..size.y {
                    locs.push(source.offset(x, y, size.z));
                }
            }
        }
        Direction::ZNeg => {
            let below = if grid.layout() == BrickLayout::BricksAndPlates {
                kind.height_units()
            } else {
                grid.z_step()
            };
            for x in 0..size.x {
                for y in 0..size.y {
                    locs.push(source.offset(x, y, -below));
                }
            }
        }
    }
    Ok(locs)
}

/// Toggle brick presence along one face of the footprint at `source`.
///
/// With `add`, synthesizes elemental cells (inheriting the source's
/// material) at every free position of the face and returns them for a
/// later merge pass; positions already occupied are reported and skipped,
/// and the whole direction fails with [`EditError::OccupiedConflict`] when
/// nothing can be added or a tall brick's reservation slots are taken.
/// Without `add`, clears the drawn state of existing cells on the face.
pub fn toggle_adjacent(
    grid: &mut BrickGrid,
    source: CellCoord,
    dir: Direction,
    kind: AdjKind,
    add: bool,
) -> Result<Vec<CellCoord>> {
    if !grid.layout().supports(kind.class()) {
        return Err(EditError::InvalidFootprint {
            size: glam::IVec3::new(1, 1, kind.height_units()),
            brick_type: kind.brick_type(),
        });
    }
    let material = grid.anchor(source)?.material.clone();
    let locs = face_locs(grid, source, dir, kind)?;

    if !add {
        let mut changed = Vec::new();
        for loc in locs {
            match grid.get_mut(loc) {
                Some(cell) if cell.draw => {
                    cell.clear();
                    changed.push(loc);
                }
                _ => {
                    log::info!("no brick to remove at {loc}");
                }
            }
        }
        for loc in &changed {
            verify_exposure_above_and_below(grid, *loc);
        }
        return Ok(changed);
    }

    // Tall bricks in a mixed layout occupy three lattice layers; the two
    // cells above each new anchor must be reservable.
    let reserve_above = kind == AdjKind::Brick && grid.layout() == BrickLayout::BricksAndPlates;

    // Locations are processed sequentially so cells consumed by an earlier
    // creation in the same pass (a tall brick's upper layers overlap the
    // later face positions of a tall source) count as occupied and are
    // skipped, never overwritten. A reservation conflict with a
    // pre-existing brick rejects the whole direction; the transaction
    // rolls back anything created before the conflict.
    let created = grid.transaction(|g| {
        let mut created = Vec::new();
        for &loc in &locs {
            if g.get(loc).is_some_and(|c| c.draw) {
                log::info!("brick already exists at {loc}");
                continue;
            }
            if reserve_above {
                for dz in 1..=2 {
                    let above = loc.offset(0, 0, dz);
                    if g.get(above).is_some_and(|c| c.draw) {
                        log::info!("reservation blocked at {above}");
                        return Err(EditError::OccupiedConflict { coord: above });
                    }
                }
            }
            g.set(
                loc,
                BrickCell::elemental(kind.height_units(), kind.brick_type(), material.clone()),
            );
            update_value(g, loc);
            created.push(loc);
            if reserve_above {
                for dz in 1..=2 {
                    let above = loc.offset(0, 0, dz);
                    let cell = g.get_or_insert(above);
                    cell.draw = true;
                    cell.size = None;
                    cell.brick_type = kind.brick_type();
                    cell.material = material.clone();
                    cell.parent = Parent::Cell(loc);
                    update_value(g, above);
                    created.push(above);
                }
            }
        }
        if created.is_empty() {
            return Err(EditError::OccupiedConflict { coord: locs[0] });
        }
        Ok(created)
    })?;
    for &loc in &created {
        verify_exposure_above_and_below(grid, loc);
    }
    Ok(created)
}

/// Lifecycle of an interactive adjacency popup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Popup open, no direction applied yet
    AwaitingInput,
    /// At least one toggle pass has been applied to the working grid
    Applied,
}

/// Interactive popup session over the adjacency editor.
///
/// Holds the grid as it was at session start and a working copy that is
/// rebuilt from the snapshot on every property change.
pub struct AdjacencySession {
    base: BrickGrid,
    work: BrickGrid,
    source: CellCoord,
    kind: AdjKind,
    flags: [bool; 6],
    state: SessionState,
    notices: Vec<String>,
    pending_merge: Vec<CellCoord>,
    merge_options: MergeOptions,
}

impl AdjacencySession {
    /// Open a session for the footprint anchored at `source`.
    pub fn new(
        grid: &BrickGrid,
        source: CellCoord,
        kind: AdjKind,
        merge_options: MergeOptions,
    ) -> Result<Self> {
        grid.anchor(source)?;
        if !grid.layout().supports(kind.class()) {
            return Err(EditError::InvalidFootprint {
                size: glam::IVec3::new(1, 1, kind.height_units()),
                brick_type: kind.brick_type(),
            });
        }
        Ok(Self {
            base: grid.snapshot(),
            work: grid.snapshot(),
            source,
            kind,
            flags: [false; 6],
            state: SessionState::AwaitingInput,
            notices: Vec::new(),
            pending_merge: Vec::new(),
            merge_options,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a direction is currently active (conflicted directions are
    /// auto-cleared).
    pub fn direction(&self, dir: Direction) -> bool {
        self.flags[dir.index()]
    }

    /// Informational conflict messages from the latest toggle pass.
    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// The working grid, for preview drawing.
    pub fn grid(&self) -> &BrickGrid {
        &self.work
    }

    /// Set one direction flag and re-apply the full toggle pass.
    pub fn set_direction(&mut self, dir: Direction, on: bool) {
        self.flags[dir.index()] = on;
        self.reapply();
    }

    /// Change the brick kind for newly drawn cells and re-apply.
    pub fn set_kind(&mut self, kind: AdjKind) {
        self.kind = kind;
        self.reapply();
    }

    /// Confirm the popup: one merge pass over all created cells.
    ///
    /// Returns the committed grid and every coordinate to redraw.
    pub fn confirm(mut self) -> (BrickGrid, Vec<CellCoord>) {
        let options = MergeOptions {
            merge_vertical: self.kind == AdjKind::Brick,
            ..self.merge_options.clone()
        };
        let mut changed = merge_bricks(&mut self.work, &self.pending_merge, &options);

        // Bricks stacked on the source cover its faces
        if self.flags[Direction::ZPos.index()] {
            if let Some(cell) = self.work.get_mut(self.source) {
                cell.top_exposed = Some(false);
            }
        }
        if self.flags[Direction::ZNeg.index()] {
            if let Some(cell) = self.work.get_mut(self.source) {
                cell.bot_exposed = Some(false);
            }
        }
        if self.flags[Direction::ZPos.index()] || self.flags[Direction::ZNeg.index()] {
            changed.push(self.source);
        }
        (self.work, changed)
    }

    /// Cancel the popup, discarding the working copy.
    pub fn cancel(self) -> BrickGrid {
        self.base
    }

    /// Rebuild the working grid from the snapshot and apply every active
    /// direction once.
    fn reapply(&mut self) {
        self.work = self.base.snapshot();
        self.notices.clear();
        self.pending_merge.clear();
        self.state = SessionState::Applied;

        for dir in Direction::ALL {
            if !self.flags[dir.index()] {
                continue;
            }
            match toggle_adjacent(&mut self.work, self.source, dir, self.kind, true) {
                Ok(created) => self.pending_merge.extend(created),
                Err(e) => {
                    // Conflicted directions reset, siblings unaffected
                    self.flags[dir.index()] = false;
                    log::info!("direction {dir:?} rejected: {e}");
                    self.notices.push(e.to_string());
                }
            }
        }

        // Source occupancy values shift when its surroundings change
        if let Ok(size) = self.work.anchor_size(self.source) {
            for coord in self.work.keys_in_footprint(self.source, size) {
                update_value(&mut self.work, coord);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;

    fn one_plate() -> (BrickGrid, CellCoord) {
        let mut grid = BrickGrid::new(BrickLayout::BricksAndPlates);
        let source = CellCoord::new(0, 0, 0);
        grid.set(
            source,
            BrickCell::elemental(1, BrickType::Plate, Some("abs_red".into())),
        );
        (grid, source)
    }

    fn grids_equal(a: &BrickGrid, b: &BrickGrid) -> bool {
        a.len() == b.len() && a.iter().all(|(coord, cell)| b.get(coord) == Some(cell))
    }

    #[test]
    fn test_add_plate_on_x_face() {
        let (mut grid, source) = one_plate();
        let created =
            toggle_adjacent(&mut grid, source, Direction::XPos, AdjKind::Plate, true).unwrap();
        assert_eq!(created, vec![CellCoord::new(1, 0, 0)]);
        let cell = grid.get(CellCoord::new(1, 0, 0)).unwrap();
        assert!(cell.draw);
        assert!(cell.is_anchor());
        assert_eq!(cell.material.as_deref(), Some("abs_red"));
    }

    #[test]
    fn test_add_into_occupied_face_conflicts() {
        let (mut grid, source) = one_plate();
        grid.set(
            CellCoord::new(1, 0, 0),
            BrickCell::elemental(1, BrickType::Plate, None),
        );
        let err =
            toggle_adjacent(&mut grid, source, Direction::XPos, AdjKind::Plate, true).unwrap_err();
        assert!(matches!(err, EditError::OccupiedConflict { .. }));
    }

    #[test]
    fn test_tall_brick_reserves_two_cells_above() {
        let (mut grid, source) = one_plate();
        let created =
            toggle_adjacent(&mut grid, source, Direction::XPos, AdjKind::Brick, true).unwrap();
        assert_eq!(created.len(), 3);
        let anchor = CellCoord::new(1, 0, 0);
        assert_eq!(grid.anchor_size(anchor).unwrap(), IVec3::new(1, 1, 3));
        for dz in 1..=2 {
            let above = grid.get(anchor.offset(0, 0, dz)).unwrap();
            assert!(above.draw);
            assert_eq!(above.parent, Parent::Cell(anchor));
        }
    }

    #[test]
    fn test_tall_brick_rejected_when_reservation_blocked() {
        let (mut grid, source) = one_plate();
        // Blocker two layers above the target location
        grid.set(
            CellCoord::new(1, 0, 2),
            BrickCell::elemental(1, BrickType::Plate, None),
        );
        let err =
            toggle_adjacent(&mut grid, source, Direction::XPos, AdjKind::Brick, true).unwrap_err();
        assert_eq!(
            err,
            EditError::OccupiedConflict { coord: CellCoord::new(1, 0, 2) }
        );
        // Nothing was mutated
        assert!(!grid.get(CellCoord::new(1, 0, 0)).is_some_and(|c| c.draw));
    }

    #[test]
    fn test_tall_source_tall_kind_fills_face_with_one_brick() {
        let mut grid = BrickGrid::new(BrickLayout::BricksAndPlates);
        let source = CellCoord::new(0, 0, 0);
        grid.set(
            source,
            BrickCell::elemental(3, BrickType::Brick, Some("abs_red".into())),
        );
        for dz in 1..=2 {
            let mut dep = BrickCell::elemental(3, BrickType::Brick, Some("abs_red".into()));
            dep.size = None;
            dep.parent = Parent::Cell(source);
            grid.set(source.offset(0, 0, dz), dep);
        }

        let created =
            toggle_adjacent(&mut grid, source, Direction::XPos, AdjKind::Brick, true).unwrap();

        // The brick created at the face's bottom layer consumes the two
        // layers above it; the later face positions are skipped as
        // occupied, not overwritten with fresh anchors
        let anchor = CellCoord::new(1, 0, 0);
        assert_eq!(
            created,
            vec![anchor, CellCoord::new(1, 0, 1), CellCoord::new(1, 0, 2)]
        );
        assert_eq!(grid.anchor_size(anchor).unwrap(), IVec3::new(1, 1, 3));
        for dz in 1..=2 {
            let cell = grid.get(anchor.offset(0, 0, dz)).unwrap();
            assert!(!cell.is_anchor());
            assert_eq!(cell.parent, Parent::Cell(anchor));
        }

        // Footprints stay pairwise disjoint
        let mut seen = std::collections::HashSet::new();
        for coord in grid.coords().collect::<Vec<_>>() {
            let cell = grid.get(coord).unwrap();
            if !cell.is_anchor() {
                continue;
            }
            for k in grid.keys_in_footprint(coord, cell.size.unwrap()) {
                assert!(seen.insert(k), "footprints overlap at {k}");
            }
        }
    }

    #[test]
    fn test_occupied_face_position_skipped_rest_created() {
        let mut grid = BrickGrid::new(BrickLayout::BricksAndPlates);
        let source = CellCoord::new(0, 0, 0);
        let mut anchor_cell = BrickCell::elemental(1, BrickType::Plate, Some("abs_red".into()));
        anchor_cell.size = Some(IVec3::new(1, 2, 1));
        grid.set(source, anchor_cell);
        let mut dep = BrickCell::elemental(1, BrickType::Plate, Some("abs_red".into()));
        dep.size = None;
        dep.parent = Parent::Cell(source);
        grid.set(CellCoord::new(0, 1, 0), dep);
        // One of the two face positions already taken
        grid.set(
            CellCoord::new(1, 0, 0),
            BrickCell::elemental(1, BrickType::Plate, None),
        );

        let created =
            toggle_adjacent(&mut grid, source, Direction::XPos, AdjKind::Plate, true).unwrap();

        assert_eq!(created, vec![CellCoord::new(1, 1, 0)]);
        assert!(grid.get(CellCoord::new(1, 1, 0)).unwrap().is_anchor());
        // The occupied cell keeps its own state
        assert_eq!(grid.get(CellCoord::new(1, 0, 0)).unwrap().material, None);
    }

    #[test]
    fn test_z_neg_tall_anchor_sits_full_height_below() {
        let (mut grid, source) = one_plate();
        let created =
            toggle_adjacent(&mut grid, source, Direction::ZNeg, AdjKind::Brick, true).unwrap();
        assert!(created.contains(&CellCoord::new(0, 0, -3)));
        assert_eq!(
            grid.anchor_size(CellCoord::new(0, 0, -3)).unwrap(),
            IVec3::new(1, 1, 3)
        );
    }

    #[test]
    fn test_remove_clears_drawn_state() {
        let (mut grid, source) = one_plate();
        toggle_adjacent(&mut grid, source, Direction::XPos, AdjKind::Plate, true).unwrap();
        let removed =
            toggle_adjacent(&mut grid, source, Direction::XPos, AdjKind::Plate, false).unwrap();
        assert_eq!(removed, vec![CellCoord::new(1, 0, 0)]);
        let cell = grid.get(CellCoord::new(1, 0, 0)).unwrap();
        assert!(!cell.draw);
        assert_eq!(cell.parent, Parent::Unassigned);
    }

    #[test]
    fn test_session_toggle_on_off_reverts() {
        let (grid, source) = one_plate();
        let mut session =
            AdjacencySession::new(&grid, source, AdjKind::Plate, MergeOptions::default()).unwrap();
        session.set_direction(Direction::XPos, true);
        assert!(session.grid().get(CellCoord::new(1, 0, 0)).is_some());
        session.set_direction(Direction::XPos, false);
        assert!(grids_equal(session.grid(), &grid));
    }

    #[test]
    fn test_session_never_double_applies() {
        let (grid, source) = one_plate();
        let mut session =
            AdjacencySession::new(&grid, source, AdjKind::Plate, MergeOptions::default()).unwrap();
        session.set_direction(Direction::XPos, true);
        session.set_direction(Direction::XPos, true);
        session.set_direction(Direction::YPos, true);
        let (committed, _) = session.confirm();
        // One cell per face, not one per property change
        assert_eq!(committed.len(), 3);
    }

    #[test]
    fn test_session_confirm_merges_created_cells() {
        let mut grid = BrickGrid::new(BrickLayout::BricksAndPlates);
        let source = CellCoord::new(0, 0, 0);
        let mut anchor_cell = BrickCell::elemental(1, BrickType::Plate, Some("abs_red".into()));
        anchor_cell.size = Some(IVec3::new(1, 2, 1));
        grid.set(source, anchor_cell);
        let mut dep = BrickCell::elemental(1, BrickType::Plate, Some("abs_red".into()));
        dep.size = None;
        dep.parent = Parent::Cell(source);
        grid.set(CellCoord::new(0, 1, 0), dep);

        let mut session =
            AdjacencySession::new(&grid, source, AdjKind::Plate, MergeOptions::default()).unwrap();
        session.set_direction(Direction::XPos, true);
        let (committed, _) = session.confirm();

        // The two created cells merged into one 1x2 plate
        let created_anchor = CellCoord::new(1, 0, 0);
        assert_eq!(
            committed.anchor_size(created_anchor).unwrap(),
            IVec3::new(1, 2, 1)
        );
    }

    #[test]
    fn test_session_conflicted_direction_auto_clears() {
        let (mut grid, source) = one_plate();
        grid.set(
            CellCoord::new(1, 0, 0),
            BrickCell::elemental(1, BrickType::Plate, None),
        );
        let mut session =
            AdjacencySession::new(&grid, source, AdjKind::Plate, MergeOptions::default()).unwrap();
        session.set_direction(Direction::XPos, true);
        assert!(!session.direction(Direction::XPos));
        assert_eq!(session.notices().len(), 1);
        assert!(grids_equal(session.grid(), &grid));
    }

    #[test]
    fn test_session_cancel_discards_work() {
        let (grid, source) = one_plate();
        let mut session =
            AdjacencySession::new(&grid, source, AdjKind::Plate, MergeOptions::default()).unwrap();
        session.set_direction(Direction::XPos, true);
        let restored = session.cancel();
        assert!(grids_equal(&restored, &grid));
    }

    #[test]
    fn test_session_states() {
        let (grid, source) = one_plate();
        let mut session =
            AdjacencySession::new(&grid, source, AdjKind::Plate, MergeOptions::default()).unwrap();
        assert_eq!(session.state(), SessionState::AwaitingInput);
        session.set_direction(Direction::ZPos, true);
        assert_eq!(session.state(), SessionState::Applied);
    }

    #[test]
    fn test_z_pos_confirm_clears_source_top_exposure() {
        let (grid, source) = one_plate();
        let mut session =
            AdjacencySession::new(&grid, source, AdjKind::Plate, MergeOptions::default()).unwrap();
        session.set_direction(Direction::ZPos, true);
        let (committed, changed) = session.confirm();
        assert_eq!(committed.get(source).unwrap().top_exposed, Some(false));
        assert!(changed.contains(&source));
    }
}
