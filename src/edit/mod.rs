//! Edit engines over the brick lattice.
//!
//! Every entry point takes an explicit grid handle and returns the
//! coordinates it changed so the caller can redraw them. Local failures
//! (illegal footprints, occupied locations) are absorbed per cell or per
//! direction; batch-level failures roll the grid back at the operator
//! boundary via [`crate::grid::store::BrickGrid::transaction`].

pub mod exposure;
pub mod split;
pub mod merge;
pub mod adjacency;
pub mod change_type;

pub use adjacency::{toggle_adjacent, AdjacencySession, AdjKind, Direction, SessionState};
pub use change_type::change_brick_type;
pub use exposure::{
    brick_exposure, set_brick_exposure, toggle_exposure, verify_exposure_above_and_below,
    ExposureSide,
};
pub use merge::{merge_bricks, sorted_for_merge, MergeOptions};
pub use split::split_brick;
