//! **gridpath-search** — A* pathfinding over tile grids.
//!
//! The pieces, bottom up:
//!
//! - [`CostHeap`] — an indexed binary min-heap with O(1) membership tests
//!   and in-place re-sorting, over items implementing [`HeapItem`].
//! - [`Workspace`] — one search's entire working memory: a fixed arena of
//!   [`Vertex`] records, the open heap, the visited set, and a per-search
//!   coordinate index. Allocated once, reused forever.
//! - [`WorkspacePool`] — idle workspaces shared across worker threads.
//! - [`find_path`] — runs one search to completion against a
//!   [`TileSource`](gridpath_core::TileSource), drawing a workspace from
//!   the pool and returning it when done.
//!
//! Costs are fixed-point: an orthogonal step costs 10, a diagonal step 14,
//! and each tile may add a non-negative penalty. The heuristic is octile
//! distance with the same weights, so returned paths are cost-minimal.

mod astar;
mod heap;
mod workspace;

pub use astar::{
    DEFAULT_MAX_NODES, DIAGONAL_COST, PathOutcome, STRAIGHT_COST, find_path, octile,
};
pub use heap::{CostHeap, HeapItem, NOT_IN_HEAP};
pub use workspace::{NO_VERTEX, Vertex, Workspace, WorkspacePool};
