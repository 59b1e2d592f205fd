//! Per-search working memory and the cross-thread pool it is drawn from.
//!
//! A [`Workspace`] owns everything one search touches: a fixed arena of
//! [`Vertex`] records, the free list over that arena, the open heap, the
//! visited set, and a coordinate index scoped to the current search. The
//! arena is allocated once; after warm-up a search allocates nothing.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, PoisonError};

use gridpath_core::{Point, TileData, TileSource};

use crate::heap::{CostHeap, HeapItem, NOT_IN_HEAP};

/// Parent value for a vertex that has not been reached yet.
pub const NO_VERTEX: usize = usize::MAX;

// ---------------------------------------------------------------------------
// Vertex
// ---------------------------------------------------------------------------

/// One search vertex: a tile binding plus the A* bookkeeping for it.
///
/// `f = g + h` is derived, never stored. `parent` is an index into the
/// owning workspace's arena; the start vertex is seeded with itself so a
/// retrace terminates without a separate sentinel check.
#[derive(Clone, Debug)]
pub struct Vertex {
    pub tile: TileData,
    pub g: i32,
    pub h: i32,
    pub parent: usize,
    slot: usize,
}

impl Vertex {
    fn idle() -> Self {
        Self {
            tile: TileData::default(),
            g: 0,
            h: 0,
            parent: NO_VERTEX,
            slot: NOT_IN_HEAP,
        }
    }

    /// Total estimated cost through this vertex.
    #[inline]
    pub fn f(&self) -> i32 {
        self.g + self.h
    }
}

impl HeapItem for Vertex {
    #[inline]
    fn order_key(&self) -> (i32, i32) {
        (self.f(), self.h)
    }

    #[inline]
    fn slot(&self) -> usize {
        self.slot
    }

    #[inline]
    fn set_slot(&mut self, slot: usize) {
        self.slot = slot;
    }
}

// ---------------------------------------------------------------------------
// Workspace
// ---------------------------------------------------------------------------

/// One search's entire working memory. One workspace serves exactly one
/// search at a time; a pool hands them out across worker threads.
///
/// Invariant: `checked_out() + free_count() == capacity()` at all times.
pub struct Workspace {
    nodes: Vec<Vertex>,
    free: Vec<usize>,
    by_coord: HashMap<Point, usize>,
    visited: HashSet<usize>,
    open: CostHeap,
}

impl Workspace {
    /// Allocate a workspace whose arena holds `max_nodes` vertices.
    ///
    /// The arena bounds both the number of distinct tiles one search can
    /// touch and (via the engine's iteration budget) how long it may run.
    pub fn new(max_nodes: usize) -> Self {
        Self {
            nodes: (0..max_nodes).map(|_| Vertex::idle()).collect(),
            free: (0..max_nodes).collect(),
            by_coord: HashMap::with_capacity(max_nodes),
            visited: HashSet::with_capacity(max_nodes),
            open: CostHeap::with_capacity(max_nodes),
        }
    }

    /// Arena size fixed at construction.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.nodes.len()
    }

    /// Vertices currently bound to a coordinate of the running search.
    #[inline]
    pub fn checked_out(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Vertices available on the free list.
    #[inline]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// The vertex for `at`, materializing it on first visit.
    ///
    /// Returns `None` when the arena is exhausted or the provider has no
    /// data for `at`; the caller cannot tell the two apart, and the engine
    /// treats both as the search hitting its limits.
    pub fn materialize<S: TileSource>(&mut self, source: &S, at: Point) -> Option<usize> {
        if let Some(&idx) = self.by_coord.get(&at) {
            return Some(idx);
        }
        if self.free.is_empty() {
            return None;
        }
        let tile = source.tile_at(at)?;
        let idx = self.free.pop()?;
        let v = &mut self.nodes[idx];
        v.tile = tile;
        v.g = 0;
        v.h = 0;
        v.parent = NO_VERTEX;
        v.slot = NOT_IN_HEAP;
        self.by_coord.insert(at, idx);
        Some(idx)
    }

    /// Materialize the eight grid-adjacent coordinates of `vertex`.
    ///
    /// Slot order matches [`Point::neighbors_8`]; a slot is `None` when
    /// that coordinate could not be materialized.
    pub fn neighbors<S: TileSource>(&mut self, source: &S, vertex: usize) -> [Option<usize>; 8] {
        let around = self.nodes[vertex].tile.coord().neighbors_8();
        let mut out = [None; 8];
        for (slot, at) in around.into_iter().enumerate() {
            out[slot] = self.materialize(source, at);
        }
        out
    }

    /// Restore the just-constructed state: empty heap, empty visited set,
    /// empty coordinate index, every vertex back on the free list.
    pub fn reset(&mut self) {
        self.open.clear();
        self.visited.clear();
        for (_, idx) in self.by_coord.drain() {
            let v = &mut self.nodes[idx];
            v.tile = TileData::default();
            v.g = 0;
            v.h = 0;
            v.parent = NO_VERTEX;
            v.slot = NOT_IN_HEAP;
            self.free.push(idx);
        }
    }

    // -----------------------------------------------------------------------
    // Engine access
    // -----------------------------------------------------------------------

    #[inline]
    pub(crate) fn node(&self, idx: usize) -> &Vertex {
        &self.nodes[idx]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, idx: usize) -> &mut Vertex {
        &mut self.nodes[idx]
    }

    #[inline]
    pub(crate) fn open_is_empty(&self) -> bool {
        self.open.is_empty()
    }

    #[inline]
    pub(crate) fn push_open(&mut self, idx: usize) {
        self.open.push(&mut self.nodes, idx);
    }

    #[inline]
    pub(crate) fn pop_open(&mut self) -> Option<usize> {
        self.open.pop_min(&mut self.nodes)
    }

    #[inline]
    pub(crate) fn open_contains(&self, idx: usize) -> bool {
        self.open.contains(&self.nodes, idx)
    }

    #[inline]
    pub(crate) fn requeue_open(&mut self, idx: usize) {
        self.open.update(&mut self.nodes, idx);
    }

    #[inline]
    pub(crate) fn mark_visited(&mut self, idx: usize) {
        self.visited.insert(idx);
    }

    #[inline]
    pub(crate) fn is_visited(&self, idx: usize) -> bool {
        self.visited.contains(&idx)
    }
}

// ---------------------------------------------------------------------------
// WorkspacePool
// ---------------------------------------------------------------------------

/// Idle workspaces shared across worker threads.
///
/// Checkout and return each take the lock briefly; a checked-out workspace
/// is exclusively owned by its thread until released. A miss allocates a
/// fresh workspace rather than blocking, so the pool never caps the number
/// of concurrent searches.
pub struct WorkspacePool {
    max_nodes: usize,
    idle: Mutex<VecDeque<Workspace>>,
}

impl WorkspacePool {
    /// Create an empty pool whose workspaces hold `max_nodes` vertices.
    pub fn new(max_nodes: usize) -> Self {
        Self {
            max_nodes,
            idle: Mutex::new(VecDeque::new()),
        }
    }

    /// Arena size of every workspace this pool hands out.
    #[inline]
    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    /// Take an idle workspace, or allocate one on a miss.
    pub fn acquire(&self) -> Workspace {
        let reused = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        reused.unwrap_or_else(|| Workspace::new(self.max_nodes))
    }

    /// Reset `ws` and queue it for reuse.
    pub fn release(&self, mut ws: Workspace) {
        ws.reset();
        self.idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(ws);
    }

    /// Number of workspaces currently idle.
    pub fn idle_count(&self) -> usize {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
