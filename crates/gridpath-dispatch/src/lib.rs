//! **gridpath-dispatch** — the asynchronous request/response pipeline.
//!
//! [`PathService`] is the public façade of the pathfinding subsystem. A
//! caller submits a request and gets on with its tick; a worker thread
//! runs the search to completion; the completed result waits on a
//! lock-protected queue until the main thread drains it. Each request's
//! callback runs exactly once, on the draining thread, at some later tick.
//!
//! There is no cancellation and no wall-clock timeout. The only bound on
//! a single search is its workspace's fixed node budget.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use gridpath_core::{TileSource, Vec2};
use gridpath_search::{WorkspacePool, find_path};

/// Completion callback: the waypoint list and whether the search succeeded.
///
/// Boxed `FnOnce`, so "runs exactly once" holds by construction.
pub type PathCallback = Box<dyn FnOnce(Vec<Vec2>, bool) + Send>;

/// A finished search waiting on the queue for the next drain.
struct Completed {
    waypoints: Vec<Vec2>,
    success: bool,
    on_complete: PathCallback,
}

// ---------------------------------------------------------------------------
// PathService
// ---------------------------------------------------------------------------

/// Dispatches path searches onto worker threads and delivers results on
/// the caller's tick.
///
/// Cloning yields another handle to the same service: the clones share
/// the workspace pool, the result queue, and the in-flight counter.
pub struct PathService<S> {
    source: Arc<S>,
    pool: Arc<WorkspacePool>,
    completed: Arc<Mutex<VecDeque<Completed>>>,
    in_flight: Arc<AtomicUsize>,
}

impl<S> Clone for PathService<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            pool: Arc::clone(&self.pool),
            completed: Arc::clone(&self.completed),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<S: TileSource + Send + Sync + 'static> PathService<S> {
    /// Create a service reading terrain from `source`, with per-search
    /// workspaces sized to `max_nodes`.
    pub fn new(source: Arc<S>, max_nodes: usize) -> Self {
        Self {
            source,
            pool: Arc::new(WorkspacePool::new(max_nodes)),
            completed: Arc::new(Mutex::new(VecDeque::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Request a path from `start` to `end` (world positions).
    ///
    /// Returns immediately. The search runs on its own worker thread,
    /// fully parallel with other requests; `on_complete` fires during a
    /// later [`deliver_completed`](Self::deliver_completed) call. A
    /// submitted request cannot be withdrawn.
    pub fn request_path<F>(&self, start: Vec2, end: Vec2, on_complete: F)
    where
        F: FnOnce(Vec<Vec2>, bool) + Send + 'static,
    {
        let source = Arc::clone(&self.source);
        let pool = Arc::clone(&self.pool);
        let completed = Arc::clone(&self.completed);
        let in_flight = Arc::clone(&self.in_flight);
        in_flight.fetch_add(1, Ordering::SeqCst);
        log::trace!("path request {start} -> {end}");

        thread::spawn(move || {
            let outcome = find_path(source.as_ref(), &pool, start, end);
            completed
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(Completed {
                    waypoints: outcome.waypoints,
                    success: outcome.success,
                    on_complete: Box::new(on_complete),
                });
            in_flight.fetch_sub(1, Ordering::SeqCst);
        });
    }

    /// Drain finished searches and fire their callbacks. Call once per
    /// main-thread tick.
    ///
    /// Takes a snapshot of the queue and delivers exactly that batch, in
    /// arrival order; results finishing mid-drain wait for the next tick.
    /// Callbacks run synchronously on the calling thread, outside the
    /// queue lock, so they are free to submit new requests. Returns the
    /// number of callbacks fired.
    pub fn deliver_completed(&self) -> usize {
        let batch: Vec<Completed> = {
            let mut queue = self.completed.lock().unwrap_or_else(PoisonError::into_inner);
            let snapshot = queue.len();
            queue.drain(..snapshot).collect()
        };

        let delivered = batch.len();
        for done in batch {
            (done.on_complete)(done.waypoints, done.success);
        }
        if delivered > 0 {
            log::debug!("delivered {delivered} path results");
        }
        delivered
    }

    /// Requests dispatched whose results have not yet reached the queue.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// The shared workspace pool behind this service.
    pub fn pool(&self) -> &WorkspacePool {
        &self.pool
    }
}
