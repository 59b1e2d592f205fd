//! The A* engine: one search, run to completion on the calling thread.

use gridpath_core::{Point, TileSource, Vec2};

use crate::workspace::{Workspace, WorkspacePool};

/// Cost of an orthogonal step.
pub const STRAIGHT_COST: i32 = 10;

/// Cost of a diagonal step.
///
/// 10/14 are fixed-point stand-ins for the Euclidean 1/√2 ratio, keeping
/// every cost integral.
pub const DIAGONAL_COST: i32 = 14;

/// Default arena size for workspaces when the host has no better number.
pub const DEFAULT_MAX_NODES: usize = 4096;

/// Octile distance between two tiles, weighted 10/14.
///
/// Never overestimates the true remaining cost on an 8-connected grid, so
/// A* with this heuristic returns cost-minimal paths.
#[inline]
pub fn octile(a: Point, b: Point) -> i32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    let (lo, hi) = if dx < dy { (dx, dy) } else { (dy, dx) };
    DIAGONAL_COST * lo + STRAIGHT_COST * (hi - lo)
}

/// The outcome of one search. Produced exactly once per request.
///
/// Success is all-or-nothing: `waypoints` is either a full start-to-end
/// sequence of tile centers or empty. There are no partial paths.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathOutcome {
    pub waypoints: Vec<Vec2>,
    pub success: bool,
}

impl PathOutcome {
    /// A failed outcome with no waypoints.
    pub fn failure() -> Self {
        Self::default()
    }

    fn complete(waypoints: Vec<Vec2>) -> Self {
        Self {
            waypoints,
            success: true,
        }
    }
}

/// Find a walkable path from `start` to `end` (world positions).
///
/// Runs synchronously to completion and always returns exactly one
/// outcome; every failure mode — unwalkable or unavailable endpoints,
/// iteration-budget exhaustion, arena exhaustion, an unloaded region at
/// the expansion frontier — yields `success = false` with no waypoints.
///
/// Endpoints are checked before any workspace is acquired, so unwalkable
/// requests fail without touching the pool. Otherwise a workspace is
/// drawn from `pool` and returned to it whatever the outcome.
pub fn find_path<S: TileSource>(
    source: &S,
    pool: &WorkspacePool,
    start: Vec2,
    end: Vec2,
) -> PathOutcome {
    let start_tile = start.tile();
    let end_tile = end.tile();
    let walkable = |at: Point| source.tile_at(at).is_some_and(|t| t.walkable);
    if !walkable(start_tile) || !walkable(end_tile) {
        return PathOutcome::failure();
    }

    let mut ws = pool.acquire();
    let found = search(&mut ws, source, start_tile, end_tile);
    pool.release(ws);

    match found {
        Some(waypoints) if !waypoints.is_empty() => PathOutcome::complete(waypoints),
        _ => PathOutcome::failure(),
    }
}

fn search<S: TileSource>(
    ws: &mut Workspace,
    source: &S,
    start: Point,
    end: Point,
) -> Option<Vec<Vec2>> {
    let start_idx = ws.materialize(source, start)?;
    let end_idx = ws.materialize(source, end)?;

    // The start is its own parent, which terminates the retrace.
    ws.node_mut(start_idx).parent = start_idx;
    ws.push_open(start_idx);

    let mut budget = ws.capacity();
    let mut found = false;

    while budget > 0 && !ws.open_is_empty() {
        let Some(current) = ws.pop_open() else {
            break;
        };
        ws.mark_visited(current);

        if current == end_idx {
            found = true;
            break;
        }

        let around = ws.neighbors(source, current);
        if around.iter().any(|slot| slot.is_none()) {
            // A missing neighbor means the arena ran dry or the frontier
            // reached an unloaded region; the whole search is abandoned
            // rather than routed through partially-known terrain.
            return None;
        }

        let cur_at = ws.node(current).tile.coord();
        let cur_g = ws.node(current).g;

        for n_idx in around.into_iter().flatten() {
            let n = ws.node(n_idx);
            if !n.tile.walkable || ws.is_visited(n_idx) {
                continue;
            }
            let n_at = n.tile.coord();
            let d = n_at - cur_at;
            let step = if d.x != 0 && d.y != 0 {
                DIAGONAL_COST
            } else {
                STRAIGHT_COST
            };
            let tentative = cur_g + step + n.tile.penalty;

            let in_open = ws.open_contains(n_idx);
            if !in_open || tentative < ws.node(n_idx).g {
                let v = ws.node_mut(n_idx);
                v.g = tentative;
                v.h = octile(n_at, end);
                v.parent = current;
                if in_open {
                    ws.requeue_open(n_idx);
                } else {
                    ws.push_open(n_idx);
                }
            }
        }

        budget -= 1;
    }

    if !found {
        return None;
    }

    // Retrace parent links end → start, then flip to travel order.
    let mut waypoints = Vec::new();
    let mut idx = end_idx;
    loop {
        let v = ws.node(idx);
        waypoints.push(v.tile.center());
        if v.parent == idx {
            break;
        }
        idx = v.parent;
    }
    waypoints.reverse();
    Some(waypoints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridpath_core::GridMap;

    fn open_map() -> GridMap {
        // Generous margins so expansion never brushes the map edge.
        GridMap::new(Point::new(-8, -8), 24, 24)
    }

    /// Recompute a path's cost from the map: 10/14 per step plus the
    /// penalty of each tile stepped onto.
    fn cost_along(map: &GridMap, waypoints: &[Vec2]) -> i32 {
        waypoints
            .windows(2)
            .map(|w| {
                let a = w[0].tile();
                let b = w[1].tile();
                let d = b - a;
                assert!(d.x.abs() <= 1 && d.y.abs() <= 1, "non-adjacent step");
                let step = if d.x != 0 && d.y != 0 {
                    DIAGONAL_COST
                } else {
                    STRAIGHT_COST
                };
                step + map.tile_at(b).unwrap().penalty
            })
            .sum()
    }

    #[test]
    fn octile_weights() {
        assert_eq!(octile(Point::ZERO, Point::new(3, 0)), 30);
        assert_eq!(octile(Point::ZERO, Point::new(2, 2)), 28);
        assert_eq!(octile(Point::ZERO, Point::new(3, 1)), 34);
        assert_eq!(octile(Point::new(-1, -1), Point::new(1, 2)), 38);
    }

    #[test]
    fn straight_path_at_tile_centers() {
        let map = open_map();
        let pool = WorkspacePool::new(64);
        let out = find_path(&map, &pool, Vec2::new(0.5, 0.5), Vec2::new(3.5, 0.5));
        assert!(out.success);
        assert_eq!(
            out.waypoints,
            vec![
                Vec2::new(0.5, 0.5),
                Vec2::new(1.5, 0.5),
                Vec2::new(2.5, 0.5),
                Vec2::new(3.5, 0.5),
            ]
        );
        assert_eq!(cost_along(&map, &out.waypoints), 30);
    }

    #[test]
    fn diagonal_beats_orthogonal_detour() {
        let map = open_map();
        let pool = WorkspacePool::new(64);
        let out = find_path(&map, &pool, Vec2::new(0.5, 0.5), Vec2::new(2.5, 2.5));
        assert!(out.success);
        assert_eq!(
            out.waypoints,
            vec![
                Vec2::new(0.5, 0.5),
                Vec2::new(1.5, 1.5),
                Vec2::new(2.5, 2.5),
            ]
        );
        assert_eq!(cost_along(&map, &out.waypoints), 28);
    }

    #[test]
    fn start_equals_end() {
        let map = open_map();
        let pool = WorkspacePool::new(64);
        let out = find_path(&map, &pool, Vec2::new(2.5, 2.5), Vec2::new(2.25, 2.75));
        assert!(out.success);
        assert_eq!(out.waypoints, vec![Vec2::new(2.5, 2.5)]);
    }

    #[test]
    fn unwalkable_endpoint_fails_without_touching_pool() {
        let mut map = open_map();
        map.set_walkable(Point::new(3, 0), false);
        let pool = WorkspacePool::new(64);

        let out = find_path(&map, &pool, Vec2::new(0.5, 0.5), Vec2::new(3.5, 0.5));
        assert!(!out.success);
        assert!(out.waypoints.is_empty());
        // No workspace was acquired, so none was ever released.
        assert_eq!(pool.idle_count(), 0);

        // Same for an unwalkable start and for an unloaded endpoint.
        let out = find_path(&map, &pool, Vec2::new(3.5, 0.5), Vec2::new(0.5, 0.5));
        assert!(!out.success);
        let out = find_path(&map, &pool, Vec2::new(0.5, 0.5), Vec2::new(99.5, 0.5));
        assert!(!out.success);
        assert_eq!(pool.idle_count(), 0);
    }

    #[test]
    fn penalties_steer_the_route() {
        let mut map = open_map();
        map.set_penalty(Point::new(1, 0), 100);
        let pool = WorkspacePool::new(64);

        let out = find_path(&map, &pool, Vec2::new(0.5, 0.5), Vec2::new(2.5, 0.5));
        assert!(out.success);
        assert!(
            out.waypoints
                .iter()
                .all(|wp| wp.tile() != Point::new(1, 0)),
            "path should route around the penalty tile"
        );
        assert_eq!(cost_along(&map, &out.waypoints), 28);
    }

    #[test]
    fn boxed_in_start_has_no_route() {
        let mut map = open_map();
        // Wall off all eight tiles around the start; the open set drains
        // after a single expansion.
        for d in Point::new(4, 4).neighbors_8() {
            map.set_walkable(d, false);
        }
        let pool = WorkspacePool::new(256);
        let out = find_path(&map, &pool, Vec2::new(4.5, 4.5), Vec2::new(0.5, 0.5));
        assert!(!out.success);
        assert!(out.waypoints.is_empty());
        // The workspace still came back.
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn frontier_touching_unloaded_region_fails() {
        // No margin: the map is exactly 5x5 with a wall across x = 2
        // except at the bottom row, so the only route hugs the map edge.
        let mut walls = GridMap::new(Point::ZERO, 5, 5);
        for y in 0..=3 {
            walls.set_walkable(Point::new(2, y), false);
        }
        let pool = WorkspacePool::new(256);
        let out = find_path(&walls, &pool, Vec2::new(1.5, 2.5), Vec2::new(3.5, 2.5));
        assert!(!out.success);
        assert!(out.waypoints.is_empty());

        // The identical obstacle layout with a loaded ring around it
        // succeeds, pinning the failure on the unloaded frontier alone.
        let mut ringed = GridMap::new(Point::new(-1, -1), 7, 7);
        for y in 0..=3 {
            ringed.set_walkable(Point::new(2, y), false);
        }
        let out = find_path(&ringed, &pool, Vec2::new(1.5, 2.5), Vec2::new(3.5, 2.5));
        assert!(out.success);
        assert_eq!(out.waypoints.first().map(|wp| wp.tile()), Some(Point::new(1, 2)));
        assert_eq!(out.waypoints.last().map(|wp| wp.tile()), Some(Point::new(3, 2)));
    }

    #[test]
    fn undersized_workspace_fails_cleanly() {
        let map = open_map();
        // Far too small an arena for a 15-tile journey's frontier.
        let pool = WorkspacePool::new(8);
        let out = find_path(&map, &pool, Vec2::new(-7.5, -7.5), Vec2::new(7.5, 7.5));
        assert!(!out.success);
        assert!(out.waypoints.is_empty());

        // The failed search released a fully reset workspace.
        assert_eq!(pool.idle_count(), 1);
        let ws = pool.acquire();
        assert_eq!(ws.checked_out(), 0);
        assert_eq!(ws.free_count(), ws.capacity());
    }

    #[test]
    fn repeat_searches_are_identical() {
        use rand::rngs::StdRng;
        use rand::{RngExt, SeedableRng};

        let mut rng = StdRng::seed_from_u64(0x517e);
        let mut map = GridMap::new(Point::new(-10, -10), 28, 28);
        for y in -10..18 {
            for x in -10..18 {
                if rng.random_range(0..100) < 20 {
                    map.set_walkable(Point::new(x, y), false);
                }
            }
        }
        let start = Vec2::new(-4.5, -4.5);
        let end = Vec2::new(6.5, 5.5);
        map.set_walkable(start.tile(), true);
        map.set_walkable(end.tile(), true);

        let pool = WorkspacePool::new(512);
        let first = find_path(&map, &pool, start, end);
        // Reused workspace, fresh workspace: byte-identical either way.
        let again = find_path(&map, &pool, start, end);
        assert_eq!(first, again);
        let fresh_pool = WorkspacePool::new(512);
        let fresh = find_path(&map, &fresh_pool, start, end);
        assert_eq!(first, fresh);

        if first.success {
            assert_eq!(first.waypoints.first().map(|wp| wp.tile()), Some(start.tile()));
            assert_eq!(first.waypoints.last().map(|wp| wp.tile()), Some(end.tile()));
        }
    }
}
