//! **gridpath-core** — Foundational types for grid-based pathfinding.
//!
//! This crate provides the pieces shared across the *gridpath* ecosystem:
//! integer grid coordinates ([`Point`]), float world positions ([`Vec2`]),
//! the static per-tile record ([`TileData`]), the provider seam the search
//! engine reads terrain through ([`TileSource`]), and a rectangular
//! in-memory provider ([`GridMap`]) for hosts and tests.

pub mod geom;
pub mod tile;

pub use geom::{Point, Vec2};
pub use tile::{GridMap, TileData, TileSource};
