//! The static tile model and the grid-provider seam.

use crate::geom::{Point, Vec2};

// ---------------------------------------------------------------------------
// TileData
// ---------------------------------------------------------------------------

/// Immutable pathing data for one tile, owned by the terrain subsystem.
///
/// The search engine only ever reads these; a provider hands out copies on
/// demand and keeps the originals for itself.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileData {
    pub x: i32,
    pub y: i32,
    pub walkable: bool,
    /// Extra movement cost added when stepping onto this tile. Must be >= 0.
    pub penalty: i32,
}

impl TileData {
    /// Create tile data for a grid coordinate.
    pub const fn new(x: i32, y: i32, walkable: bool, penalty: i32) -> Self {
        Self {
            x,
            y,
            walkable,
            penalty,
        }
    }

    /// The grid coordinate of this tile.
    #[inline]
    pub fn coord(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The world-space center of this tile.
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.coord().center()
    }
}

// ---------------------------------------------------------------------------
// TileSource
// ---------------------------------------------------------------------------

/// Read-only point queries for per-tile static pathing data.
///
/// `None` means the coordinate is unavailable — out of range or not
/// currently loaded. The two cases are indistinguishable to callers.
pub trait TileSource {
    /// Static data for the tile at `at`, if that region is loaded.
    fn tile_at(&self, at: Point) -> Option<TileData>;
}

impl<S: TileSource + ?Sized> TileSource for &S {
    fn tile_at(&self, at: Point) -> Option<TileData> {
        (**self).tile_at(at)
    }
}

// ---------------------------------------------------------------------------
// GridMap
// ---------------------------------------------------------------------------

/// A rectangular in-memory [`TileSource`].
///
/// Covers `[min, min + (width, height))`; the origin may be negative, so a
/// map can surround world origin. Tiles start walkable with zero penalty.
/// Queries outside the rectangle answer `None`, the same as an unloaded
/// region would.
#[derive(Clone, Debug)]
pub struct GridMap {
    min: Point,
    width: i32,
    height: i32,
    walkable: Vec<bool>,
    penalty: Vec<i32>,
}

impl GridMap {
    /// Create an all-walkable, zero-penalty map.
    pub fn new(min: Point, width: i32, height: i32) -> Self {
        let len = (width.max(0) * height.max(0)) as usize;
        Self {
            min,
            width: width.max(0),
            height: height.max(0),
            walkable: vec![true; len],
            penalty: vec![0; len],
        }
    }

    /// The inclusive minimum corner.
    #[inline]
    pub fn min(&self) -> Point {
        self.min
    }

    /// Map width in tiles.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Map height in tiles.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    fn idx(&self, at: Point) -> Option<usize> {
        let dx = at.x - self.min.x;
        let dy = at.y - self.min.y;
        if dx < 0 || dy < 0 || dx >= self.width || dy >= self.height {
            return None;
        }
        Some((dy * self.width + dx) as usize)
    }

    /// Set whether the tile at `at` can be walked on. Ignores coordinates
    /// outside the rectangle.
    pub fn set_walkable(&mut self, at: Point, walkable: bool) {
        if let Some(i) = self.idx(at) {
            self.walkable[i] = walkable;
        }
    }

    /// Set the movement penalty of the tile at `at`. Ignores coordinates
    /// outside the rectangle.
    pub fn set_penalty(&mut self, at: Point, penalty: i32) {
        if let Some(i) = self.idx(at) {
            self.penalty[i] = penalty;
        }
    }

    /// Set every tile's walkability at once.
    pub fn fill_walkable(&mut self, walkable: bool) {
        self.walkable.fill(walkable);
    }
}

impl TileSource for GridMap {
    fn tile_at(&self, at: Point) -> Option<TileData> {
        let i = self.idx(at)?;
        Some(TileData::new(at.x, at.y, self.walkable[i], self.penalty[i]))
    }
}
